//! CUDA kernel generation, caching, and launching infrastructure
//!
//! # Architecture
//!
//! - A [`KernelPlan`] names the two stages of a call: how an element is
//!   produced (load, map, map in place) and what happens to it (store,
//!   filter, reduce).
//! - [`generate_source`] splices the algorithm's device functions between
//!   the type declarations and the wrapper kernel for that plan.
//! - Modules are compiled with NVRTC on first use and cached per
//!   (device, algorithm, plan, element types).
//! - The `launch_*` drivers stage buffers, launch the wrapper and destage
//!   the result.
//!
//! # Thread Safety
//!
//! The module cache uses `OnceLock<Mutex<HashMap>>` for thread-safe
//! initialization and concurrent access from multiple clients.

use cudarc::driver::PushKernelArg;
use cudarc::driver::safe::{CudaFunction, CudaModule, CudaSlice};
use cudarc::nvrtc::compile_ptx;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::{Arc, Mutex, OnceLock};

use super::cache::lock_cache;
use super::client::CudaClient;
use crate::algorithm::DeviceKernel;
use crate::dtype::DeviceElement;
use crate::error::{Error, Result};
use crate::runtime::LaunchConfig;

// ============================================================================
// Launch Limits
// ============================================================================

/// Block size for the default configuration (256 threads is a good fit for
/// most GPUs)
pub const BLOCK_SIZE: usize = 256;

/// Largest block the hardware accepts
const MAX_THREADS_PER_BLOCK: usize = 1024;

/// Largest grid x dimension
const MAX_GRID: usize = i32::MAX as usize;

/// Static shared memory available to one block without opt-in
const MAX_SHARED_BYTES: usize = 48 * 1024;

/// Translate a launch configuration into cudarc's.
///
/// # Errors
///
/// Returns `InvalidArgument` if the geometry or the shared memory request
/// exceeds what a device accepts.
pub(crate) fn device_config(
    cfg: &LaunchConfig,
    shared_mem_bytes: usize,
) -> Result<cudarc::driver::LaunchConfig> {
    if cfg.threads_per_group() > MAX_THREADS_PER_BLOCK {
        return Err(Error::invalid_argument(
            "threads_per_group",
            format!(
                "{} threads per block exceeds the CUDA limit of {MAX_THREADS_PER_BLOCK}",
                cfg.threads_per_group()
            ),
        ));
    }
    if cfg.group_count() > MAX_GRID {
        return Err(Error::invalid_argument(
            "group_count",
            format!("{} blocks exceeds the CUDA grid limit", cfg.group_count()),
        ));
    }
    if shared_mem_bytes > MAX_SHARED_BYTES {
        return Err(Error::invalid_argument(
            "threads_per_group",
            format!(
                "reduction needs {shared_mem_bytes} bytes of shared memory, limit is {MAX_SHARED_BYTES}"
            ),
        ));
    }
    Ok(cudarc::driver::LaunchConfig {
        grid_dim: (cfg.group_count() as u32, 1, 1),
        block_dim: (cfg.threads_per_group() as u32, 1, 1),
        shared_mem_bytes: shared_mem_bytes as u32,
    })
}

// ============================================================================
// Kernel Plans
// ============================================================================

/// How each element is produced from the staged input
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Prologue {
    /// The input element itself
    Load,
    /// `map(self, input[i], args)`
    Map,
    /// A register copy of `input[i]` after `map_in_place`
    MapInPlace,
}

/// What happens to a produced element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Epilogue {
    /// Written to slot `i` of a new output buffer
    Store,
    /// Written back to slot `i` of the staged input
    StoreInPlace,
    /// Compacted through the device counter if accepted
    Filter,
    /// Folded into the block tree, then into the accumulator
    Reduce,
}

/// The generated kernel for one call shape
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct KernelPlan {
    prologue: Prologue,
    epilogue: Epilogue,
}

impl KernelPlan {
    pub(crate) const MAP: Self = Self::new(Prologue::Map, Epilogue::Store);
    pub(crate) const MAP_IN_PLACE: Self = Self::new(Prologue::MapInPlace, Epilogue::StoreInPlace);
    pub(crate) const FILTER: Self = Self::new(Prologue::Load, Epilogue::Filter);
    pub(crate) const REDUCE: Self = Self::new(Prologue::Load, Epilogue::Reduce);
    pub(crate) const MAP_REDUCE: Self = Self::new(Prologue::Map, Epilogue::Reduce);
    pub(crate) const MAP_IN_PLACE_REDUCE: Self = Self::new(Prologue::MapInPlace, Epilogue::Reduce);
    pub(crate) const MAP_FILTER: Self = Self::new(Prologue::Map, Epilogue::Filter);
    pub(crate) const MAP_IN_PLACE_FILTER: Self = Self::new(Prologue::MapInPlace, Epilogue::Filter);

    const fn new(prologue: Prologue, epilogue: Epilogue) -> Self {
        Self { prologue, epilogue }
    }

    /// Name of the `extern "C"` entry point
    pub(crate) fn entry(&self) -> &'static str {
        match self.epilogue {
            Epilogue::Store => "offload_map",
            Epilogue::StoreInPlace => "offload_map_in_place",
            Epilogue::Filter => "offload_filter",
            Epilogue::Reduce => "offload_reduce",
        }
    }
}

/// C++ spelling and identity of one typedef'd type
#[derive(Clone, Copy, Debug)]
struct TypeSpec {
    id: TypeId,
    name: &'static str,
    decl: &'static str,
}

impl TypeSpec {
    fn of<T: DeviceElement>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: T::CUDA_TYPE,
            decl: T::CUDA_DECL,
        }
    }
}

/// Types bound to `in_t`, `out_t`, `args_t` and `state_t`
#[derive(Clone, Copy, Debug)]
pub(crate) struct KernelTypes {
    input: TypeSpec,
    output: TypeSpec,
    args: TypeSpec,
    state: TypeSpec,
}

impl KernelTypes {
    pub(crate) fn of<I, O, A, S>() -> Self
    where
        I: DeviceElement,
        O: DeviceElement,
        A: DeviceElement,
        S: DeviceElement,
    {
        Self {
            input: TypeSpec::of::<I>(),
            output: TypeSpec::of::<O>(),
            args: TypeSpec::of::<A>(),
            state: TypeSpec::of::<S>(),
        }
    }

    fn ids(&self) -> [TypeId; 4] {
        [self.input.id, self.output.id, self.args.id, self.state.id]
    }
}

// ============================================================================
// Source Generation
// ============================================================================

const GRID_STRIDE: &str = "for (unsigned long long i = (unsigned long long)blockIdx.x * blockDim.x + threadIdx.x; \
     i < n; i += (unsigned long long)gridDim.x * blockDim.x)";

fn prologue_source(prologue: Prologue) -> &'static str {
    match prologue {
        Prologue::Load => {
            r#"
__device__ __forceinline__ out_t offload_element(
    const state_t& self, const in_t* input, unsigned long long i, const args_t& args) {
    return input[i];
}
"#
        }
        Prologue::Map => {
            r#"
__device__ __forceinline__ out_t offload_element(
    const state_t& self, const in_t* input, unsigned long long i, const args_t& args) {
    return map(self, input[i], args);
}
"#
        }
        Prologue::MapInPlace => {
            r#"
__device__ __forceinline__ out_t offload_element(
    const state_t& self, const in_t* input, unsigned long long i, const args_t& args) {
    in_t x = input[i];
    map_in_place(self, x, args);
    return x;
}
"#
        }
    }
}

fn epilogue_source(epilogue: Epilogue) -> String {
    match epilogue {
        Epilogue::Store => format!(
            r#"
extern "C" __global__ void offload_map(
    const in_t* input, out_t* output, unsigned long long n,
    const args_t* args, const state_t* self_state) {{
    {GRID_STRIDE} {{
        output[i] = offload_element(*self_state, input, i, *args);
    }}
}}
"#
        ),
        Epilogue::StoreInPlace => format!(
            r#"
extern "C" __global__ void offload_map_in_place(
    in_t* data, unsigned long long n, const args_t* args, const state_t* self_state) {{
    {GRID_STRIDE} {{
        map_in_place(*self_state, data[i], *args);
    }}
}}
"#
        ),
        Epilogue::Filter => format!(
            r#"
extern "C" __global__ void offload_filter(
    const in_t* input, out_t* output, unsigned long long n, unsigned long long* count,
    const args_t* args, const state_t* self_state) {{
    {GRID_STRIDE} {{
        out_t x = offload_element(*self_state, input, i, *args);
        if (filter(*self_state, x)) {{
            unsigned long long slot = atomicAdd(count, 1ULL);
            output[slot] = x;
        }}
    }}
}}
"#
        ),
        Epilogue::Reduce => format!(
            r#"
extern "C" __global__ void offload_reduce(
    const in_t* input, unsigned long long n, out_t* acc, int* lock,
    const args_t* args, const state_t* self_state) {{
    extern __shared__ __align__(16) unsigned char offload_shared[];
    out_t* partials = reinterpret_cast<out_t*>(offload_shared);

    out_t local = identity(*self_state);
    {GRID_STRIDE} {{
        out_t x = offload_element(*self_state, input, i, *args);
        reduce(*self_state, &local, x);
    }}
    partials[threadIdx.x] = local;
    __syncthreads();

    for (unsigned int width = blockDim.x; width > 1;) {{
        unsigned int half = (width + 1) / 2;
        if (threadIdx.x < width - half) {{
            reduce(*self_state, &partials[threadIdx.x], partials[threadIdx.x + half]);
        }}
        __syncthreads();
        width = half;
    }}

    if (threadIdx.x == 0) {{
        while (atomicCAS(lock, 0, 1) != 0) {{}}
        __threadfence();
        volatile unsigned char* shared_acc = reinterpret_cast<volatile unsigned char*>(acc);
        out_t current;
        unsigned char* bytes = reinterpret_cast<unsigned char*>(&current);
        for (unsigned int k = 0; k < sizeof(out_t); ++k) bytes[k] = shared_acc[k];
        reduce(*self_state, &current, partials[0]);
        for (unsigned int k = 0; k < sizeof(out_t); ++k) shared_acc[k] = bytes[k];
        __threadfence();
        atomicExch(lock, 0);
    }}
}}
"#
        ),
    }
}

/// Assemble the full CUDA C++ module for one algorithm and plan
pub(crate) fn generate_source<K: DeviceKernel>(plan: KernelPlan, types: &KernelTypes) -> String {
    let mut src = String::new();
    let mut declared: Vec<&'static str> = Vec::new();
    for spec in [types.input, types.output, types.args, types.state] {
        if !spec.decl.is_empty() && !declared.contains(&spec.decl) {
            declared.push(spec.decl);
            let _ = writeln!(src, "{}", spec.decl);
        }
    }
    let _ = writeln!(src, "typedef {} in_t;", types.input.name);
    let _ = writeln!(src, "typedef {} out_t;", types.output.name);
    let _ = writeln!(src, "typedef {} args_t;", types.args.name);
    let _ = writeln!(src, "typedef {} state_t;", types.state.name);
    src.push_str(K::SOURCE);
    src.push('\n');
    if plan.epilogue != Epilogue::StoreInPlace {
        src.push_str(prologue_source(plan.prologue));
    }
    src.push_str(&epilogue_source(plan.epilogue));
    src
}

// ============================================================================
// Kernel Module Cache
// ============================================================================

type ModuleKey = (usize, TypeId, KernelPlan, [TypeId; 4]);

/// Cache for compiled modules, keyed by (device, algorithm, plan, types)
static MODULE_CACHE: OnceLock<Mutex<HashMap<ModuleKey, Arc<CudaModule>>>> = OnceLock::new();

/// Get the entry point of the plan's kernel, compiling it on first use.
///
/// # Errors
///
/// Returns `KernelCompile` if NVRTC rejects the generated source (usually
/// a missing or mistyped device function in `K::SOURCE`).
pub(crate) fn get_or_load_kernel<K: DeviceKernel>(
    client: &CudaClient,
    plan: KernelPlan,
    types: &KernelTypes,
) -> Result<CudaFunction> {
    let cache = MODULE_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let key = (client.device.index, TypeId::of::<K>(), plan, types.ids());

    let module = {
        let mut guard = lock_cache(cache);
        match guard.get(&key) {
            Some(module) => module.clone(),
            None => {
                let src = generate_source::<K>(plan, types);
                tracing::debug!(
                    kernel = plan.entry(),
                    algorithm = std::any::type_name::<K>(),
                    "compiling device kernel"
                );
                let ptx = compile_ptx(&src).map_err(|e| {
                    Error::KernelCompile(format!(
                        "{} for {}: {e:?}",
                        plan.entry(),
                        std::any::type_name::<K>()
                    ))
                })?;
                let module = client.context.load_module(ptx)?;
                guard.insert(key, module.clone());
                module
            }
        }
    };

    Ok(module.load_function(plan.entry())?)
}

// ============================================================================
// Drivers
// ============================================================================

/// Device buffers shared by every plan
struct Staged {
    input: CudaSlice<u8>,
    args: CudaSlice<u8>,
    state: CudaSlice<u8>,
}

fn stage_call<K, I, A>(client: &CudaClient, alg: &K, data: &[I], args: &A) -> Result<Staged>
where
    K: DeviceKernel,
    I: DeviceElement,
    A: DeviceElement,
{
    Ok(Staged {
        input: client.stage(data)?,
        args: client.stage_value(args)?,
        state: client.stage_value(&alg.state())?,
    })
}

/// Wait for the launch and report asynchronous faults against the kernel
fn finish_launch(client: &CudaClient, plan: KernelPlan) -> Result<()> {
    client
        .stream
        .synchronize()
        .map_err(|e| Error::launch_failed(plan.entry(), e))
}

/// Run a `Store` plan: `out[i] = element(i)`
pub(crate) fn launch_map<K, I, O, A>(
    client: &CudaClient,
    alg: &K,
    plan: KernelPlan,
    cfg: &LaunchConfig,
    data: &[I],
    args: &A,
    out: &mut [O],
) -> Result<()>
where
    K: DeviceKernel,
    I: DeviceElement,
    O: DeviceElement,
    A: DeviceElement,
{
    let n = data.len();
    if n == 0 {
        return Ok(());
    }
    let launch = device_config(cfg, 0)?;
    let func = get_or_load_kernel::<K>(client, plan, &KernelTypes::of::<I, O, A, K::State>())?;
    let staged = stage_call(client, alg, data, args)?;
    let mut output = client.alloc_bytes(n * size_of::<O>())?;
    let n64 = n as u64;

    {
        let mut builder = client.stream.launch_builder(&func);
        builder.arg(&staged.input);
        builder.arg(&mut output);
        builder.arg(&n64);
        builder.arg(&staged.args);
        builder.arg(&staged.state);
        // SAFETY: the argument list matches the generated `offload_map`
        // signature; every buffer holds at least `n` elements.
        unsafe { builder.launch(launch) }.map_err(|e| Error::launch_failed(plan.entry(), e))?;
    }
    finish_launch(client, plan)?;

    client.destage(&output, out)
}

/// Run the in-place plan on a staged copy of `data` and destage into it
pub(crate) fn launch_map_in_place<K, T, A>(
    client: &CudaClient,
    alg: &K,
    cfg: &LaunchConfig,
    data: &mut [T],
    args: &A,
) -> Result<()>
where
    K: DeviceKernel,
    T: DeviceElement,
    A: DeviceElement,
{
    let n = data.len();
    if n == 0 {
        return Ok(());
    }
    let plan = KernelPlan::MAP_IN_PLACE;
    let launch = device_config(cfg, 0)?;
    let func = get_or_load_kernel::<K>(client, plan, &KernelTypes::of::<T, T, A, K::State>())?;
    let mut staged = stage_call(client, alg, data, args)?;
    let n64 = n as u64;

    {
        let mut builder = client.stream.launch_builder(&func);
        builder.arg(&mut staged.input);
        builder.arg(&n64);
        builder.arg(&staged.args);
        builder.arg(&staged.state);
        // SAFETY: matches `offload_map_in_place`; `input` holds `n` elements.
        unsafe { builder.launch(launch) }.map_err(|e| Error::launch_failed(plan.entry(), e))?;
    }
    finish_launch(client, plan)?;

    client.destage(&staged.input, data)
}

/// Run a `Filter` plan and return the accepted elements
///
/// `out` must be empty with capacity for `data.len()` elements; it is
/// resized to the accepted count.
pub(crate) fn launch_filter<K, I, O, A>(
    client: &CudaClient,
    alg: &K,
    plan: KernelPlan,
    cfg: &LaunchConfig,
    data: &[I],
    args: &A,
    out: &mut Vec<O>,
) -> Result<()>
where
    K: DeviceKernel,
    I: DeviceElement,
    O: DeviceElement,
    A: DeviceElement,
{
    let n = data.len();
    if n == 0 {
        return Ok(());
    }
    let launch = device_config(cfg, 0)?;
    let func = get_or_load_kernel::<K>(client, plan, &KernelTypes::of::<I, O, A, K::State>())?;
    let staged = stage_call(client, alg, data, args)?;
    let mut output = client.alloc_bytes(n * size_of::<O>())?;
    let mut count = client.alloc_zeros::<u64>(1)?;
    let n64 = n as u64;

    {
        let mut builder = client.stream.launch_builder(&func);
        builder.arg(&staged.input);
        builder.arg(&mut output);
        builder.arg(&n64);
        builder.arg(&mut count);
        builder.arg(&staged.args);
        builder.arg(&staged.state);
        // SAFETY: matches `offload_filter`; `output` has a slot for every
        // input element and `count` starts at zero.
        unsafe { builder.launch(launch) }.map_err(|e| Error::launch_failed(plan.entry(), e))?;
    }
    finish_launch(client, plan)?;

    let accepted = client.stream.clone_dtoh(&count)?;
    client.stream.synchronize()?;
    let accepted = accepted.first().copied().unwrap_or(0) as usize;
    if accepted > n {
        return Err(Error::Internal(format!(
            "filter counter reported {accepted} accepted of {n} elements"
        )));
    }
    tracing::debug!(size = n, accepted, "cuda compaction");

    out.resize(accepted, bytemuck::Zeroable::zeroed());
    client.destage(&output, out)
}

/// Dynamic shared memory for one block of reduce partials
///
/// Sized by the device spelling of `O`: `()` is the one-byte
/// `offload_unit_t` there, not a zero-sized value.
fn reduce_shared_bytes<O: DeviceElement>(cfg: &LaunchConfig) -> usize {
    cfg.threads_per_group()
        .saturating_mul(size_of::<O>().max(1))
}

/// Run a `Reduce` plan starting the accumulator at `identity`
pub(crate) fn launch_reduce<K, I, O, A>(
    client: &CudaClient,
    alg: &K,
    plan: KernelPlan,
    cfg: &LaunchConfig,
    data: &[I],
    args: &A,
    identity: O,
) -> Result<O>
where
    K: DeviceKernel,
    I: DeviceElement,
    O: DeviceElement,
    A: DeviceElement,
{
    let n = data.len();
    if n == 0 {
        return Ok(identity);
    }
    let shared = reduce_shared_bytes::<O>(cfg);
    let launch = device_config(cfg, shared)?;
    let func = get_or_load_kernel::<K>(client, plan, &KernelTypes::of::<I, O, A, K::State>())?;
    let staged = stage_call(client, alg, data, args)?;
    let mut acc = client.stage_value(&identity)?;
    let mut lock = client.alloc_zeros::<i32>(1)?;
    let n64 = n as u64;

    {
        let mut builder = client.stream.launch_builder(&func);
        builder.arg(&staged.input);
        builder.arg(&n64);
        builder.arg(&mut acc);
        builder.arg(&mut lock);
        builder.arg(&staged.args);
        builder.arg(&staged.state);
        // SAFETY: matches `offload_reduce`; shared memory holds one partial per
        // thread and the lock starts released.
        unsafe { builder.launch(launch) }.map_err(|e| Error::launch_failed(plan.entry(), e))?;
    }
    finish_launch(client, plan)?;

    let mut result = [identity];
    client.destage(&acc, &mut result)?;
    Ok(result[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Halve;

    impl DeviceKernel for Halve {
        type State = ();
        const SOURCE: &'static str = "__device__ out_t map(const state_t&, const in_t& x, const args_t&) { return x * 0.5; }";
        fn state(&self) {}
    }

    #[test]
    fn test_plan_entry_points() {
        assert_eq!(KernelPlan::MAP.entry(), "offload_map");
        assert_eq!(KernelPlan::MAP_IN_PLACE.entry(), "offload_map_in_place");
        assert_eq!(KernelPlan::MAP_FILTER.entry(), "offload_filter");
        assert_eq!(KernelPlan::MAP_IN_PLACE_REDUCE.entry(), "offload_reduce");
    }

    #[test]
    fn test_generated_source_layout() {
        let types = KernelTypes::of::<f32, f64, (), ()>();
        let src = generate_source::<Halve>(KernelPlan::MAP, &types);
        let decl = src.find("struct offload_unit_t").unwrap();
        let typedef = src.find("typedef float in_t;").unwrap();
        let body = src.find("x * 0.5").unwrap();
        let entry = src.find("extern \"C\" __global__ void offload_map(").unwrap();
        assert!(decl < typedef && typedef < body && body < entry);
        assert!(src.contains("typedef double out_t;"));
        assert!(src.contains("typedef offload_unit_t args_t;"));
        // args and state share one declaration
        assert_eq!(src.matches("struct offload_unit_t").count(), 1);
    }

    #[test]
    fn test_in_place_plan_skips_element_prologue() {
        let types = KernelTypes::of::<f32, f32, (), ()>();
        let src = generate_source::<Halve>(KernelPlan::MAP_IN_PLACE, &types);
        assert!(!src.contains("offload_element"));
        let fused = generate_source::<Halve>(KernelPlan::MAP_IN_PLACE_FILTER, &types);
        assert!(fused.contains("map_in_place(self, x, args)"));
        assert!(fused.contains("atomicAdd(count, 1ULL)"));
    }

    #[test]
    fn test_reduce_shared_memory_covers_unit_partials() {
        let cfg = LaunchConfig::new(2, 128).unwrap();
        assert_eq!(reduce_shared_bytes::<f64>(&cfg), 128 * 8);
        assert_eq!(reduce_shared_bytes::<()>(&cfg), 128);
    }

    #[test]
    fn test_device_config_limits() {
        let ok = LaunchConfig::new(4, 256).unwrap();
        let launch = device_config(&ok, 1024).unwrap();
        assert_eq!(launch.grid_dim, (4, 1, 1));
        assert_eq!(launch.block_dim, (256, 1, 1));

        let too_wide = LaunchConfig::new(1, 2048).unwrap();
        assert!(matches!(
            device_config(&too_wide, 0),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            device_config(&ok, MAX_SHARED_BYTES + 1),
            Err(Error::InvalidArgument { .. })
        ));
    }
}
