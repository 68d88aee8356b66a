//! Common test utilities and the algorithms the integration tests run
#![allow(dead_code)]

use offload::algorithm::{Filter, Map, MutatingMap, Reduce};
use offload::runtime::Backend;
#[cfg(feature = "cpu")]
use offload::runtime::host::{HostBackend, HostClient, HostDevice};
#[cfg(feature = "cuda")]
use offload::{
    algorithm::DeviceKernel,
    runtime::cuda::{CudaBackend, CudaClient, CudaDevice},
};

/// Install a test subscriber so driver events show up with `--nocapture`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Create a host client and device for testing
#[cfg(feature = "cpu")]
pub fn create_host_client() -> (HostClient, HostDevice) {
    let device = HostBackend::default_device();
    let client = HostBackend::default_client(&device).unwrap();
    (client, device)
}

/// Create a host client on a pool of exactly `threads` workers
#[cfg(feature = "cpu")]
pub fn create_host_client_with(threads: usize) -> (HostClient, HostDevice) {
    let device = HostDevice::with_threads(threads).unwrap();
    let client = HostBackend::default_client(&device).unwrap();
    (client, device)
}

/// Create a CUDA client and device, returning None if CUDA is unavailable
#[cfg(feature = "cuda")]
pub fn create_cuda_client() -> Option<(CudaClient, CudaDevice)> {
    if !CudaBackend::is_available() {
        return None;
    }
    let device = CudaBackend::default_device();
    let client = CudaBackend::default_client(&device).ok()?;
    Some((client, device))
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Sort f64 values for multiset comparison
pub fn sorted_f64(mut v: Vec<f64>) -> Vec<f64> {
    v.sort_by(f64::total_cmp);
    v
}

/// Sort values for multiset comparison
pub fn sorted<T: Ord>(mut v: Vec<T>) -> Vec<T> {
    v.sort_unstable();
    v
}

/// `[0, 1, ..., n)` as integers
pub fn iota(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

// ============================================================================
// Test algorithms
// ============================================================================

/// Integer to float, scaled by the argument
pub struct Scale;

impl Map<i64, f64> for Scale {
    type Output = f64;

    fn map(&self, input: &i64, factor: &f64) -> f64 {
        *input as f64 * factor
    }
}

/// Sum of every element
pub struct Sum;

impl Reduce<f64> for Sum {
    fn identity(&self) -> f64 {
        0.0
    }

    fn reduce(&self, acc: &mut f64, partial: &f64) {
        *acc += partial;
    }
}

impl Reduce<i64> for Sum {
    fn identity(&self) -> i64 {
        0
    }

    fn reduce(&self, acc: &mut i64, partial: &i64) {
        *acc += partial;
    }
}

/// Largest element; the identity is not zero
pub struct Max;

impl Reduce<i64> for Max {
    fn identity(&self) -> i64 {
        i64::MIN
    }

    fn reduce(&self, acc: &mut i64, partial: &i64) {
        *acc = (*acc).max(*partial);
    }
}

/// Keeps even values
pub struct Even;

impl Filter<f64> for Even {
    fn filter(&self, item: &f64) -> bool {
        item % 2.0 == 0.0
    }
}

impl Filter<i64> for Even {
    fn filter(&self, item: &i64) -> bool {
        item % 2 == 0
    }
}

/// Keeps values at or above a threshold carried as algorithm state
pub struct AtLeast(pub f64);

impl Filter<f64> for AtLeast {
    fn filter(&self, item: &f64) -> bool {
        *item >= self.0
    }
}

/// Scale then sum
pub struct ScaleSum;

impl Map<i64, f64> for ScaleSum {
    type Output = f64;

    fn map(&self, input: &i64, factor: &f64) -> f64 {
        Scale.map(input, factor)
    }
}

impl Reduce<f64> for ScaleSum {
    fn identity(&self) -> f64 {
        0.0
    }

    fn reduce(&self, acc: &mut f64, partial: &f64) {
        Sum.reduce(acc, partial)
    }
}

/// Scale then keep even values
pub struct ScaleEven;

impl Map<i64, f64> for ScaleEven {
    type Output = f64;

    fn map(&self, input: &i64, factor: &f64) -> f64 {
        Scale.map(input, factor)
    }
}

impl Filter<f64> for ScaleEven {
    fn filter(&self, item: &f64) -> bool {
        Even.filter(item)
    }
}

/// Adds the argument, in place or into a new collection
///
/// Also sums and keeps even values, so it can run as every integer shape.
pub struct Shift;

impl Map<i64, i64> for Shift {
    type Output = i64;

    fn map(&self, input: &i64, offset: &i64) -> i64 {
        input + offset
    }
}

impl MutatingMap<i64, i64> for Shift {
    fn map_in_place(&self, item: &mut i64, offset: &i64) {
        *item += offset;
    }
}

impl Reduce<i64> for Shift {
    fn identity(&self) -> i64 {
        0
    }

    fn reduce(&self, acc: &mut i64, partial: &i64) {
        *acc += partial;
    }
}

impl Filter<i64> for Shift {
    fn filter(&self, item: &i64) -> bool {
        item % 2 == 0
    }
}

// ============================================================================
// Device bodies
// ============================================================================

#[cfg(feature = "cuda")]
const SCALE_MAP: &str = r#"
__device__ out_t map(const state_t&, const in_t& x, const args_t& factor) {
    return (out_t)x * factor;
}
"#;

#[cfg(feature = "cuda")]
const SUM_REDUCE: &str = r#"
__device__ out_t identity(const state_t&) { return (out_t)0; }
__device__ void reduce(const state_t&, out_t* acc, const out_t& partial) { *acc += partial; }
"#;

#[cfg(feature = "cuda")]
const EVEN_FILTER: &str = r#"
__device__ bool filter(const state_t&, const out_t& x) { return fmod((double)x, 2.0) == 0.0; }
"#;

#[cfg(feature = "cuda")]
impl DeviceKernel for Scale {
    type State = ();
    const SOURCE: &'static str = SCALE_MAP;
    fn state(&self) {}
}

#[cfg(feature = "cuda")]
impl DeviceKernel for Sum {
    type State = ();
    const SOURCE: &'static str = SUM_REDUCE;
    fn state(&self) {}
}

#[cfg(feature = "cuda")]
impl DeviceKernel for Even {
    type State = ();
    const SOURCE: &'static str = EVEN_FILTER;
    fn state(&self) {}
}

#[cfg(feature = "cuda")]
impl DeviceKernel for ScaleSum {
    type State = ();
    const SOURCE: &'static str = r#"
__device__ out_t map(const state_t&, const in_t& x, const args_t& factor) {
    return (out_t)x * factor;
}
__device__ out_t identity(const state_t&) { return (out_t)0; }
__device__ void reduce(const state_t&, out_t* acc, const out_t& partial) { *acc += partial; }
"#;
    fn state(&self) {}
}

#[cfg(feature = "cuda")]
impl DeviceKernel for ScaleEven {
    type State = ();
    const SOURCE: &'static str = r#"
__device__ out_t map(const state_t&, const in_t& x, const args_t& factor) {
    return (out_t)x * factor;
}
__device__ bool filter(const state_t&, const out_t& x) { return fmod((double)x, 2.0) == 0.0; }
"#;
    fn state(&self) {}
}

#[cfg(feature = "cuda")]
impl DeviceKernel for Max {
    type State = ();
    const SOURCE: &'static str = r#"
__device__ out_t identity(const state_t&) { return (out_t)(-9223372036854775807LL - 1); }
__device__ void reduce(const state_t&, out_t* acc, const out_t& partial) {
    if (partial > *acc) *acc = partial;
}
"#;
    fn state(&self) {}
}

#[cfg(feature = "cuda")]
impl DeviceKernel for AtLeast {
    type State = f64;
    const SOURCE: &'static str = r#"
__device__ bool filter(const state_t& self, const out_t& x) { return x >= self; }
"#;
    fn state(&self) -> f64 {
        self.0
    }
}

#[cfg(feature = "cuda")]
impl DeviceKernel for Shift {
    type State = ();
    const SOURCE: &'static str = r#"
template <typename Args>
__device__ out_t map(const state_t&, const in_t& x, const Args& offset) { return x + offset; }
template <typename Args>
__device__ void map_in_place(const state_t&, in_t& x, const Args& offset) { x += offset; }
__device__ out_t identity(const state_t&) { return (out_t)0; }
__device__ void reduce(const state_t&, out_t* acc, const out_t& partial) { *acc += partial; }
__device__ bool filter(const state_t&, const out_t& x) { return x % 2 == 0; }
"#;
    fn state(&self) {}
}
