//! Element traits for values that can be staged to a device

use bytemuck::Pod;

/// Trait for types that can be copied byte-for-byte into device memory
///
/// Host execution accepts any `Send + Sync` element; the GPU backend needs
/// more: the value must be plain old data (`Pod`) so it can be staged as
/// raw bytes, and it must have a CUDA C++ spelling so the generated
/// kernels can name it.
///
/// # Implementing for custom types
///
/// ```ignore
/// #[repr(C)]
/// #[derive(Clone, Copy, Pod, Zeroable)]
/// struct Hit { x: f32, y: f32 }
///
/// impl DeviceElement for Hit {
///     const CUDA_TYPE: &'static str = "Hit";
///     const CUDA_DECL: &'static str = "struct Hit { float x; float y; };";
/// }
/// ```
pub trait DeviceElement: Pod + Send + Sync {
    /// Name of the matching C++ type inside generated kernels
    const CUDA_TYPE: &'static str;

    /// C++ declaration emitted ahead of the kernel source
    ///
    /// Empty for built-in types. Custom `#[repr(C)]` structs declare
    /// themselves here with the same field layout.
    const CUDA_DECL: &'static str = "";
}

macro_rules! impl_device_element {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl DeviceElement for $ty {
                const CUDA_TYPE: &'static str = $name;
            }
        )*
    };
}

impl_device_element! {
    f32 => "float",
    f64 => "double",
    i8 => "signed char",
    i16 => "short",
    i32 => "int",
    i64 => "long long",
    u8 => "unsigned char",
    u16 => "unsigned short",
    u32 => "unsigned int",
    u64 => "unsigned long long",
}

/// `()` stands for "no extra arguments" or "stateless algorithm".
///
/// Kernels see it as a one-byte placeholder struct.
impl DeviceElement for () {
    const CUDA_TYPE: &'static str = "offload_unit_t";
    const CUDA_DECL: &'static str = "struct offload_unit_t { unsigned char _unused; };";
}
