//! Error types for offload

use thiserror::Error;

/// Result type alias using offload's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while staging, launching or destaging a parallel call
///
/// Capability errors (an algorithm without a usable shape) never show up here:
/// they are rejected by the compiler.
#[derive(Error, Debug)]
pub enum Error {
    /// Out of memory
    #[error("Out of memory: failed to allocate {size} bytes")]
    OutOfMemory {
        /// Requested size in bytes
        size: usize,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// A kernel launch failed or faulted while running
    #[error("Launch of '{kernel}' failed: {reason}")]
    LaunchFailed {
        /// Name of the kernel that was launched
        kernel: &'static str,
        /// Backend supplied description
        reason: String,
    },

    /// Backend-specific error
    #[error("Backend error: {0}")]
    Backend(String),

    /// CUDA driver error
    #[cfg(feature = "cuda")]
    #[error("CUDA error: {0}")]
    Cuda(#[from] cudarc::driver::DriverError),

    /// Generated device code did not compile
    #[cfg(feature = "cuda")]
    #[error("Kernel compilation failed: {0}")]
    KernelCompile(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an out-of-memory error for `len` elements of `T`
    pub fn out_of_memory<T>(len: usize) -> Self {
        Self::OutOfMemory {
            size: len.saturating_mul(std::mem::size_of::<T>()),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create a launch failure error
    pub fn launch_failed(kernel: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::LaunchFailed {
            kernel,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_memory_reports_bytes() {
        let err = Error::out_of_memory::<f64>(4);
        assert!(matches!(err, Error::OutOfMemory { size: 32 }));
        assert_eq!(err.to_string(), "Out of memory: failed to allocate 32 bytes");
    }

    #[test]
    fn test_out_of_memory_saturates() {
        let err = Error::out_of_memory::<u64>(usize::MAX);
        assert!(matches!(err, Error::OutOfMemory { size: usize::MAX }));
    }

    #[test]
    fn test_launch_failed_message() {
        let err = Error::launch_failed("offload_map", "device fault");
        assert_eq!(err.to_string(), "Launch of 'offload_map' failed: device fault");
    }
}
