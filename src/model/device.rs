use candle_core::Device;
use tracing::info;

/// Compute backend a classifier runs on, as reported by `/` and `/ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Cpu,
    Cuda,
    Metal,
}

impl Backend {
    pub fn of(device: &Device) -> Self {
        if device.is_cuda() {
            Backend::Cuda
        } else if device.is_metal() {
            Backend::Metal
        } else {
            Backend::Cpu
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Cpu => "cpu",
            Backend::Cuda => "cuda",
            Backend::Metal => "metal",
        }
    }

    /// Forward passes on an accelerator are serialized by the classifier.
    pub fn is_accelerator(&self) -> bool {
        !matches!(self, Backend::Cpu)
    }
}

/// Picks the first usable device: Metal, then CUDA, then CPU.
///
/// Accelerators are only tried when the matching feature is compiled in; an
/// unavailable accelerator is never an error.
pub fn select_device() -> (Device, Backend) {
    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                info!(backend = "metal", "Using acceleration: Apple Metal");
                return (device, Backend::Metal);
            }
            Err(e) => tracing::warn!(error = %e, "Metal device unavailable"),
        }
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => {
                info!(backend = "cuda", "Using acceleration: NVIDIA CUDA");
                return (device, Backend::Cuda);
            }
            Err(e) => tracing::warn!(error = %e, "CUDA device unavailable"),
        }
    }

    info!(backend = "cpu", "Using CPU");
    (Device::Cpu, Backend::Cpu)
}
