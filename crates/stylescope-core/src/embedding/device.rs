//! Compute device resolution for ONNX Runtime sessions.
//!
//! The device is resolved once when a provider is loaded. Asking for an
//! accelerator never fails: if CUDA cannot be used the session is built on
//! the CPU and the fallback is logged.

use std::fmt;
use std::path::Path;

use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;

use crate::error::ClassifyError;

/// Device requested by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DevicePreference {
    /// Use CUDA when compiled in, otherwise the CPU.
    #[default]
    Auto,
    /// Always the CPU.
    Cpu,
    /// A specific CUDA device.
    Cuda { device_id: u32 },
}

impl DevicePreference {
    /// Parse `"auto"`, `"cpu"`, `"cuda"` or `"cuda:<id>"` (case-insensitive).
    pub fn parse(s: &str) -> Result<Self, String> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda { device_id: 0 }),
            other => match other.strip_prefix("cuda:") {
                Some(id) => id
                    .parse()
                    .map(|device_id| Self::Cuda { device_id })
                    .map_err(|_| format!("invalid CUDA device id {id:?}")),
                None => Err(format!(
                    "unknown device {s:?} (expected auto, cpu, cuda or cuda:<id>)"
                )),
            },
        }
    }

    /// Pick the device to attempt first.
    pub fn resolve(self) -> Device {
        let device = match self {
            Self::Cpu => Device::Cpu,
            Self::Auto if cfg!(feature = "cuda") => Device::Cuda { device_id: 0 },
            Self::Auto => Device::Cpu,
            Self::Cuda { device_id } if cfg!(feature = "cuda") => Device::Cuda { device_id },
            Self::Cuda { device_id } => {
                tracing::warn!(
                    "CUDA device {} requested but stylescope was built without the `cuda` feature; using CPU",
                    device_id
                );
                Device::Cpu
            }
        };
        tracing::debug!("Device preference {:?} resolved to {}", self, device);
        device
    }
}

/// Device an inference session actually runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    /// CPU execution
    #[default]
    Cpu,
    /// CUDA GPU execution
    Cuda { device_id: u32 },
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => f.write_str("CPU"),
            Self::Cuda { device_id } => write!(f, "CUDA:{device_id}"),
        }
    }
}

/// Build an ONNX session on `device`, falling back to the CPU.
///
/// Returns the session together with the device it was built for.
pub(crate) fn build_session(
    model_path: &Path,
    device: Device,
) -> Result<(Session, Device), ClassifyError> {
    if let Device::Cuda { device_id } = device {
        match cuda_session(model_path, device_id) {
            Ok(session) => return Ok((session, device)),
            Err(e) => tracing::warn!(
                "CUDA device {} unavailable for {:?} ({}); falling back to CPU",
                device_id,
                model_path,
                e
            ),
        }
    }

    let session = Session::builder()
        .map_err(|e| ClassifyError::model(format!("Failed to create ONNX session builder: {e}")))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| ClassifyError::model(format!("Failed to set optimization level: {e}")))?
        .commit_from_file(model_path)
        .map_err(|e| {
            ClassifyError::model(format!("Failed to load ONNX model {:?}: {e}", model_path))
        })?;

    Ok((session, Device::Cpu))
}

#[cfg(feature = "cuda")]
fn cuda_session(model_path: &Path, device_id: u32) -> Result<Session, String> {
    use ort::execution_providers::CUDAExecutionProvider;

    Session::builder()
        .map_err(|e| e.to_string())?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| e.to_string())?
        .with_execution_providers([CUDAExecutionProvider::default()
            .with_device_id(device_id as i32)
            .build()
            .error_on_failure()])
        .map_err(|e| e.to_string())?
        .commit_from_file(model_path)
        .map_err(|e| e.to_string())
}

#[cfg(not(feature = "cuda"))]
fn cuda_session(_model_path: &Path, _device_id: u32) -> Result<Session, String> {
    Err("built without the `cuda` feature".to_string())
}
