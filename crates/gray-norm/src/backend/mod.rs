//! Execution backends for the array arithmetic.
//!
//! The pipeline in [`crate::pipeline`] is written once against
//! [`NormBackend`]; this module provides the two implementations (GPU
//! compute via wgpu, host CPU) and the startup probe that picks between
//! them. The probe is an explicit capability check returning a handle --
//! an absent or unusable GPU is a normal outcome, not an error.

mod cpu;
mod gpu;

pub use cpu::CpuBackend;
pub use gpu::GpuBackend;

use crate::error::NormError;
use crate::pipeline::normalize_with;
use crate::raster::{NormalizedImage, RgbRaster};

/// The minimal array interface the pipeline needs.
///
/// `Field` is the backend's representation of the intermediate scalar
/// field: a host vector on the CPU, a device-resident buffer on the GPU.
/// Keeping the field in the backend's own space means the GPU path never
/// round-trips intermediates through host memory.
pub trait NormBackend {
    type Field;

    /// Dot each pixel's channels with [`crate::CHANNEL_WEIGHTS`] and
    /// subtract [`crate::CENTER_OFFSET`], producing the scalar field.
    fn project(&self, raster: &RgbRaster<'_>) -> Result<Self::Field, NormError>;

    /// Reduce the field to `(min, max)`.
    fn min_max(&self, field: &Self::Field) -> Result<(f32, f32), NormError>;

    /// Map each element to `(v - minv) * scale` and convert to `u16` with
    /// saturation.
    fn rescale(&self, field: Self::Field, minv: f32, scale: f32) -> Result<Vec<u16>, NormError>;
}

/// The backend selected for this invocation.
pub enum Backend {
    Gpu(GpuBackend),
    Cpu(CpuBackend),
}

impl Backend {
    /// Probe for a usable GPU; fall back to the host CPU.
    ///
    /// The CPU backend is always available, so acquisition cannot fail.
    pub fn acquire() -> Self {
        match GpuBackend::acquire() {
            Some(gpu) => Backend::Gpu(gpu),
            None => {
                tracing::debug!("no usable GPU adapter, using host CPU");
                Backend::Cpu(CpuBackend)
            }
        }
    }

    /// Short name of the execution path, used in derived output filenames.
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Gpu(_) => "gpu",
            Backend::Cpu(_) => "cpu",
        }
    }

    /// Human-readable description of the compute device.
    pub fn describe(&self) -> String {
        match self {
            Backend::Gpu(gpu) => gpu.describe(),
            Backend::Cpu(cpu) => cpu.describe(),
        }
    }

    /// Run the full pipeline on whichever backend was acquired.
    pub fn normalize(&self, raster: &RgbRaster<'_>) -> Result<NormalizedImage, NormError> {
        match self {
            Backend::Gpu(gpu) => normalize_with(gpu, raster),
            Backend::Cpu(cpu) => normalize_with(cpu, raster),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_always_yields_a_backend() {
        let backend = Backend::acquire();
        assert!(matches!(backend.name(), "gpu" | "cpu"));
        assert!(!backend.describe().is_empty());
    }

    #[test]
    fn test_acquired_backend_normalizes() {
        let backend = Backend::acquire();
        let pixels = [
            255u8, 255, 255, //
            0, 0, 0, //
            0, 0, 0, //
            0, 0, 0,
        ];
        let raster = RgbRaster::new(&pixels, 2, 2).unwrap();
        let image = backend.normalize(&raster).unwrap();

        assert_eq!(image.values().iter().filter(|&&v| v == 65535).count(), 1);
        assert_eq!(image.values().iter().filter(|&&v| v == 0).count(), 3);
    }
}
