//! Host-CPU backend: the guaranteed fallback and the reference
//! implementation the GPU path is tested against.

use crate::backend::NormBackend;
use crate::error::NormError;
use crate::pipeline::{CENTER_OFFSET, CHANNEL_WEIGHTS};
use crate::raster::RgbRaster;

/// Sequential host-memory implementation of the array operations.
pub struct CpuBackend;

impl CpuBackend {
    pub fn describe(&self) -> String {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        format!("host processor ({cores} logical cores)")
    }
}

impl NormBackend for CpuBackend {
    type Field = Vec<f32>;

    fn project(&self, raster: &RgbRaster<'_>) -> Result<Vec<f32>, NormError> {
        Ok(raster
            .pixels()
            .chunks_exact(3)
            .map(|px| {
                px[0] as f32 * CHANNEL_WEIGHTS[0]
                    + px[1] as f32 * CHANNEL_WEIGHTS[1]
                    + px[2] as f32 * CHANNEL_WEIGHTS[2]
                    - CENTER_OFFSET
            })
            .collect())
    }

    fn min_max(&self, field: &Vec<f32>) -> Result<(f32, f32), NormError> {
        let mut minv = f32::INFINITY;
        let mut maxv = f32::NEG_INFINITY;
        for &v in field {
            minv = minv.min(v);
            maxv = maxv.max(v);
        }
        Ok((minv, maxv))
    }

    fn rescale(&self, field: Vec<f32>, minv: f32, scale: f32) -> Result<Vec<u16>, NormError> {
        // `as` saturates, so the observed maximum (which lands on 65536.0)
        // converts to 65535.
        Ok(field
            .into_iter()
            .map(|v| ((v - minv) * scale) as u16)
            .collect())
    }
}
