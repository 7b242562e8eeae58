use thiserror::Error;

/// Errors from the normalization pipeline and its backends.
#[derive(Debug, Error)]
pub enum NormError {
    #[error("raster buffer holds {actual} bytes but {width}x{height} RGB needs {expected}")]
    ShapeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("raster has no pixels ({width}x{height})")]
    EmptyRaster { width: u32, height: u32 },

    #[error("input is a single constant value ({value}); the normalization range is empty")]
    ConstantInput { value: f32 },

    #[error("GPU error: {0}")]
    Gpu(String),
}
