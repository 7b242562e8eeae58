//! The normalization pipeline, defined once against [`NormBackend`].
//!
//! The pipeline packs the three 8-bit channels of each pixel into one
//! scalar that orders primarily by red, then green, then blue, and then
//! affine-rescales the scalar field so its observed minimum maps to 0 and
//! its maximum to 65535. Which processor runs the array arithmetic is the
//! backend's business; the formula is fixed here.

use crate::backend::NormBackend;
use crate::error::NormError;
use crate::raster::{NormalizedImage, RgbRaster};

/// Per-channel weights of the scalar projection: `R*256 + G + B/256`.
///
/// One full green step equals 1/256 of a red step, and one blue step
/// 1/256 of a green step, so the packed scalar preserves channel ordering.
pub const CHANNEL_WEIGHTS: [f32; 3] = [256.0, 1.0, 1.0 / 256.0];

/// Constant subtracted from every projected value (2^15).
///
/// Centers the intermediate field around zero. The subtraction cancels out
/// of the final output because the rescale re-derives min/max from the
/// already-shifted data; it is kept because the packed-scalar format is
/// defined with it.
pub const CENTER_OFFSET: f32 = 32768.0;

/// Numerator of the rescale factor (2^16).
///
/// The observed maximum maps to exactly `OUTPUT_SPAN`, which the final
/// 16-bit conversion saturates to 65535.
pub const OUTPUT_SPAN: f32 = 65536.0;

/// Run the full pipeline on `raster` using `backend` for the arithmetic.
///
/// Steps:
/// 1. Project each pixel to `R*256 + G + B/256 - 32768` ([`NormBackend::project`]).
/// 2. Reduce the field to its minimum and maximum ([`NormBackend::min_max`]).
/// 3. Rescale to `(v - min) * (65536 / (max - min))` and convert to `u16`
///    with saturation ([`NormBackend::rescale`]).
///
/// A perfectly constant input has an empty normalization range and fails
/// with [`NormError::ConstantInput`] before any output is produced.
pub fn normalize_with<B: NormBackend>(
    backend: &B,
    raster: &RgbRaster<'_>,
) -> Result<NormalizedImage, NormError> {
    let field = backend.project(raster)?;
    let (minv, maxv) = backend.min_max(&field)?;
    if minv == maxv {
        return Err(NormError::ConstantInput { value: minv });
    }

    let scale = OUTPUT_SPAN / (maxv - minv);
    let values = backend.rescale(field, minv, scale)?;
    Ok(NormalizedImage::new(values, raster.width(), raster.height()))
}
