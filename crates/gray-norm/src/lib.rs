//! gray-norm: weighted-channel grayscale projection with full-range
//! 16-bit normalization.
//!
//! This library packs the three 8-bit channels of an RGB raster into one
//! scalar per pixel (`R*256 + G + B/256`, ordering primarily by red, then
//! green, then blue), then affine-rescales the scalar field so its minimum
//! maps to 0 and its maximum to 65535. It never touches image files --
//! callers hand it pixel buffers and encode the result themselves.
//!
//! # Quick Start
//!
//! ```
//! use gray_norm::{normalize_with, CpuBackend, RgbRaster};
//!
//! // One white pixel against three black ones.
//! let pixels = [255u8, 255, 255, 0, 0, 0, 0, 0, 0, 0, 0, 0];
//! let raster = RgbRaster::new(&pixels, 2, 2).unwrap();
//!
//! let image = normalize_with(&CpuBackend, &raster).unwrap();
//! assert_eq!(image.values().iter().filter(|&&v| v == 65535).count(), 1);
//! assert_eq!(image.values().iter().filter(|&&v| v == 0).count(), 3);
//! ```
//!
//! # Execution paths
//!
//! The pipeline is defined once against the [`NormBackend`] trait and runs
//! on one of two backends:
//!
//! - [`GpuBackend`]: wgpu compute kernels; the scalar field stays in
//!   device memory between the projection, reduction, and rescale steps.
//! - [`CpuBackend`]: sequential host arithmetic; always available.
//!
//! [`Backend::acquire`] probes for a GPU at startup and falls back to the
//! CPU. The choice determines only where the arithmetic runs: both
//! backends produce identical output up to floating-point rounding (within
//! one unit in the last place after the 16-bit conversion).
//!
//! # Edge cases
//!
//! A perfectly constant input has an empty normalization range (the
//! rescale denominator would be zero) and is rejected with
//! [`NormError::ConstantInput`] rather than normalized to an arbitrary
//! level.

pub mod backend;
pub mod error;
pub mod pipeline;
pub mod raster;


pub use backend::{Backend, CpuBackend, GpuBackend, NormBackend};
pub use error::NormError;
pub use pipeline::{normalize_with, CENTER_OFFSET, CHANNEL_WEIGHTS, OUTPUT_SPAN};
pub use raster::{NormalizedImage, RgbRaster};
