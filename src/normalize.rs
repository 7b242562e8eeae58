//! Grayscale normalization command orchestration.
//!
//! File handling lives here -- existence and no-overwrite checks, image
//! decode, 16-bit PNG encode, timing. The numeric pipeline itself is
//! `gray_norm`'s.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use gray_norm::{Backend, RgbRaster};
use image::{ImageBuffer, Luma};

use crate::error::NormalizeError;

/// Filename marker between the input stem and the execution-path name.
const OUTPUT_TAG: &str = "gs-norm";

/// Summary of a completed normalization run.
#[derive(Debug)]
pub struct NormalizeOutcome {
    pub output: PathBuf,
    /// Which execution path ran ("gpu" or "cpu").
    pub backend: &'static str,
    pub width: u32,
    pub height: u32,
    pub elapsed: Duration,
}

/// Derive the sibling output path `{stem}-gs-norm-{backend}.png`.
///
/// The output keeps the input's directory; only the filename changes, and
/// the extension is always `.png` (the output is a 16-bit grayscale PNG
/// regardless of the input format).
pub fn derive_output_path(input: &Path, backend_name: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!("{stem}-{OUTPUT_TAG}-{backend_name}.png");
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(name),
        _ => PathBuf::from(name),
    }
}

/// Normalize one input image to a full-range 16-bit grayscale PNG.
///
/// Fails before reading if the input is missing and before any pixel work
/// if the derived output name already exists; an existing output is never
/// overwritten.
pub fn run(input: &Path) -> Result<NormalizeOutcome, NormalizeError> {
    if !input.exists() {
        return Err(NormalizeError::InputMissing {
            path: input.to_path_buf(),
        });
    }

    let backend = Backend::acquire();
    tracing::info!(
        backend = backend.name(),
        device = %backend.describe(),
        "Compute backend selected"
    );

    let output = derive_output_path(input, backend.name());
    if output.exists() {
        return Err(NormalizeError::OutputExists { path: output });
    }

    let start = Instant::now();
    tracing::info!(output = %output.display(), "Reading image");
    let source = image::open(input)?.to_rgb8();
    let (width, height) = source.dimensions();
    tracing::info!(width, height, "Image read");

    let raster = RgbRaster::new(source.as_raw(), width, height)?;
    let normalized = backend.normalize(&raster)?;

    let gray: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_raw(width, height, normalized.into_values())
            .ok_or(NormalizeError::OutputBuffer { width, height })?;
    tracing::info!(width, height, "Writing 16-bit grayscale image");
    gray.save(&output)?;

    let elapsed = start.elapsed();
    tracing::info!(seconds = elapsed.as_secs_f64(), "Complete");

    Ok(NormalizeOutcome {
        output,
        backend: backend.name(),
        width,
        height,
        elapsed,
    })
}
