use std::path::PathBuf;
use thiserror::Error;

/// Errors from the tile stitcher.
///
/// Every variant is fatal to the whole stitch; there is no retry and no
/// partial output.
#[derive(Debug, Error)]
pub enum StitchError {
    #[error("Tile file {path} is missing")]
    MissingTile { path: PathBuf },

    #[error("Failed to decode tile {path}: {source}")]
    TileDecode {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Errors from the grayscale normalizer.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Input file {path} does not exist")]
    InputMissing { path: PathBuf },

    #[error("Output file {path} already exists")]
    OutputExists { path: PathBuf },

    #[error("Normalization error: {0}")]
    Norm(#[from] gray_norm::NormError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Normalized buffer does not match {width}x{height}")]
    OutputBuffer { width: u32, height: u32 },
}
