//! Tile-grid stitching.
//!
//! Composites a rectangular range of cached map tiles into one image. The
//! cache names tiles `{z}-{y}-{x}.png`; the composite places the tile for
//! grid cell `(y, x)` with its horizontal offset driven by the row index
//! and its vertical offset by the column index, matching the cache's
//! layout convention.

use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::error::StitchError;

/// Directory tiles are read from, relative to the working directory.
pub const CACHE_DIR: &str = "cache";

/// A rectangular tile range to composite.
#[derive(Debug, Clone)]
pub struct StitchJob {
    /// Origin column.
    pub x1: i64,
    /// Number of columns.
    pub dx: u32,
    /// Origin row.
    pub y1: i64,
    /// Number of rows.
    pub dy: u32,
    /// Zoom level; used only as a filename component.
    pub zoom: i64,
    /// Tile side length in pixels.
    pub tile_size: u32,
}

impl StitchJob {
    /// Path of the tile at column `x`, row `y`.
    pub fn tile_path(&self, cache_dir: &Path, x: i64, y: i64) -> PathBuf {
        cache_dir.join(format!("{}-{}-{}.png", self.zoom, y, x))
    }

    /// Number of tiles the job reads.
    pub fn tile_count(&self) -> u64 {
        u64::from(self.dx) * u64::from(self.dy)
    }

    /// Composite dimensions `(s*dx, s*dy)`.
    pub fn output_size(&self) -> (u32, u32) {
        (self.tile_size * self.dx, self.tile_size * self.dy)
    }
}

/// Composite every tile of `job` into a single RGB image.
///
/// Tiles are read with the column loop outermost, one progress event per
/// column. Placements that extend past the canvas are clipped. A missing
/// tile aborts the whole stitch and no output is produced; any decode
/// failure propagates the same way.
pub fn stitch(job: &StitchJob, cache_dir: &Path) -> Result<RgbImage, StitchError> {
    let (width, height) = job.output_size();
    let mut composite = RgbImage::new(width, height);
    let side = i64::from(job.tile_size);

    for x in job.x1..job.x1 + i64::from(job.dx) {
        tracing::info!(row = x - job.x1, "Reading row");
        for y in job.y1..job.y1 + i64::from(job.dy) {
            let path = job.tile_path(cache_dir, x, y);
            if !path.exists() {
                return Err(StitchError::MissingTile { path });
            }
            let tile = image::open(&path)
                .map_err(|source| StitchError::TileDecode {
                    path: path.clone(),
                    source,
                })?
                .to_rgb8();

            image::imageops::replace(
                &mut composite,
                &tile,
                (y - job.y1) * side,
                (x - job.x1) * side,
            );
        }
    }

    Ok(composite)
}
