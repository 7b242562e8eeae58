use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tilekit::normalize;
use tilekit::stitch::{self, StitchJob};

#[derive(Parser)]
#[command(name = "tilekit")]
#[command(about = "Tiled-image workflow tools: tile-grid stitching and 16-bit grayscale normalization")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stitch a rectangular grid of cached tiles into one image
    Stitch {
        /// Origin column of the tile range
        #[arg(allow_negative_numbers = true)]
        x1: i64,
        /// Number of tile columns
        dx: u32,
        /// Origin row of the tile range
        #[arg(allow_negative_numbers = true)]
        y1: i64,
        /// Number of tile rows
        dy: u32,
        /// Zoom level (used only to locate tile files)
        #[arg(allow_negative_numbers = true)]
        z: i64,
        /// Tile side length in pixels
        s: u32,
        /// Output image path (format inferred from the extension)
        output: PathBuf,
    },
    /// Normalize an image to a full-range 16-bit grayscale PNG
    Normalize {
        /// Input image path
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Minimal logging for CLI
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tilekit=info,gray_norm=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    match cli.command {
        Commands::Stitch {
            x1,
            dx,
            y1,
            dy,
            z,
            s,
            output,
        } => run_stitch_command(x1, dx, y1, dy, z, s, &output),
        Commands::Normalize { input } => run_normalize_command(&input),
    }
}

/// Stitch a tile range from the cache directory into one image file.
#[allow(clippy::too_many_arguments)]
fn run_stitch_command(
    x1: i64,
    dx: u32,
    y1: i64,
    dy: u32,
    z: i64,
    s: u32,
    output: &Path,
) -> anyhow::Result<()> {
    let job = StitchJob {
        x1,
        dx,
        y1,
        dy,
        zoom: z,
        tile_size: s,
    };

    let composite = stitch::stitch(&job, Path::new(stitch::CACHE_DIR))?;
    tracing::info!("Done reading, now writing");
    composite.save(output)?;

    println!(
        "Stitched {} tiles into {} ({}x{})",
        job.tile_count(),
        output.display(),
        composite.width(),
        composite.height()
    );
    Ok(())
}

/// Normalize one image to a 16-bit grayscale PNG next to it.
fn run_normalize_command(input: &Path) -> anyhow::Result<()> {
    let outcome = normalize::run(input)?;

    println!(
        "Wrote {} ({}x{}, {} backend, {:.1}s)",
        outcome.output.display(),
        outcome.width,
        outcome.height,
        outcome.backend,
        outcome.elapsed.as_secs_f64()
    );
    Ok(())
}
