use std::path::PathBuf;
use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;

use lidarcam::io::frame_pairing::{discover_frames,pair_frames,export_pairs};

/// Pair every point cloud with its closest image and copy the pairs into one data directory.
#[derive(Parser)]
#[command(name = "pair_frames")]
#[command(version)]
struct Cli {
    /// Directory of timestamped images
    #[arg(long)]
    images: PathBuf,

    /// Directory of timestamped point clouds
    #[arg(long)]
    clouds: PathBuf,

    /// Destination, receives image/ and pointcloud/
    #[arg(short, long)]
    output: PathBuf,

    #[arg(long, default_value = "jpg")]
    image_extension: String,

    #[arg(long, default_value = "pcd")]
    point_cloud_extension: String
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let images = discover_frames(&cli.images, &cli.image_extension)?;
    let clouds = discover_frames(&cli.clouds, &cli.point_cloud_extension)?;
    info!("{} images, {} point clouds", images.len(), clouds.len());

    let pairs = pair_frames(&images, &clouds);
    let exported = export_pairs(&pairs, &cli.output)?;
    info!("exported {} pairs to {}", exported.len(), cli.output.display());
    Ok(())
}
