use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool,Ordering};
use clap::Parser;
use color_eyre::eyre::{eyre,Result,WrapErr};
use tracing::{info,warn};

use lidarcam::resolve_runtime_conf;
use lidarcam::batch::{run,BatchOptions};
use lidarcam::io::{calibration::load_calibration,frame_pairing::FrameSet};

/// Reproject every paired frame with a fixed calibration and write colored overlays.
#[derive(Parser)]
#[command(name = "project_frames")]
#[command(version)]
struct Cli {
    /// Runtime configuration (yaml)
    #[arg(short, long)]
    conf: Option<PathBuf>,

    /// Directory holding image/ and pointcloud/
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Calibration file
    #[arg(long)]
    calibration: Option<PathBuf>,

    /// Output directory for the overlays
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep points that fall outside the image
    #[arg(long)]
    no_canvas_filter: bool,

    /// Also write a scatter chart per frame and channel
    #[arg(long)]
    plots: bool
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
    let mut conf = resolve_runtime_conf(cli.conf.as_deref())?;
    if let Some(data) = cli.data { conf.data_path = data; }
    if let Some(calibration) = cli.calibration { conf.calibration_path = calibration; }
    if let Some(output) = cli.output { conf.output_path = output; }
    if cli.no_canvas_filter { conf.canvas_filter = false; }

    let frames = FrameSet::from_dirs(&conf.data_path, &conf.image_extension, &conf.point_cloud_extension)?;
    info!("{} frames paired in {}", frames.len(), conf.data_path.display());

    let calibration = load_calibration(&conf.calibration_path)
        .wrap_err_with(|| format!("failed to load calibration {}", conf.calibration_path.display()))?;
    let extrinsic = calibration.extrinsic.into_canonical(conf.axis_convention);

    let stop = Arc::new(AtomicBool::new(false));
    let stop_handler = stop.clone();
    ctrlc::set_handler(move || {
        warn!("stop requested, finishing frames in flight");
        stop_handler.store(true, Ordering::Relaxed);
    })?;

    let options = BatchOptions {
        output_path: conf.output_path.clone(),
        canvas_filter: conf.canvas_filter,
        point_radius: conf.point_radius,
        alpha: conf.overlay_alpha,
        write_plots: cli.plots
    };
    let summary = run(&frames, &calibration.intrinsic, &extrinsic, &options, &stop)?;

    let visible = summary.processed.iter().map(|o| o.report.visible).sum::<usize>();
    info!("{} points drawn over {} frames into {}", visible, summary.processed.len(), conf.output_path.display());

    match summary.failed.len() {
        0 => Ok(()),
        n => Err(eyre!("{} of {} frames failed", n, frames.len()))
    }
}
