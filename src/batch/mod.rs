extern crate image as image_rs;

use std::fs;
use std::path::{Path,PathBuf};
use std::sync::atomic::{AtomicBool,Ordering};
use indicatif::{ProgressBar,ProgressStyle};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{info,warn};

use crate::Float;
use crate::io::{pcd_loader::{load_point_cloud,FormatError},frame_pairing::{FrameSet,FramePair}};
use crate::sensors::camera::Camera;
use crate::extrinsics::CanonicalExtrinsic;
use crate::projection::{project,Canvas,ProjectionReport};
use crate::visualize::{Channel,color_map::{ColorMap,ColorMapper},overlay::draw_projection,plot::draw_projection_scatter};

const CHANNELS: [Channel; 2] = [Channel::Depth, Channel::Reflectance];

#[derive(Debug,Error)]
pub enum BatchError {
    #[error("failed to create output directory {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error
    },
    #[error("frame {stem}: {source}")]
    Format {
        stem: String,
        #[source]
        source: FormatError
    },
    #[error("frame {stem}: {source}")]
    Image {
        stem: String,
        #[source]
        source: image_rs::ImageError
    },
    #[error("frame {stem}: failed to plot projection: {message}")]
    Plot { stem: String, message: String }
}

#[derive(Debug,Clone,PartialEq)]
pub struct BatchOptions {
    pub output_path: PathBuf,
    pub canvas_filter: bool,
    pub point_radius: u32,
    pub alpha: Float,
    pub write_plots: bool
}

#[derive(Debug,Clone,PartialEq)]
pub struct FrameOutcome {
    pub stem: String,
    pub report: ProjectionReport,
    pub outputs: Vec<PathBuf>
}

#[derive(Debug,Default)]
pub struct BatchSummary {
    pub processed: Vec<FrameOutcome>,
    pub failed: Vec<BatchError>,
    /// Frames never started because a stop was requested.
    pub skipped: usize
}

/**
 * Reprojects all frames in parallel and writes a depth and a reflectance
 * overlay per frame. Frames are independent, a failing frame is recorded and
 * the others carry on. Once `stop` is set no further frame is started.
 */
pub fn run<C: Camera + Sync>(frames: &FrameSet, camera: &C, extrinsic: &CanonicalExtrinsic, options: &BatchOptions, stop: &AtomicBool) -> Result<BatchSummary, BatchError> {
    fs::create_dir_all(&options.output_path).map_err(|source| BatchError::Io{path: options.output_path.clone(), source})?;

    let pb = ProgressBar::new(frames.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} frames ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("▉▊▋▌▍▎▏ "),
    );
    pb.set_message("Projecting");

    let results = frames.pairs().par_iter().map(|pair| {
        if stop.load(Ordering::Relaxed) {
            return None;
        }
        let result = process_frame(pair, camera, extrinsic, options);
        pb.inc(1);
        Some(result)
    }).collect::<Vec<Option<Result<FrameOutcome,BatchError>>>>();

    pb.finish_with_message("Frames projected");

    let mut summary = BatchSummary::default();
    for result in results {
        match result {
            Some(Ok(outcome)) => summary.processed.push(outcome),
            Some(Err(e)) => {
                warn!("{}", e);
                summary.failed.push(e);
            },
            None => summary.skipped += 1
        }
    }

    info!("batch finished: {} processed, {} failed, {} skipped", summary.processed.len(), summary.failed.len(), summary.skipped);
    Ok(summary)
}

pub fn process_frame<C: Camera>(pair: &FramePair, camera: &C, extrinsic: &CanonicalExtrinsic, options: &BatchOptions) -> Result<FrameOutcome, BatchError> {
    let stem = pair.stem();
    let (cloud, _) = load_point_cloud(&pair.point_cloud).map_err(|source| BatchError::Format{stem: stem.clone(), source})?;
    let image = image_rs::open(&pair.image).map_err(|source| BatchError::Image{stem: stem.clone(), source})?.to_rgb8();
    let canvas = Canvas::from_image_size(image.width(), image.height());

    let canvas_filter = match options.canvas_filter {
        true => Some(&canvas),
        false => None
    };
    let projection = project(camera, extrinsic, &cloud, canvas_filter);

    let mut outputs = Vec::<PathBuf>::new();
    for &channel in CHANNELS.iter() {
        let mapper = ColorMapper::for_channel(ColorMap::Rainbow, channel, &projection.points);

        let mut overlay = image.clone();
        draw_projection(&mut overlay, &projection.points, channel, &mapper, options.point_radius, options.alpha);
        let overlay_path = output_file(&options.output_path, &stem, channel.name());
        overlay.save(&overlay_path).map_err(|source| BatchError::Image{stem: stem.clone(), source})?;
        outputs.push(overlay_path);

        if options.write_plots {
            let plot_path = output_file(&options.output_path, &stem, &format!("{}_scatter", channel.name()));
            draw_projection_scatter(&projection.points, &canvas, channel, &mapper, &plot_path, (image.width(), image.height()), options.point_radius)
                .map_err(|e| BatchError::Plot{stem: stem.clone(), message: e.to_string()})?;
            outputs.push(plot_path);
        }
    }

    Ok(FrameOutcome{stem, report: projection.report, outputs})
}

fn output_file(dir: &Path, stem: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{}_{}.png", stem, suffix))
}
