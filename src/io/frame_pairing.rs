use std::fs;
use std::path::{Path,PathBuf};
use thiserror::Error;
use tracing::{debug,info};

use crate::Float;
use crate::io::closest_ts_index;

pub const IMAGE_DIR: &str = "image";
pub const POINT_CLOUD_DIR: &str = "pointcloud";

/// Digits kept after the decimal point when seconds are turned into microseconds.
const MICROSECOND_DIGITS: usize = 6;

#[derive(Debug,Error)]
pub enum PairingError {
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error
    },
    #[error("no timestamped *.{extension} files in {dir:?}")]
    NoFrames { dir: PathBuf, extension: String }
}

#[derive(Debug,Clone,PartialEq)]
pub struct StampedFile {
    pub timestamp: Float,
    pub path: PathBuf
}

/// A point cloud and the image recorded closest to it.
#[derive(Debug,Clone,PartialEq)]
pub struct FramePair {
    pub image: PathBuf,
    pub point_cloud: PathBuf
}

impl FramePair {
    pub fn stem(&self) -> String {
        self.point_cloud.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
    }
}

/// Point cloud / image pairs in point cloud timestamp order.
#[derive(Debug,Clone,PartialEq,Default)]
pub struct FrameSet {
    pairs: Vec<FramePair>
}

impl FrameSet {
    pub fn new(pairs: Vec<FramePair>) -> FrameSet {
        FrameSet{pairs}
    }

    /// Pairs `data_path/image` with `data_path/pointcloud`.
    pub fn from_dirs(data_path: &Path, image_extension: &str, point_cloud_extension: &str) -> Result<FrameSet, PairingError> {
        let images = discover_frames(&data_path.join(IMAGE_DIR), image_extension)?;
        let clouds = discover_frames(&data_path.join(POINT_CLOUD_DIR), point_cloud_extension)?;
        Ok(FrameSet::new(pair_frames(&images, &clouds)))
    }

    pub fn pairs(&self) -> &[FramePair] {
        &self.pairs
    }

    pub fn get(&self, index: usize) -> Option<&FramePair> {
        self.pairs.get(index)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/**
 * Integer microsecond stem. Stems written as fractional seconds
 * (`1702895061.262535`) are converted textually, digits past the sixth
 * decimal are truncated. Stems that are not timestamps give `None`.
 */
pub fn normalized_stem(stem: &str) -> Option<String> {
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    match stem.split_once('.') {
        None if !stem.is_empty() && all_digits(stem) => Some(stem.to_string()),
        Some((seconds, fraction)) if !seconds.is_empty() && all_digits(seconds) && all_digits(fraction) => {
            let mut micros = fraction.chars().take(MICROSECOND_DIGITS).collect::<String>();
            while micros.len() < MICROSECOND_DIGITS {
                micros.push('0');
            }
            Some(format!("{}{}", seconds, micros))
        },
        _ => None
    }
}

pub fn timestamp_of(path: &Path) -> Option<Float> {
    let stem = path.file_stem()?.to_str()?;
    normalized_stem(stem)?.parse::<Float>().ok()
}

/// Timestamped files in `dir` with `extension`, sorted by timestamp.
pub fn discover_frames(dir: &Path, extension: &str) -> Result<Vec<StampedFile>, PairingError> {
    let io_error = |source| PairingError::Io{path: dir.to_path_buf(), source};
    let mut files = Vec::<StampedFile>::new();

    for entry_result in fs::read_dir(dir).map_err(io_error)? {
        let path = entry_result.map_err(io_error)?.path();
        let matches_extension = path.extension().map_or(false, |e| e.to_string_lossy().eq_ignore_ascii_case(extension));
        if !path.is_file() || !matches_extension {
            continue;
        }
        match timestamp_of(&path) {
            Some(timestamp) => files.push(StampedFile{timestamp, path}),
            None => debug!("skipping {}, stem is not a timestamp", path.display())
        }
    }

    if files.is_empty() {
        return Err(PairingError::NoFrames{dir: dir.to_path_buf(), extension: extension.to_string()});
    }

    files.sort_by(|a,b| a.timestamp.total_cmp(&b.timestamp));
    Ok(files)
}

/// For every point cloud the image with the closest timestamp. Both inputs sorted.
pub fn pair_frames(images: &[StampedFile], clouds: &[StampedFile]) -> Vec<FramePair> {
    let image_timestamps = images.iter().map(|i| i.timestamp).collect::<Vec<Float>>();
    clouds.iter().filter_map(|cloud| {
        closest_ts_index(cloud.timestamp, &image_timestamps).map(|idx| FramePair {
            image: images[idx].path.clone(),
            point_cloud: cloud.path.clone()
        })
    }).collect()
}

/**
 * Copies every pair into `dst/image` and `dst/pointcloud`. Images are renamed
 * to their microsecond stem. Returns the pairs pointing at the copies.
 */
pub fn export_pairs(pairs: &[FramePair], dst: &Path) -> Result<Vec<FramePair>, PairingError> {
    let image_dir = dst.join(IMAGE_DIR);
    let cloud_dir = dst.join(POINT_CLOUD_DIR);
    for dir in &[&image_dir, &cloud_dir] {
        fs::create_dir_all(dir).map_err(|source| PairingError::Io{path: dir.to_path_buf(), source})?;
    }

    pairs.iter().map(|pair| {
        let image_name = match (pair.image.file_stem().and_then(|s| s.to_str()).and_then(normalized_stem), pair.image.extension()) {
            (Some(stem), Some(ext)) => format!("{}.{}", stem, ext.to_string_lossy()),
            _ => pair.image.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
        };
        let cloud_name = pair.point_cloud.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

        let exported = FramePair{image: image_dir.join(image_name), point_cloud: cloud_dir.join(cloud_name)};
        copy(&pair.image, &exported.image)?;
        copy(&pair.point_cloud, &exported.point_cloud)?;
        Ok(exported)
    }).collect()
}

fn copy(from: &Path, to: &Path) -> Result<(), PairingError> {
    fs::copy(from, to).map_err(|source| PairingError::Io{path: from.to_path_buf(), source})?;
    info!("Copied {} to {}", from.display(), to.display());
    Ok(())
}
