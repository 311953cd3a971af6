use std::fs;
use std::path::{Path,PathBuf};
use serde::{Serialize,Deserialize};
use thiserror::Error;

use crate::Float;
use crate::io::calibration::SaveMode;
use crate::extrinsics::frame_converter::AxisConvention;

#[derive(Debug,Error)]
pub enum ConfigError {
    #[error("failed to read runtime configuration {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error
    },
    #[error("runtime configuration is not valid yaml: {0}")]
    Yaml(#[from] serde_yaml::Error)
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct RuntimeConf {
    /// Holds the `image` and `pointcloud` directories.
    pub data_path: PathBuf,
    pub output_path: PathBuf,
    pub calibration_path: PathBuf,
    pub image_extension: String,
    pub point_cloud_extension: String,
    pub axis_convention: AxisConvention,
    pub save_mode: SaveMode,
    pub canvas_filter: bool,
    pub point_radius: u32,
    pub overlay_alpha: Float,
    pub rotation_step: Float,
    pub translation_step: Float
}

impl Default for RuntimeConf {
    fn default() -> RuntimeConf {
        RuntimeConf {
            data_path: PathBuf::from("correspond_data"),
            output_path: PathBuf::from("output"),
            calibration_path: PathBuf::from("calibration.yaml"),
            image_extension: "jpg".to_string(),
            point_cloud_extension: "pcd".to_string(),
            axis_convention: AxisConvention::default(),
            save_mode: SaveMode::default(),
            canvas_filter: true,
            point_radius: 2,
            overlay_alpha: 0.5,
            rotation_step: 0.05,
            translation_step: 0.05
        }
    }
}

pub fn load_runtime_conf(path: &Path) -> Result<RuntimeConf, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io{path: path.to_path_buf(), source})?;
    parse_runtime_conf(&contents)
}

pub fn parse_runtime_conf(contents: &str) -> Result<RuntimeConf, ConfigError> {
    Ok(serde_yaml::from_str(contents)?)
}

/// The configuration at `path`, or the defaults when no file is given.
pub fn resolve_runtime_conf(path: Option<&Path>) -> Result<RuntimeConf, ConfigError> {
    match path {
        Some(p) => load_runtime_conf(p),
        None => Ok(RuntimeConf::default())
    }
}
