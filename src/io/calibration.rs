extern crate nalgebra as na;

use std::fs;
use std::path::{Path,PathBuf};
use std::collections::BTreeMap;
use na::{DMatrix,Matrix3,Matrix4};
use serde::{Serialize,Deserialize};
use thiserror::Error;
use tracing::info;

use crate::Float;
use crate::sensors::camera::{Camera,pinhole::Pinhole};
use crate::extrinsics::{SourceExtrinsic,CanonicalExtrinsic,rotation_of,frame_converter::AxisConvention};

pub const CAMERA_MAT: &str = "CameraMat";
pub const CAMERA_EXTRINSIC_MAT: &str = "CameraExtrinsicMat";
/// Element type tag for f64 blocks.
pub const DOUBLE_TYPE_TAG: &str = "d";

const FILE_STORAGE_DIRECTIVE: &str = "%YAML";
const FILE_STORAGE_HEADER: &str = "%YAML:1.0\n";
const MATRIX_TAG: &str = "!!opencv-matrix";

#[derive(Debug,Error)]
pub enum CalibrationError {
    #[error("failed to access calibration file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error
    },
    #[error("calibration document is not valid yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("calibration block {0} is missing")]
    MissingBlock(String),
    #[error("calibration block {block} holds {found} elements, expected {expected}")]
    ElementCount { block: String, expected: usize, found: usize },
    #[error("calibration block {block} declares {rows}x{cols} but holds {found} elements")]
    NotRectangular { block: String, rows: usize, cols: usize, found: usize },
    #[error("calibration block {block} is {rows}x{cols}, expected {expected_rows}x{expected_cols}")]
    UnexpectedShape { block: String, rows: usize, cols: usize, expected_rows: usize, expected_cols: usize }
}

/// Which part of the working extrinsic `save_calibration` persists.
#[derive(Debug,Copy,Clone,PartialEq,Eq,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveMode {
    /// Only the 3x3 rotation block, translation is assumed stable.
    RotationOnly,
    /// The full 4x4 extrinsic plus the camera matrix, loadable as a calibration.
    FullExtrinsic
}

impl Default for SaveMode {
    fn default() -> SaveMode {
        SaveMode::RotationOnly
    }
}

/// A row major matrix block with explicit dimensions.
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct MatrixBlock {
    pub rows: usize,
    pub cols: usize,
    #[serde(default = "default_type_tag")]
    pub dt: String,
    pub data: Vec<Float>
}

fn default_type_tag() -> String {
    DOUBLE_TYPE_TAG.to_string()
}

impl MatrixBlock {
    pub fn from_matrix(matrix: &DMatrix<Float>) -> MatrixBlock {
        // column major storage of the transpose is the row major order of the matrix
        let data = matrix.transpose().as_slice().to_vec();
        MatrixBlock{rows: matrix.nrows(), cols: matrix.ncols(), dt: default_type_tag(), data}
    }

    pub fn to_matrix(&self, block: &str, expected: Option<(usize,usize)>) -> Result<DMatrix<Float>, CalibrationError> {
        if let Some((expected_rows, expected_cols)) = expected {
            if self.data.len() != expected_rows*expected_cols {
                return Err(CalibrationError::ElementCount{block: block.to_string(), expected: expected_rows*expected_cols, found: self.data.len()});
            }
            if (self.rows, self.cols) != (expected_rows, expected_cols) {
                return Err(CalibrationError::UnexpectedShape{block: block.to_string(), rows: self.rows, cols: self.cols, expected_rows, expected_cols});
            }
        }

        if self.rows*self.cols != self.data.len() {
            return Err(CalibrationError::NotRectangular{block: block.to_string(), rows: self.rows, cols: self.cols, found: self.data.len()});
        }

        Ok(DMatrix::<Float>::from_row_slice(self.rows, self.cols, &self.data))
    }
}

#[derive(Debug,Clone,Default,Deserialize)]
struct CalibrationDocument {
    #[serde(rename = "CameraExtrinsicMat")]
    camera_extrinsic_mat: Option<MatrixBlock>,
    #[serde(rename = "CameraMat")]
    camera_mat: Option<MatrixBlock>,
    #[serde(rename = "DistCoeff")]
    dist_coeff: Option<MatrixBlock>,
    #[serde(rename = "ImageSize")]
    image_size: Option<Vec<u32>>,
    #[serde(rename = "ReprojectionError")]
    reprojection_error: Option<Float>,
    #[serde(rename = "DistModel")]
    dist_model: Option<String>
}

#[derive(Debug,Clone,Serialize)]
struct SavedCalibration {
    #[serde(rename = "CameraExtrinsicMat")]
    camera_extrinsic_mat: MatrixBlock,
    #[serde(rename = "CameraMat", skip_serializing_if = "Option::is_none")]
    camera_mat: Option<MatrixBlock>,
    #[serde(rename = "ImageSize", skip_serializing_if = "Option::is_none")]
    image_size: Option<[u32;2]>
}

/// Everything read from a lidar camera calibration document.
#[derive(Debug,Clone,PartialEq)]
pub struct Calibration {
    pub intrinsic: Pinhole,
    pub extrinsic: SourceExtrinsic,
    pub image_size: Option<(u32,u32)>,
    pub distortion: Option<Vec<Float>>,
    pub distortion_model: Option<String>,
    pub reprojection_error: Option<Float>
}

pub fn load_calibration(path: &Path) -> Result<Calibration, CalibrationError> {
    let contents = read(path)?;
    let calibration = parse_calibration(&contents)?;
    info!("loaded calibration from {}", path.display());
    Ok(calibration)
}

pub fn parse_calibration(contents: &str) -> Result<Calibration, CalibrationError> {
    let document: CalibrationDocument = serde_yaml::from_str(&strip_file_storage_markup(contents))?;

    let camera_mat = document.camera_mat.ok_or_else(|| CalibrationError::MissingBlock(CAMERA_MAT.to_string()))?;
    let extrinsic_mat = document.camera_extrinsic_mat.ok_or_else(|| CalibrationError::MissingBlock(CAMERA_EXTRINSIC_MAT.to_string()))?;

    let camera_matrix = camera_mat.to_matrix(CAMERA_MAT, Some((3,3)))?.fixed_view::<3,3>(0,0).into_owned();
    let extrinsic_matrix = extrinsic_mat.to_matrix(CAMERA_EXTRINSIC_MAT, Some((4,4)))?.fixed_view::<4,4>(0,0).into_owned();

    let image_size = match document.image_size.as_deref() {
        Some([width, height]) => Some((*width, *height)),
        _ => None
    };

    Ok(Calibration {
        intrinsic: Pinhole::from_camera_matrix(&camera_matrix),
        extrinsic: SourceExtrinsic::new(extrinsic_matrix),
        image_size,
        distortion: document.dist_coeff.map(|block| block.data),
        distortion_model: document.dist_model,
        reprojection_error: document.reprojection_error
    })
}

/// Reads the block `name` of any shape.
pub fn load_matrix(name: &str, path: &Path) -> Result<DMatrix<Float>, CalibrationError> {
    let contents = read(path)?;
    let mut blocks: BTreeMap<String, serde_yaml::Value> = serde_yaml::from_str(&strip_file_storage_markup(&contents))?;
    let value = blocks.remove(name).ok_or_else(|| CalibrationError::MissingBlock(name.to_string()))?;
    let block: MatrixBlock = serde_yaml::from_value(value)?;
    block.to_matrix(name, None)
}

/// Writes `matrix` as the single block `name`.
pub fn save_matrix(name: &str, matrix: &DMatrix<Float>, path: &Path) -> Result<(), CalibrationError> {
    let mut blocks = BTreeMap::<&str, MatrixBlock>::new();
    blocks.insert(name, MatrixBlock::from_matrix(matrix));
    write_document(&blocks, &[name], path)
}

/**
 * Persists the working extrinsic in the source convention, so that a full
 * save reloads into the same canonical extrinsic.
 */
pub fn save_calibration(intrinsic: &Pinhole, extrinsic: &CanonicalExtrinsic, convention: AxisConvention, mode: SaveMode, image_size: Option<(u32,u32)>, path: &Path) -> Result<(), CalibrationError> {
    let source = extrinsic.to_source(convention);
    let document = match mode {
        SaveMode::RotationOnly => {
            let rotation = rotation_of(source.matrix());
            SavedCalibration {
                camera_extrinsic_mat: block_from_fixed(&rotation),
                camera_mat: None,
                image_size: None
            }
        },
        SaveMode::FullExtrinsic => SavedCalibration {
            camera_extrinsic_mat: block_from_fixed(source.matrix()),
            camera_mat: Some(block_from_fixed(&intrinsic.get_camera_matrix())),
            image_size: image_size.map(|(w,h)| [w,h])
        }
    };

    write_document(&document, &[CAMERA_EXTRINSIC_MAT, CAMERA_MAT], path)?;
    info!("saved calibration ({:?}) to {}", mode, path.display());
    Ok(())
}

fn block_from_fixed<const R: usize, const C: usize>(matrix: &na::SMatrix<Float,R,C>) -> MatrixBlock {
    let data = (0..R).flat_map(|r| (0..C).map(move |c| (r,c))).map(|idx| matrix[idx]).collect::<Vec<Float>>();
    MatrixBlock{rows: R, cols: C, dt: default_type_tag(), data}
}

fn read(path: &Path) -> Result<String, CalibrationError> {
    fs::read_to_string(path).map_err(|source| CalibrationError::Io{path: path.to_path_buf(), source})
}

/// Drops the FileStorage directive and matrix tags, which are not plain yaml.
fn strip_file_storage_markup(contents: &str) -> String {
    contents.lines()
        .filter(|line| !line.trim_start().starts_with(FILE_STORAGE_DIRECTIVE))
        .map(|line| line.replace(MATRIX_TAG, ""))
        .collect::<Vec<String>>()
        .join("\n")
}

/// Serializes `document` and tags the top level `blocks` as FileStorage matrices.
fn write_document<T: Serialize>(document: &T, blocks: &[&str], path: &Path) -> Result<(), CalibrationError> {
    let body = serde_yaml::to_string(document)?;
    let tagged = body.lines()
        .map(|line| match blocks.iter().find(|b| line == format!("{}:", b)) {
            Some(block) => format!("{}: {}", block, MATRIX_TAG),
            None => line.to_string()
        })
        .collect::<Vec<String>>()
        .join("\n");

    let contents = format!("{}---\n{}\n", FILE_STORAGE_HEADER, tagged);
    fs::write(path, contents).map_err(|source| CalibrationError::Io{path: path.to_path_buf(), source})
}

impl Calibration {
    pub fn camera_matrix(&self) -> Matrix3<Float> {
        self.intrinsic.get_camera_matrix()
    }

    pub fn extrinsic_matrix(&self) -> &Matrix4<Float> {
        self.extrinsic.matrix()
    }
}
