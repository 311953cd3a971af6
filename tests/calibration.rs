extern crate nalgebra as na;

use std::fs;
use tempfile::tempdir;
use approx::assert_relative_eq;
use na::{DMatrix,Matrix3,Vector3};

use lidarcam::Float;
use lidarcam::sensors::camera::Camera;
use lidarcam::extrinsics::frame_converter::AxisConvention;
use lidarcam::io::calibration::{parse_calibration,load_calibration,load_matrix,save_matrix,save_calibration,CalibrationError,SaveMode,CAMERA_EXTRINSIC_MAT};

const AUTOWARE_CALIBRATION: &str = "%YAML:1.0
---
CameraExtrinsicMat: !!opencv-matrix
   rows: 4
   cols: 4
   dt: d
   data: [ 0., -1., 0., 0.5, 0., 0., -1., 0.2, 1., 0., 0., 0.1, 0., 0., 0., 1. ]
CameraMat: !!opencv-matrix
   rows: 3
   cols: 3
   dt: d
   data: [ 500., 0., 320., 0., 510., 240., 0., 0., 1. ]
DistCoeff: !!opencv-matrix
   rows: 1
   cols: 5
   dt: d
   data: [ -0.1, 0.01, 0., 0., 0. ]
ImageSize: [ 640, 480 ]
ReprojectionError: 0.25
DistModel: plumb_bob
";

#[test]
fn parse_file_storage_document() {
    let calibration = parse_calibration(AUTOWARE_CALIBRATION).unwrap();

    assert_eq!(calibration.intrinsic.get_fx(), 500.0);
    assert_eq!(calibration.intrinsic.get_fy(), 510.0);
    assert_eq!(calibration.intrinsic.get_cx(), 320.0);
    assert_eq!(calibration.intrinsic.get_cy(), 240.0);
    assert_eq!(calibration.extrinsic_matrix()[(0,3)], 0.5);
    assert_eq!(calibration.extrinsic_matrix()[(2,0)], 1.0);
    assert_eq!(calibration.image_size, Some((640,480)));
    assert_eq!(calibration.distortion.as_ref().map(|d| d.len()), Some(5));
    assert_eq!(calibration.distortion_model.as_deref(), Some("plumb_bob"));
    assert_eq!(calibration.reprojection_error, Some(0.25));
}

#[test]
fn optional_blocks_may_be_absent() {
    let contents = "CameraExtrinsicMat:
  rows: 4
  cols: 4
  data: [1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1]
CameraMat:
  rows: 3
  cols: 3
  data: [100, 0, 50, 0, 100, 40, 0, 0, 1]
";
    let calibration = parse_calibration(contents).unwrap();
    assert_eq!(calibration.image_size, None);
    assert_eq!(calibration.distortion, None);
    assert_eq!(calibration.camera_matrix()[(0,2)], 50.0);
}

#[test]
fn missing_camera_matrix() {
    let contents = "CameraExtrinsicMat:
  rows: 4
  cols: 4
  data: [1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1]
";
    match parse_calibration(contents) {
        Err(CalibrationError::MissingBlock(block)) => assert_eq!(block, "CameraMat"),
        other => panic!("expected missing block, got {:?}", other)
    }
}

#[test]
fn wrong_element_count() {
    let contents = "CameraExtrinsicMat:
  rows: 4
  cols: 4
  data: [1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 0, 0]
CameraMat:
  rows: 3
  cols: 3
  data: [100, 0, 50, 0, 100, 40, 0, 0, 1]
";
    let result = parse_calibration(contents);
    assert!(matches!(result, Err(CalibrationError::ElementCount{expected: 16, found: 15, ..})));
}

#[test]
fn wrong_declared_shape() {
    let contents = "CameraExtrinsicMat:
  rows: 2
  cols: 8
  data: [1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1]
CameraMat:
  rows: 3
  cols: 3
  data: [100, 0, 50, 0, 100, 40, 0, 0, 1]
";
    let result = parse_calibration(contents);
    assert!(matches!(result, Err(CalibrationError::UnexpectedShape{rows: 2, cols: 8, expected_rows: 4, expected_cols: 4, ..})));
}

#[test]
fn not_yaml() {
    let result = parse_calibration("CameraMat: [unclosed");
    assert!(matches!(result, Err(CalibrationError::Yaml(_))));
}

#[test]
fn matrix_block_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("matrix.yaml");
    let matrix = DMatrix::<Float>::from_row_slice(2, 3, &[1.0, -2.5, 3.0, 0.125, 5.0, 6.75]);

    save_matrix("Homography", &matrix, &path).unwrap();
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("%YAML:1.0"));
    assert!(written.contains("Homography: !!opencv-matrix"));

    let loaded = load_matrix("Homography", &path).unwrap();
    assert_eq!(loaded, matrix);

    let missing = load_matrix("Other", &path);
    assert!(matches!(missing, Err(CalibrationError::MissingBlock(_))));
}

#[test]
fn full_save_reloads_to_same_canonical_extrinsic() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("refined.yaml");
    let calibration = parse_calibration(AUTOWARE_CALIBRATION).unwrap();
    let canonical = calibration.extrinsic.into_canonical(AxisConvention::Autoware);

    save_calibration(&calibration.intrinsic, &canonical, AxisConvention::Autoware, SaveMode::FullExtrinsic, calibration.image_size, &path).unwrap();
    let reloaded = load_calibration(&path).unwrap();

    assert_eq!(reloaded.image_size, Some((640,480)));
    assert_eq!(reloaded.intrinsic.get_camera_matrix(), calibration.intrinsic.get_camera_matrix());
    assert_relative_eq!(*reloaded.extrinsic_matrix(), *calibration.extrinsic_matrix(), epsilon = 1e-12);

    let reloaded_canonical = reloaded.extrinsic.into_canonical(AxisConvention::Autoware);
    assert_relative_eq!(*reloaded_canonical.matrix(), *canonical.matrix(), epsilon = 1e-12);
}

#[test]
fn rotation_only_save_writes_source_rotation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rotation.yaml");
    let calibration = parse_calibration(AUTOWARE_CALIBRATION).unwrap();
    let source_rotation = calibration.extrinsic_matrix().fixed_view::<3,3>(0,0).into_owned();
    let canonical = calibration.extrinsic.into_canonical(AxisConvention::Autoware);

    save_calibration(&calibration.intrinsic, &canonical, AxisConvention::Autoware, SaveMode::RotationOnly, None, &path).unwrap();

    let saved = load_matrix(CAMERA_EXTRINSIC_MAT, &path).unwrap();
    assert_eq!((saved.nrows(), saved.ncols()), (3,3));
    let saved = Matrix3::<Float>::from_iterator(saved.iter().cloned());
    assert_relative_eq!(saved, source_rotation, epsilon = 1e-12);

    // a rotation only file is not a loadable calibration
    assert!(matches!(load_calibration(&path), Err(CalibrationError::MissingBlock(_))));
}

#[test]
fn canonical_translation_of_autoware_document() {
    let calibration = parse_calibration(AUTOWARE_CALIBRATION).unwrap();
    let canonical = calibration.extrinsic.into_canonical(AxisConvention::Autoware);
    assert_relative_eq!(canonical.translation(), Vector3::<Float>::new(0.2, 0.1, -0.5));
}
