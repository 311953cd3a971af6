extern crate nalgebra as na;

use na::{Matrix3,Matrix4,Vector3};
use crate::Float;

pub mod frame_converter;
pub mod composer;

/// Extrinsic exactly as stored by the calibration source.
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct SourceExtrinsic(Matrix4<Float>);

/**
 * Sensor to camera extrinsic in the convention the projection expects.
 * Only obtainable by converting a `SourceExtrinsic` or by composing
 * adjustments onto another canonical extrinsic.
 */
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct CanonicalExtrinsic(Matrix4<Float>);

impl SourceExtrinsic {
    pub fn new(matrix: Matrix4<Float>) -> SourceExtrinsic {
        SourceExtrinsic(matrix)
    }

    pub fn matrix(&self) -> &Matrix4<Float> {
        &self.0
    }
}

impl CanonicalExtrinsic {
    pub(crate) fn from_matrix(matrix: Matrix4<Float>) -> CanonicalExtrinsic {
        CanonicalExtrinsic(matrix)
    }

    pub fn matrix(&self) -> &Matrix4<Float> {
        &self.0
    }

    pub fn rotation(&self) -> Matrix3<Float> {
        rotation_of(&self.0)
    }

    pub fn translation(&self) -> Vector3<Float> {
        translation_of(&self.0)
    }
}

pub fn rotation_of(matrix: &Matrix4<Float>) -> Matrix3<Float> {
    matrix.fixed_view::<3,3>(0,0).into_owned()
}

pub fn translation_of(matrix: &Matrix4<Float>) -> Vector3<Float> {
    matrix.fixed_view::<3,1>(0,3).into_owned()
}

pub fn from_rotation_translation(rotation: &Matrix3<Float>, translation: &Vector3<Float>) -> Matrix4<Float> {
    let mut matrix = Matrix4::<Float>::identity();
    matrix.fixed_view_mut::<3,3>(0,0).copy_from(rotation);
    matrix.fixed_view_mut::<3,1>(0,3).copy_from(translation);
    matrix
}
