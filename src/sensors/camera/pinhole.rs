extern crate nalgebra as na;

use na::{Matrix3,Matrix3x4};
use crate::Float;
use crate::sensors::camera::Camera;

/// Intrinsic matrix, the 3x3 camera matrix with a zero column appended.
#[derive(Debug,Copy,Clone,PartialEq)]
pub struct Pinhole {
    pub projection: Matrix3x4<Float>
}

impl Pinhole {
    pub fn new(fx: Float, fy: Float, cx: Float, cy: Float) -> Pinhole {
        let camera_matrix = Matrix3::<Float>::new(fx, 0.0, cx,
                                                  0.0, fy, cy,
                                                  0.0, 0.0, 1.0);
        Pinhole::from_camera_matrix(&camera_matrix)
    }

    pub fn from_camera_matrix(mat: &Matrix3<Float>) -> Pinhole {
        let mut projection = Matrix3x4::<Float>::zeros();
        projection.fixed_view_mut::<3,3>(0,0).copy_from(mat);
        Pinhole{projection}
    }

    pub fn from_projection(projection: Matrix3x4<Float>) -> Pinhole {
        Pinhole{projection}
    }

    pub fn get_fx(&self) -> Float {
        self.projection[(0,0)]
    }

    pub fn get_fy(&self) -> Float {
        self.projection[(1,1)]
    }

    pub fn get_cx(&self) -> Float {
        self.projection[(0,2)]
    }

    pub fn get_cy(&self) -> Float {
        self.projection[(1,2)]
    }
}

impl Camera for Pinhole {
    fn get_projection(&self) -> Matrix3x4<Float> {
        self.projection
    }

    fn get_camera_matrix(&self) -> Matrix3<Float> {
        self.projection.fixed_view::<3,3>(0,0).into_owned()
    }
}
