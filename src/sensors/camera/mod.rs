extern crate nalgebra as na;

use na::{U1,U4,Vector,Matrix3,Matrix3x4, base::storage::Storage};
use crate::Float;

pub mod pinhole;

/**
 * Maps homogeneous camera frame coordinates to homogeneous image coordinates.
 * The third image component is the depth used for visibility decisions.
 */
pub trait Camera {
    fn get_projection(&self) -> Matrix3x4<Float>;
    fn get_camera_matrix(&self) -> Matrix3<Float>;

    /// Pixel coordinates and depth, `None` for points on or behind the image plane.
    fn project<T>(&self, position: &Vector<Float,U4,T>) -> Option<(Float,Float,Float)> where T: Storage<Float,U4,U1> {
        let image = self.get_projection()*position;
        let depth = image[2];
        match depth {
            d if d > 0.0 => Some((image[0]/d, image[1]/d, d)),
            _ => None
        }
    }
}
