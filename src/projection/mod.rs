extern crate nalgebra as na;

use tracing::debug;
use crate::Float;
use crate::point_cloud::PointCloud;
use crate::sensors::camera::Camera;
use crate::extrinsics::CanonicalExtrinsic;

/// A visible point in pixel space. `depth` is the image z before the divide.
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct ProjectedPoint {
    pub u: Float,
    pub v: Float,
    pub depth: Float,
    pub reflectance: Float
}

/// Image bounds used by the optional canvas filter, inclusive on both ends.
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct Canvas {
    pub width: Float,
    pub height: Float
}

impl Canvas {
    pub fn new(width: Float, height: Float) -> Canvas {
        Canvas{width,height}
    }

    pub fn from_image_size(width: u32, height: u32) -> Canvas {
        Canvas::new(width as Float, height as Float)
    }

    pub fn contains(&self, u: Float, v: Float) -> bool {
        u >= 0.0 && u <= self.width && v >= 0.0 && v <= self.height
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq,Default)]
pub struct ProjectionReport {
    pub input: usize,
    pub behind_camera: usize,
    pub degenerate: usize,
    pub off_canvas: usize,
    pub visible: usize
}

#[derive(Debug,Clone,PartialEq)]
pub struct Projection {
    pub points: Vec<ProjectedPoint>,
    pub report: ProjectionReport
}

/**
 * Projects `cloud` through intrinsic*extrinsic.
 *
 * Points with a negative depth are behind the camera. A depth of exactly zero
 * (or a non finite one) has no perspective divide and is dropped as
 * degenerate. Survivors keep their relative order and stay paired with their
 * reflectance. With a `canvas` the result is further restricted to pixels
 * inside [0,width]x[0,height].
 */
pub fn project<C: Camera>(camera: &C, extrinsic: &CanonicalExtrinsic, cloud: &PointCloud, canvas: Option<&Canvas>) -> Projection {
    let lidar = cloud.to_homogeneous();
    let cam = camera.get_projection()*(extrinsic.matrix()*lidar);

    let mut report = ProjectionReport{input: cloud.len(), ..Default::default()};
    let mut points = Vec::<ProjectedPoint>::with_capacity(cloud.len());

    for (column, point) in cam.column_iter().zip(cloud.points()) {
        let depth = column[2];
        match depth {
            d if d < 0.0 => report.behind_camera += 1,
            d if d > 0.0 && d.is_finite() => {
                let projected = ProjectedPoint{u: column[0]/d, v: column[1]/d, depth: d, reflectance: point.intensity};
                match canvas {
                    Some(c) if !c.contains(projected.u, projected.v) => report.off_canvas += 1,
                    _ => points.push(projected)
                }
            },
            _ => report.degenerate += 1
        }
    }

    report.visible = points.len();
    debug!("projected {:?}", report);
    Projection{points,report}
}

/// Keeps the points inside `canvas`. Applying it twice changes nothing.
pub fn filter_to_canvas(points: &[ProjectedPoint], canvas: &Canvas) -> Vec<ProjectedPoint> {
    points.iter().filter(|p| canvas.contains(p.u, p.v)).copied().collect()
}
