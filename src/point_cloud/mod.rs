extern crate nalgebra as na;

use na::{Matrix4xX, Vector4};
use crate::Float;

/// A single range return. Intensity is normalized to [0,1].
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct Point {
    pub x: Float,
    pub y: Float,
    pub z: Float,
    pub intensity: Float
}

impl Point {
    pub fn new(x: Float, y: Float, z: Float, intensity: Float) -> Point {
        Point{x,y,z,intensity}
    }

    pub fn to_homogeneous(&self) -> Vector4<Float> {
        Vector4::<Float>::new(self.x,self.y,self.z,1.0)
    }
}

/// Load diagnostics of a point record file.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct LoadReport {
    pub declared: usize,
    pub valid: usize,
    pub dropped: usize
}

impl LoadReport {
    pub fn is_consistent(&self) -> bool {
        self.declared == self.valid + self.dropped
    }
}

/**
 * Points of one frame in file order. Dropouts are already removed,
 * `declared_count` keeps the count announced by the file header.
 */
#[derive(Debug,Clone,PartialEq)]
pub struct PointCloud {
    points: Vec<Point>,
    declared_count: usize
}

impl PointCloud {
    pub fn new(points: Vec<Point>, declared_count: usize) -> PointCloud {
        PointCloud{points,declared_count}
    }

    pub fn from_points(points: Vec<Point>) -> PointCloud {
        let declared_count = points.len();
        PointCloud{points,declared_count}
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn declared_count(&self) -> usize {
        self.declared_count
    }

    /// Homogeneous sensor coordinates, one column per point.
    pub fn to_homogeneous(&self) -> Matrix4xX<Float> {
        Matrix4xX::<Float>::from_fn(self.points.len(), |r,c| {
            let p = &self.points[c];
            match r {
                0 => p.x,
                1 => p.y,
                2 => p.z,
                _ => 1.0
            }
        })
    }

    pub fn reflectance(&self) -> Vec<Float> {
        self.points.iter().map(|p| p.intensity).collect()
    }
}
