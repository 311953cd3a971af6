use crate::Float;
use crate::projection::ProjectedPoint;

pub mod color_map;
pub mod overlay;
pub mod plot;

/// Scalar of a projected point that drives its color.
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum Channel {
    Depth,
    Reflectance
}

impl Channel {
    pub fn value(&self, point: &ProjectedPoint) -> Float {
        match self {
            Channel::Depth => point.depth,
            Channel::Reflectance => point.reflectance
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Channel::Depth => "depth",
            Channel::Reflectance => "reflectance"
        }
    }
}
