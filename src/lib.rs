extern crate nalgebra as na;

pub mod point_cloud;
pub mod io;
pub mod sensors;
pub mod extrinsics;
pub mod projection;
pub mod visualize;
pub mod session;
pub mod batch;

pub use self::io::runtime_conf::{load_runtime_conf, resolve_runtime_conf, RuntimeConf};

macro_rules! define_float {
    ($f:tt) => {
        pub use std::$f as float;
        pub type Float = $f;
    }
}

define_float!(f64);

/// Raw intensity values are stored as 8 bit integers by the sensor driver.
pub const MAX_RAW_INTENSITY: Float = 255.0;
