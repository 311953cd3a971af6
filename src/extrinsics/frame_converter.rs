extern crate nalgebra as na;

use na::{Matrix4,Vector3};
use serde::{Serialize,Deserialize};
use crate::Float;
use crate::extrinsics::{SourceExtrinsic,CanonicalExtrinsic,rotation_of,translation_of};

/// How the calibration source stores its lidar to camera extrinsic.
#[derive(Debug,Copy,Clone,PartialEq,Eq,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisConvention {
    /// Rotation stored transposed, translation stored as (x,y,z) of the camera axes.
    Autoware,
    /// Already a sensor to camera transform.
    Canonical
}

impl Default for AxisConvention {
    fn default() -> AxisConvention {
        AxisConvention::Autoware
    }
}

impl SourceExtrinsic {
    /**
     * Consumes the stored extrinsic. The result has no path back into the
     * converter, so a calibration can only ever be converted once.
     */
    pub fn into_canonical(self, convention: AxisConvention) -> CanonicalExtrinsic {
        CanonicalExtrinsic::from_matrix(to_canonical(self.matrix(), convention))
    }
}

impl CanonicalExtrinsic {
    /// Inverse of `SourceExtrinsic::into_canonical`, used for persisting.
    pub fn to_source(&self, convention: AxisConvention) -> SourceExtrinsic {
        SourceExtrinsic::new(to_source(self.matrix(), convention))
    }
}

/// Transposes the rotation block and maps translation (x,y,z) to (y,z,-x).
fn to_canonical(source: &Matrix4<Float>, convention: AxisConvention) -> Matrix4<Float> {
    match convention {
        AxisConvention::Canonical => *source,
        AxisConvention::Autoware => {
            let rotation = rotation_of(source).transpose();
            let t = translation_of(source);
            let translation = Vector3::<Float>::new(t[1], t[2], -t[0]);

            let mut canonical = *source;
            canonical.fixed_view_mut::<3,3>(0,0).copy_from(&rotation);
            canonical.fixed_view_mut::<3,1>(0,3).copy_from(&translation);
            canonical
        }
    }
}

fn to_source(canonical: &Matrix4<Float>, convention: AxisConvention) -> Matrix4<Float> {
    match convention {
        AxisConvention::Canonical => *canonical,
        AxisConvention::Autoware => {
            let rotation = rotation_of(canonical).transpose();
            let t = translation_of(canonical);
            let translation = Vector3::<Float>::new(-t[2], t[0], t[1]);

            let mut source = *canonical;
            source.fixed_view_mut::<3,3>(0,0).copy_from(&rotation);
            source.fixed_view_mut::<3,1>(0,3).copy_from(&translation);
            source
        }
    }
}
