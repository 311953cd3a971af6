extern crate nalgebra as na;

use na::{Matrix3,Vector3};
use crate::{float,Float};
use crate::extrinsics::CanonicalExtrinsic;

/// Lower and upper bound of every raw operator input.
pub const DELTA_RANGE: (Float,Float) = (-1.0, 1.0);

/// The six operator inputs, each within `DELTA_RANGE`.
#[derive(Debug,Clone,Copy,PartialEq,Default)]
pub struct AdjustmentDeltas {
    pub alpha: Float,
    pub beta: Float,
    pub gamma: Float,
    pub dx: Float,
    pub dy: Float,
    pub dz: Float
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum DeltaAxis {
    Alpha,
    Beta,
    Gamma,
    X,
    Y,
    Z
}

impl AdjustmentDeltas {
    pub fn new(alpha: Float, beta: Float, gamma: Float, dx: Float, dy: Float, dz: Float) -> AdjustmentDeltas {
        AdjustmentDeltas {
            alpha: clamp_delta(alpha),
            beta: clamp_delta(beta),
            gamma: clamp_delta(gamma),
            dx: clamp_delta(dx),
            dy: clamp_delta(dy),
            dz: clamp_delta(dz)
        }
    }

    pub fn rotation(alpha: Float, beta: Float, gamma: Float) -> AdjustmentDeltas {
        AdjustmentDeltas::new(alpha, beta, gamma, 0.0, 0.0, 0.0)
    }

    pub fn translation(dx: Float, dy: Float, dz: Float) -> AdjustmentDeltas {
        AdjustmentDeltas::new(0.0, 0.0, 0.0, dx, dy, dz)
    }

    pub fn is_zero(&self) -> bool {
        *self == AdjustmentDeltas::default()
    }

    pub fn get(&self, axis: DeltaAxis) -> Float {
        match axis {
            DeltaAxis::Alpha => self.alpha,
            DeltaAxis::Beta => self.beta,
            DeltaAxis::Gamma => self.gamma,
            DeltaAxis::X => self.dx,
            DeltaAxis::Y => self.dy,
            DeltaAxis::Z => self.dz
        }
    }

    /// Copy with `axis` moved by `step`, clamped to `DELTA_RANGE`.
    pub fn nudged(&self, axis: DeltaAxis, step: Float) -> AdjustmentDeltas {
        let mut deltas = *self;
        let value = clamp_delta(self.get(axis) + step);
        match axis {
            DeltaAxis::Alpha => deltas.alpha = value,
            DeltaAxis::Beta => deltas.beta = value,
            DeltaAxis::Gamma => deltas.gamma = value,
            DeltaAxis::X => deltas.dx = value,
            DeltaAxis::Y => deltas.dy = value,
            DeltaAxis::Z => deltas.dz = value
        };
        deltas
    }

    /// Rotation inputs in radians.
    pub fn angles(&self) -> (Float,Float,Float) {
        (scale_angle(self.alpha), scale_angle(self.beta), scale_angle(self.gamma))
    }
}

fn clamp_delta(value: Float) -> Float {
    match value {
        v if v.is_nan() => 0.0,
        v => v.max(DELTA_RANGE.0).min(DELTA_RANGE.1)
    }
}

/// Maps a raw input to a deliberately small angle: (raw/pi)*(1/360).
pub fn scale_angle(raw: Float) -> Float {
    (raw/float::consts::PI)*(1.0/360.0)
}

pub fn rotation_x(angle: Float) -> Matrix3<Float> {
    let (s, c) = angle.sin_cos();
    Matrix3::<Float>::new(1.0, 0.0, 0.0,
                          0.0, c, -s,
                          0.0, s, c)
}

pub fn rotation_y(angle: Float) -> Matrix3<Float> {
    let (s, c) = angle.sin_cos();
    Matrix3::<Float>::new(c, 0.0, s,
                          0.0, 1.0, 0.0,
                          -s, 0.0, c)
}

pub fn rotation_z(angle: Float) -> Matrix3<Float> {
    let (s, c) = angle.sin_cos();
    Matrix3::<Float>::new(c, -s, 0.0,
                          s, c, 0.0,
                          0.0, 0.0, 1.0)
}

/**
 * Working extrinsic for the given operator deltas.
 *
 * The rotation is Rx*(Ry*(Rz*R_base)): z is applied first, then y, then x,
 * all left multiplied onto the base rotation. This order is fixed, results
 * are only reproducible under it. Translation deltas are added unscaled.
 * The base is left untouched.
 */
pub fn compose(base: &CanonicalExtrinsic, deltas: &AdjustmentDeltas) -> CanonicalExtrinsic {
    let (alpha, beta, gamma) = deltas.angles();
    let rotation = rotation_x(alpha)*(rotation_y(beta)*(rotation_z(gamma)*base.rotation()));
    let translation = base.translation() + Vector3::<Float>::new(deltas.dx, deltas.dy, deltas.dz);

    let mut working = *base.matrix();
    working.fixed_view_mut::<3,3>(0,0).copy_from(&rotation);
    working.fixed_view_mut::<3,1>(0,3).copy_from(&translation);
    CanonicalExtrinsic::from_matrix(working)
}
