extern crate nalgebra as na;

use rand::{thread_rng,Rng};
use approx::assert_relative_eq;
use na::{Matrix3,Matrix4,Rotation3,Vector3};

use lidarcam::{float,Float};
use lidarcam::extrinsics::{SourceExtrinsic,from_rotation_translation};
use lidarcam::extrinsics::frame_converter::AxisConvention;
use lidarcam::extrinsics::composer::{compose,scale_angle,rotation_x,rotation_y,rotation_z,AdjustmentDeltas,DeltaAxis};

fn source_extrinsic() -> SourceExtrinsic {
    let rotation = Matrix3::<Float>::new(0.0, -1.0, 0.0,
                                         0.0, 0.0, -1.0,
                                         1.0, 0.0, 0.0);
    SourceExtrinsic::new(from_rotation_translation(&rotation, &Vector3::<Float>::new(1.0, 2.0, 3.0)))
}

#[test]
fn autoware_conversion_transposes_and_permutes() {
    let source = source_extrinsic();
    let canonical = source.into_canonical(AxisConvention::Autoware);

    assert_eq!(canonical.rotation(), source.matrix().fixed_view::<3,3>(0,0).transpose());
    assert_eq!(canonical.translation(), Vector3::<Float>::new(2.0, 3.0, -1.0));
    assert_eq!(canonical.matrix().row(3), source.matrix().row(3));
}

#[test]
fn canonical_convention_is_untouched() {
    let source = source_extrinsic();
    let canonical = source.into_canonical(AxisConvention::Canonical);
    assert_eq!(canonical.matrix(), source.matrix());
    assert_eq!(canonical.to_source(AxisConvention::Canonical), source);
}

#[test]
fn to_source_inverts_conversion() {
    let mut rng = thread_rng();
    for _ in 0..10 {
        let rotation = rng.gen::<Rotation3<Float>>();
        let translation = Vector3::<Float>::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0));
        let source = SourceExtrinsic::new(from_rotation_translation(rotation.matrix(), &translation));

        let back = source.into_canonical(AxisConvention::Autoware).to_source(AxisConvention::Autoware);
        assert_eq!(back, source);
    }
}

#[test]
fn zero_deltas_reproduce_base() {
    let base = source_extrinsic().into_canonical(AxisConvention::Autoware);
    let working = compose(&base, &AdjustmentDeltas::default());
    assert_eq!(working, base);
}

#[test]
fn rotation_order_is_x_after_y_after_z() {
    let base = SourceExtrinsic::new(Matrix4::<Float>::identity()).into_canonical(AxisConvention::Canonical);
    let deltas = AdjustmentDeltas::rotation(1.0, 1.0, 1.0);
    let working = compose(&base, &deltas);

    let (alpha, beta, gamma) = deltas.angles();
    let expected = rotation_x(alpha)*(rotation_y(beta)*rotation_z(gamma));
    let reversed = rotation_z(gamma)*(rotation_y(beta)*rotation_x(alpha));

    assert_relative_eq!(working.rotation(), expected, epsilon = 1e-15);
    assert!((working.rotation() - reversed).amax() > 1e-9);
}

#[test]
fn successive_rotations_do_not_commute() {
    let base = SourceExtrinsic::new(Matrix4::<Float>::identity()).into_canonical(AxisConvention::Canonical);
    let alpha_only = AdjustmentDeltas::rotation(1.0, 0.0, 0.0);
    let beta_only = AdjustmentDeltas::rotation(0.0, 1.0, 0.0);

    let alpha_then_beta = compose(&compose(&base, &alpha_only), &beta_only);
    let beta_then_alpha = compose(&compose(&base, &beta_only), &alpha_only);

    assert!((alpha_then_beta.rotation() - beta_then_alpha.rotation()).amax() > 1e-9);
    assert_relative_eq!(alpha_then_beta.rotation(), rotation_y(scale_angle(1.0))*rotation_x(scale_angle(1.0)), epsilon = 1e-15);
}

#[test]
fn rotation_deltas_are_applied_to_base_rotation() {
    let mut rng = thread_rng();
    let base_rotation = rng.gen::<Rotation3<Float>>();
    let base = SourceExtrinsic::new(from_rotation_translation(base_rotation.matrix(), &Vector3::<Float>::zeros())).into_canonical(AxisConvention::Canonical);

    let working = compose(&base, &AdjustmentDeltas::rotation(0.0, 0.0, -0.5));
    let expected = rotation_z(scale_angle(-0.5))*base_rotation.matrix();
    assert_relative_eq!(working.rotation(), expected, epsilon = 1e-12);

    // still a rotation
    assert_relative_eq!(working.rotation()*working.rotation().transpose(), Matrix3::<Float>::identity(), epsilon = 1e-12);
}

#[test]
fn translation_deltas_are_added_unscaled() {
    let base = source_extrinsic().into_canonical(AxisConvention::Canonical);
    let working = compose(&base, &AdjustmentDeltas::translation(0.5, -0.25, 1.0));

    assert_eq!(working.translation(), Vector3::<Float>::new(1.5, 1.75, 4.0));
    assert_eq!(working.rotation(), base.rotation());
}

#[test]
fn deltas_are_clamped() {
    let deltas = AdjustmentDeltas::new(2.0, -3.0, float::NAN, 0.5, 1.0, -1.0);
    assert_eq!(deltas, AdjustmentDeltas::new(1.0, -1.0, 0.0, 0.5, 1.0, -1.0));

    let nudged = deltas.nudged(DeltaAxis::Alpha, 0.1).nudged(DeltaAxis::X, 0.75);
    assert_eq!(nudged.alpha, 1.0);
    assert_eq!(nudged.dx, 1.0);
    assert_eq!(nudged.get(DeltaAxis::Y), 1.0);
    assert!(!nudged.is_zero());
    assert!(AdjustmentDeltas::default().is_zero());
}

#[test]
fn full_scale_input_is_a_small_angle() {
    assert_relative_eq!(scale_angle(1.0), 1.0/(360.0*float::consts::PI), epsilon = 1e-18);
    assert_relative_eq!(scale_angle(float::consts::PI*360.0), 1.0, epsilon = 1e-12);
}
