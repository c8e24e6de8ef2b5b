//! Property-based tests for the geometry kernel.
//!
//! Run with: cargo test -p bdfutil-core --test properties
//! and again with `--features parallel` to cover the rayon path.

use approx::abs_diff_eq;
use bdfutil_core::{rotation_matrix, Error, Matrix3, Point3, PointSet, Vector3};
use proptest::prelude::*;

const TOL: f64 = 1e-9;

// =============================================================================
// Strategies
// =============================================================================

fn arb_position() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-100.0..100.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

/// Axis with a length well away from zero.
fn arb_axis() -> impl Strategy<Value = Vector3<f64>> {
    prop::array::uniform3(-10.0..10.0f64)
        .prop_map(|[x, y, z]| Vector3::new(x, y, z))
        .prop_filter("axis must be non-degenerate", |v| v.norm() > 1e-3)
}

fn arb_angle() -> impl Strategy<Value = f64> {
    -720.0..720.0f64
}

fn arb_points() -> impl Strategy<Value = PointSet> {
    prop::collection::vec(arb_position(), 0..50).prop_map(PointSet::from)
}

fn points_close(a: &PointSet, b: &PointSet, tol: f64) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b.iter())
            .all(|(p, q)| abs_diff_eq!(p.coords, q.coords, epsilon = tol))
}

// =============================================================================
// Rotation matrix
// =============================================================================

proptest! {
    #[test]
    fn zero_angle_is_identity(axis in arb_axis()) {
        let r = rotation_matrix(axis.x, axis.y, axis.z, 0.0).unwrap();
        prop_assert!(abs_diff_eq!(r, Matrix3::identity(), epsilon = 1e-10));
    }

    #[test]
    fn rotation_is_orthonormal(axis in arb_axis(), theta in arb_angle()) {
        let r = rotation_matrix(axis.x, axis.y, axis.z, theta).unwrap();
        prop_assert!(abs_diff_eq!(r * r.transpose(), Matrix3::identity(), epsilon = 1e-10));
        prop_assert!((r.determinant() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn axis_is_fixed(axis in arb_axis(), theta in arb_angle()) {
        let mut points = PointSet::from(vec![Point3::from(axis)]);
        points.rotate(axis.x, axis.y, axis.z, theta).unwrap();
        let p = points.as_slice()[0];
        prop_assert!(abs_diff_eq!(p.coords, axis, epsilon = TOL));
    }

    #[test]
    fn rotation_round_trip(points in arb_points(), axis in arb_axis(), theta in arb_angle()) {
        let mut rotated = points.clone();
        rotated.rotate(axis.x, axis.y, axis.z, theta).unwrap();
        rotated.rotate(axis.x, axis.y, axis.z, -theta).unwrap();
        prop_assert!(points_close(&rotated, &points, TOL));
    }

    #[test]
    fn rotation_preserves_length(point in arb_position(), axis in arb_axis(), theta in arb_angle()) {
        let mut points = PointSet::from(vec![point]);
        points.rotate(axis.x, axis.y, axis.z, theta).unwrap();
        let rotated = points.as_slice()[0];
        prop_assert!((rotated.coords.norm() - point.coords.norm()).abs() < TOL);
    }
}

// =============================================================================
// Translation and scale
// =============================================================================

proptest! {
    #[test]
    fn translations_compose(
        points in arb_points(),
        d1 in prop::array::uniform3(-50.0..50.0f64),
        d2 in prop::array::uniform3(-50.0..50.0f64),
    ) {
        let mut stepwise = points.clone();
        stepwise.translate(d1[0], d1[1], d1[2]);
        stepwise.translate(d2[0], d2[1], d2[2]);

        let mut combined = points;
        combined.translate(d1[0] + d2[0], d1[1] + d2[1], d1[2] + d2[2]);

        prop_assert!(points_close(&stepwise, &combined, TOL));
    }

    #[test]
    fn scales_compose(points in arb_points(), s1 in -10.0..10.0f64, s2 in -10.0..10.0f64) {
        let mut stepwise = points.clone();
        stepwise.scale(s1);
        stepwise.scale(s2);

        let mut combined = points;
        combined.scale(s1 * s2);

        prop_assert!(points_close(&stepwise, &combined, 1e-8));
    }
}

// =============================================================================
// Get / set
// =============================================================================

proptest! {
    #[test]
    fn get_set_round_trip(points in arb_points()) {
        let mut copy = points.clone();
        let coords = copy.coordinates();
        copy.set_coordinates(&coords).unwrap();
        prop_assert_eq!(copy, points);
    }

    #[test]
    fn mismatched_length_is_rejected(points in arb_points(), extra in arb_position()) {
        let mut target = points.clone();

        let mut longer = points.coordinates();
        longer.push(extra);
        let is_mismatch = matches!(
            target.set_coordinates(&longer),
            Err(Error::CoordinateCountMismatch { .. })
        );
        prop_assert!(is_mismatch);
        prop_assert_eq!(&target, &points);

        if !points.is_empty() {
            let shorter = &points.coordinates()[1..];
            prop_assert!(target.set_coordinates(shorter).is_err());
            prop_assert_eq!(&target, &points);
        }
    }
}
