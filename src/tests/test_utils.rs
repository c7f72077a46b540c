//! Shared helpers for the scenario tests.

use crate::assembly::BodyAssembly;
use crate::body::Body;
use crate::joint::Joint;
use crate::op_space::OperationalSpace;
use nalgebra::{DVector, Vector3};

pub fn assert_near(left: f64, right: f64, tolerance: f64) {
    assert!(
        (left - right).abs() < tolerance,
        "{} is not approximately equal to {}",
        left,
        right
    );
}

pub fn assert_vector3_near(left: &Vector3<f64>, right: &Vector3<f64>, tolerance: f64) {
    assert!(
        (left - right).norm() < tolerance,
        "{:?} is not approximately equal to {:?}",
        left,
        right
    );
}

pub fn assert_dvector_near(left: &DVector<f64>, right: &DVector<f64>, tolerance: f64) {
    assert_eq!(left.len(), right.len(), "vector lengths differ");
    assert!(
        (left - right).amax() < tolerance,
        "{:?} is not approximately equal to {:?}",
        left,
        right
    );
}

/// The canonical planar scenario: two unit links on revolute z joints, the
/// root joint at the origin, the second joint offset by (1, 0, 0) along the
/// first link. Centers of mass sit at the joints so the per-body velocity
/// state is the joint-point velocity.
pub fn two_link_arm() -> BodyAssembly {
    let bodies = vec![
        Body::new(
            0,
            Joint::revolute_z(),
            Vector3::zeros(),
            Vector3::zeros(),
            Vector3::new(1.0, 0.0, 0.0),
        ),
        Body::new(
            1,
            Joint::revolute_z(),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::zeros(),
            Vector3::new(1.0, 0.0, 0.0),
        ),
    ];
    BodyAssembly::new(bodies).unwrap()
}

/// Same two-link arm with an operational point at the tip of link 2,
/// tracked in x and y.
pub fn two_link_arm_with_tip() -> BodyAssembly {
    let bodies = vec![
        Body::new(
            0,
            Joint::revolute_z(),
            Vector3::zeros(),
            Vector3::new(0.5, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
        ),
        Body::new(
            1,
            Joint::revolute_z(),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.5, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
        )
        .with_op_space(
            Vector3::new(1.0, 0.0, 0.0),
            OperationalSpace::Position { axes: [true, true, false] },
        ),
    ];
    BodyAssembly::new(bodies).unwrap()
}
