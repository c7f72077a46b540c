//! Joint capability: each joint type supplies the local kinematics of one
//! body relative to its parent — relative rotation and translation, the 6×d
//! motion-subspace matrix and its time derivative, coordinate defaults and
//! bounds, and a one-step coordinate integration rule.
//!
//! The spatial stacking convention everywhere in this crate is
//! `[v; w]` — linear velocity rows first, angular rows last. Motion-subspace
//! translation rows are expressed in the parent frame (the same frame as
//! `relative_translation`), rotation rows in the body's own frame; the
//! assembly's propagation matrix carries the frame changes.
//!
//! The number of coordinate variables may exceed the number of degrees of
//! freedom: the spherical joint stores a unit quaternion (4 variables) but
//! has 3 velocity-level degrees of freedom.

use nalgebra::{DMatrix, Quaternion, Rotation3, Unit, UnitQuaternion, Vector3};
use std::f64::consts::PI;

/// Closed set of supported joint types. Dispatch is by match, not by a
/// trait object: the operation set is fixed and new variants are a crate
/// change, not a runtime extension.
#[derive(Debug, Clone, PartialEq)]
pub enum Joint {
    /// Single rotational degree of freedom about a fixed axis.
    Revolute { axis: Unit<Vector3<f64>> },
    /// Single translational degree of freedom along a fixed axis.
    Prismatic { axis: Unit<Vector3<f64>> },
    /// Three degrees of freedom in the XY plane: variables `(x, y, θ)`
    /// with θ about the z axis.
    PlanarXY,
    /// Ball joint, quaternion backed: variables `[w, x, y, z]` (unit
    /// quaternion), velocity coordinates are the body-frame angular velocity.
    Spherical,
}

impl Joint {
    /// Revolute joint about the x axis.
    pub fn revolute_x() -> Self {
        Joint::Revolute { axis: Vector3::x_axis() }
    }

    /// Revolute joint about the y axis.
    pub fn revolute_y() -> Self {
        Joint::Revolute { axis: Vector3::y_axis() }
    }

    /// Revolute joint about the z axis.
    pub fn revolute_z() -> Self {
        Joint::Revolute { axis: Vector3::z_axis() }
    }

    /// Velocity-level degree-of-freedom count (columns of the motion subspace).
    pub fn num_dofs(&self) -> usize {
        match self {
            Joint::Revolute { .. } | Joint::Prismatic { .. } => 1,
            Joint::PlanarXY => 3,
            Joint::Spherical => 3,
        }
    }

    /// Position-level coordinate variable count. Differs from `num_dofs`
    /// only for the quaternion-backed spherical joint.
    pub fn num_vars(&self) -> usize {
        match self {
            Joint::Revolute { .. } | Joint::Prismatic { .. } => 1,
            Joint::PlanarXY => 3,
            Joint::Spherical => 4,
        }
    }

    /// Rotation of this body's frame relative to its parent frame for the
    /// given local coordinates (`q.len() == num_vars()`).
    pub fn relative_rotation(&self, q: &[f64]) -> Rotation3<f64> {
        match self {
            Joint::Revolute { axis } => Rotation3::from_axis_angle(axis, q[0]),
            Joint::Prismatic { .. } => Rotation3::identity(),
            Joint::PlanarXY => Rotation3::from_axis_angle(&Vector3::z_axis(), q[2]),
            Joint::Spherical => {
                let quat = UnitQuaternion::from_quaternion(
                    Quaternion::new(q[0], q[1], q[2], q[3]));
                quat.to_rotation_matrix()
            }
        }
    }

    /// Translation of this body's joint relative to the parent joint caused
    /// by the joint coordinates, in the parent frame.
    pub fn relative_translation(&self, q: &[f64]) -> Vector3<f64> {
        match self {
            Joint::Revolute { .. } => Vector3::zeros(),
            Joint::Prismatic { axis } => axis.into_inner() * q[0],
            Joint::PlanarXY => Vector3::new(q[0], q[1], 0.0),
            Joint::Spherical => Vector3::zeros(),
        }
    }

    /// Motion-subspace matrix `S` (6 × num_dofs): maps joint velocity
    /// coordinates to the body's relative spatial velocity `[v_rel; w_rel]`,
    /// translation rows in the parent frame, rotation rows in the body frame.
    pub fn motion_subspace(&self, _q: &[f64], _q_dot: &[f64]) -> DMatrix<f64> {
        let mut s = DMatrix::zeros(6, self.num_dofs());
        match self {
            Joint::Revolute { axis } => {
                s.fixed_view_mut::<3, 1>(3, 0).copy_from(&axis.into_inner());
            }
            Joint::Prismatic { axis } => {
                s.fixed_view_mut::<3, 1>(0, 0).copy_from(&axis.into_inner());
            }
            Joint::PlanarXY => {
                // v_rel = (ẋ, ẏ, 0) in the parent frame, matching
                // relative_translation; the propagation matrix applies the
                // R_relᵀ frame change.
                s[(0, 0)] = 1.0;
                s[(1, 1)] = 1.0;
                s[(5, 2)] = 1.0;
            }
            Joint::Spherical => {
                s.fixed_view_mut::<3, 3>(3, 0)
                    .copy_from(&nalgebra::Matrix3::identity());
            }
        }
        s
    }

    /// Time derivative of the motion-subspace matrix. Zero for every current
    /// variant (the subspaces above are configuration-independent); part of
    /// the joint capability for joint types whose subspace depends on the
    /// coordinates, such as Euler-parametrized ball joints.
    pub fn motion_subspace_dot(&self, _q: &[f64], _q_dot: &[f64]) -> DMatrix<f64> {
        DMatrix::zeros(6, self.num_dofs())
    }

    /// Default coordinate values (mechanism at rest).
    pub fn q_default(&self) -> Vec<f64> {
        match self {
            Joint::Spherical => vec![1.0, 0.0, 0.0, 0.0],
            _ => vec![0.0; self.num_vars()],
        }
    }

    /// Default velocity coordinates (all zero).
    pub fn q_dot_default(&self) -> Vec<f64> {
        vec![0.0; self.num_dofs()]
    }

    /// Per-variable lower coordinate bounds.
    pub fn q_lower(&self) -> Vec<f64> {
        match self {
            Joint::Revolute { .. } => vec![-PI],
            Joint::Prismatic { .. } => vec![f64::NEG_INFINITY],
            Joint::PlanarXY => vec![f64::NEG_INFINITY, f64::NEG_INFINITY, -PI],
            Joint::Spherical => vec![-1.0; 4],
        }
    }

    /// Per-variable upper coordinate bounds.
    pub fn q_upper(&self) -> Vec<f64> {
        match self {
            Joint::Revolute { .. } => vec![PI],
            Joint::Prismatic { .. } => vec![f64::INFINITY],
            Joint::PlanarXY => vec![f64::INFINITY, f64::INFINITY, PI],
            Joint::Spherical => vec![1.0; 4],
        }
    }

    /// One explicit integration step: advance the coordinate variables by
    /// `dt` under constant velocity coordinates. Scalar variables advance
    /// linearly; the spherical quaternion is advanced on the group
    /// (`q ⊗ exp(ω·dt)`, body-frame angular velocity) and renormalized.
    pub fn integrate(&self, q: &[f64], q_dot: &[f64], dt: f64) -> Vec<f64> {
        match self {
            Joint::Spherical => {
                let quat = UnitQuaternion::from_quaternion(
                    Quaternion::new(q[0], q[1], q[2], q[3]));
                let omega = Vector3::new(q_dot[0], q_dot[1], q_dot[2]);
                let next = quat * UnitQuaternion::from_scaled_axis(omega * dt);
                vec![next.w, next.i, next.j, next.k]
            }
            _ => q.iter().zip(q_dot.iter()).map(|(x, v)| x + v * dt).collect(),
        }
    }
}
