//! One rigid link of the mechanism: its joint, fixed geometric offsets,
//! optional operational-space map, and the pose/velocity/acceleration state
//! the assembly recomputes on every update.

use crate::joint::Joint;
use crate::op_space::OperationalSpace;
use nalgebra::{Rotation3, Vector3};

/// A rigid link. Bodies are numbered 1-based in the order they are handed
/// to the assembly; `parent_link_id` 0 denotes the ground and every parent
/// id must be strictly less than the body's own id (checked when the
/// assembly is constructed).
///
/// The "absolute" position vectors (`r_op`, `r_og`, `r_ope`, `r_oy`) are
/// measured from the world origin but expressed in the body's own frame;
/// multiply by `r_0k` for world coordinates. Velocities and accelerations
/// of the center of mass follow the same convention.
#[derive(Debug, Clone)]
pub struct Body {
    /// Id of the parent link, 0 for links attached to the ground.
    pub parent_link_id: usize,
    /// The joint connecting this link to its parent.
    pub joint: Joint,
    /// Parent-joint-to-this-joint offset, in the parent frame.
    pub r_parent: Vector3<f64>,
    /// Joint-to-center-of-mass offset, in this body's frame.
    pub r_g: Vector3<f64>,
    /// Joint-to-link-end offset, in this body's frame.
    pub r_pe: Vector3<f64>,
    /// Joint-to-operational-point offset, present iff `op_space` is.
    pub r_y: Option<Vector3<f64>>,
    /// Optional task-space coordinate declared on this body.
    pub op_space: Option<OperationalSpace>,

    // State below is owned by the assembly and rewritten wholesale on
    // every update; it is never partially valid.
    /// Absolute rotation, body frame → world.
    pub r_0k: Rotation3<f64>,
    /// Rotation of this body relative to its parent at the current coordinates.
    pub r_rel_rot: Rotation3<f64>,
    /// Joint translation relative to the parent at the current coordinates.
    pub r_rel: Vector3<f64>,
    /// Absolute joint position (body-frame coordinates).
    pub r_op: Vector3<f64>,
    /// Absolute center-of-mass position (body-frame coordinates).
    pub r_og: Vector3<f64>,
    /// Absolute link-end position (body-frame coordinates).
    pub r_ope: Vector3<f64>,
    /// Absolute operational point (body-frame coordinates); zero offset
    /// when no operational space is attached.
    pub r_oy: Vector3<f64>,
    /// Absolute linear velocity of the center of mass (body frame).
    pub v_og: Vector3<f64>,
    /// Absolute angular velocity (body frame).
    pub w: Vector3<f64>,
    /// Absolute linear acceleration of the center of mass (body frame).
    pub a_og: Vector3<f64>,
    /// Absolute angular acceleration (body frame).
    pub w_dot: Vector3<f64>,
}

impl Body {
    /// A link with no operational-space point.
    pub fn new(
        parent_link_id: usize,
        joint: Joint,
        r_parent: Vector3<f64>,
        r_g: Vector3<f64>,
        r_pe: Vector3<f64>,
    ) -> Self {
        Body {
            parent_link_id,
            joint,
            r_parent,
            r_g,
            r_pe,
            r_y: None,
            op_space: None,
            r_0k: Rotation3::identity(),
            r_rel_rot: Rotation3::identity(),
            r_rel: Vector3::zeros(),
            r_op: Vector3::zeros(),
            r_og: Vector3::zeros(),
            r_ope: Vector3::zeros(),
            r_oy: Vector3::zeros(),
            v_og: Vector3::zeros(),
            w: Vector3::zeros(),
            a_og: Vector3::zeros(),
            w_dot: Vector3::zeros(),
        }
    }

    /// Attach an operational-space point at offset `r_y` from the joint.
    pub fn with_op_space(mut self, r_y: Vector3<f64>, map: OperationalSpace) -> Self {
        self.r_y = Some(r_y);
        self.op_space = Some(map);
        self
    }
}
