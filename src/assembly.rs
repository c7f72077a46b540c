//! The kinematic core: owns the ordered set of bodies, builds the
//! connectivity and reachability structure once, and on every `update`
//! recomputes the full set of system-level matrices and vectors — the joint
//! motion matrix `S` and its derivative, the body propagation matrix `P`,
//! the velocity mapping `W = P·S`, the operational-space chain
//! (`Q`, `T`, `J`, `J_dot`) and the acceleration bias term `C_a`.
//!
//! All derived state is rewritten wholesale per update; there is no partial
//! or incremental path. A call either completes with every field mutually
//! consistent, or fails on a precondition before mutating anything.

use crate::body::Body;
use crate::kinematics_error::KinematicsError;
use crate::utils::skew;
use nalgebra::{DMatrix, DVector, Rotation3, Vector3};

/// Tree-structured rigid body assembly. Construct once from an ordered list
/// of bodies (topology is fixed for the lifetime of the value), then call
/// [`BodyAssembly::update`] with new generalized coordinates as often as
/// needed. Updating requires `&mut self`; distinct assemblies share nothing.
pub struct BodyAssembly {
    bodies: Vec<Body>,

    // Fixed topology, built at construction.
    connectivity: DMatrix<bool>,
    bodies_path_graph: DMatrix<bool>,
    var_offsets: Vec<usize>,
    dof_offsets: Vec<usize>,
    op_offsets: Vec<usize>,
    num_dofs: usize,
    num_dof_vars: usize,
    num_op_dofs: usize,
    t: DMatrix<f64>,

    // Derived state, overwritten on every update.
    q: DVector<f64>,
    q_dot: DVector<f64>,
    q_ddot: DVector<f64>,
    s: DMatrix<f64>,
    s_dot: DMatrix<f64>,
    p: DMatrix<f64>,
    q_op: DMatrix<f64>,
    w: DMatrix<f64>,
    j: DMatrix<f64>,
    j_dot: DMatrix<f64>,
    x_dot: DVector<f64>,
    x_ddot: DVector<f64>,
    c_a: DVector<f64>,
    y: DVector<f64>,
    y_dot: DVector<f64>,
    y_ddot: DVector<f64>,
}

impl BodyAssembly {
    /// Builds the connectivity and reachability graphs, binds offsets and
    /// the fixed task selection matrix `T`, and runs one update at the
    /// per-joint default coordinates so every accessor is consistent from
    /// the start.
    ///
    /// Fails with a topology error if any body's parent id is not strictly
    /// less than its own id (ids are 1-based and must respect a topological
    /// order; 0 is the ground).
    pub fn new(bodies: Vec<Body>) -> Result<Self, KinematicsError> {
        let n_links = bodies.len();

        let mut connectivity = DMatrix::from_element(n_links, n_links, false);
        let mut bodies_path_graph = DMatrix::from_element(n_links, n_links, false);
        for child in 1..=n_links {
            let parent = bodies[child - 1].parent_link_id;
            if parent >= child {
                return Err(KinematicsError::Topology { parent, child });
            }
            // Row `parent` holds the direct children of that link
            // (row 0 is the ground).
            connectivity[(parent, child - 1)] = true;
            bodies_path_graph[(child - 1, child - 1)] = true;
            if parent > 0 {
                bodies_path_graph[(parent - 1, child - 1)] = true;
                // Parents are processed before children, so the parent's
                // ancestor column is already complete: OR it in.
                for i in 0..n_links {
                    if bodies_path_graph[(i, parent - 1)] {
                        bodies_path_graph[(i, child - 1)] = true;
                    }
                }
            }
        }

        let mut var_offsets = Vec::with_capacity(n_links);
        let mut dof_offsets = Vec::with_capacity(n_links);
        let mut op_offsets = Vec::with_capacity(n_links);
        let (mut num_dof_vars, mut num_dofs, mut num_op_dofs) = (0, 0, 0);
        for body in &bodies {
            var_offsets.push(num_dof_vars);
            dof_offsets.push(num_dofs);
            op_offsets.push(num_op_dofs);
            num_dof_vars += body.joint.num_vars();
            num_dofs += body.joint.num_dofs();
            if let Some(map) = &body.op_space {
                num_op_dofs += map.num_dofs();
            }
        }

        // T is fixed once the operational points are declared: per attached
        // point, its selection matrix lands in that body's 6-column block.
        let mut t = DMatrix::zeros(num_op_dofs, 6 * n_links);
        for (k, body) in bodies.iter().enumerate() {
            if let Some(map) = &body.op_space {
                let rows = map.num_dofs();
                t.view_mut((op_offsets[k], 6 * k), (rows, 6))
                    .copy_from(&map.selection_matrix());
            }
        }

        let mut assembly = BodyAssembly {
            bodies,
            connectivity,
            bodies_path_graph,
            var_offsets,
            dof_offsets,
            op_offsets,
            num_dofs,
            num_dof_vars,
            num_op_dofs,
            t,
            q: DVector::zeros(num_dof_vars),
            q_dot: DVector::zeros(num_dofs),
            q_ddot: DVector::zeros(num_dofs),
            s: DMatrix::zeros(6 * n_links, num_dofs),
            s_dot: DMatrix::zeros(6 * n_links, num_dofs),
            p: DMatrix::zeros(6 * n_links, 6 * n_links),
            q_op: DMatrix::zeros(6 * n_links, 6 * n_links),
            w: DMatrix::zeros(6 * n_links, num_dofs),
            j: DMatrix::zeros(num_op_dofs, num_dofs),
            j_dot: DMatrix::zeros(num_op_dofs, num_dofs),
            x_dot: DVector::zeros(6 * n_links),
            x_ddot: DVector::zeros(6 * n_links),
            c_a: DVector::zeros(6 * n_links),
            y: DVector::zeros(num_op_dofs),
            y_dot: DVector::zeros(num_op_dofs),
            y_ddot: DVector::zeros(num_op_dofs),
        };

        let q0 = assembly.q_default();
        let zero = DVector::zeros(assembly.num_dofs);
        assembly.update(&q0, &zero.clone(), &zero)?;
        Ok(assembly)
    }

    /// Recompute every derived matrix, vector and per-body state for the
    /// given generalized coordinates. `q` concatenates the per-joint
    /// coordinate variables, `q_dot`/`q_ddot` the per-joint velocity and
    /// acceleration coordinates (the two lengths differ when quaternion
    /// joints are present).
    pub fn update(
        &mut self,
        q: &DVector<f64>,
        q_dot: &DVector<f64>,
        q_ddot: &DVector<f64>,
    ) -> Result<(), KinematicsError> {
        // Preconditions first: nothing is mutated on failure.
        self.check_len("q", q.len(), self.num_dof_vars)?;
        self.check_len("q_dot", q_dot.len(), self.num_dofs)?;
        self.check_len("q_ddot", q_ddot.len(), self.num_dofs)?;

        self.q.copy_from(q);
        self.q_dot.copy_from(q_dot);
        self.q_ddot.copy_from(q_ddot);

        self.update_poses();
        self.assemble_propagation();
        self.propagate_velocity();
        self.propagate_acceleration();
        self.differentiate_task_jacobian();
        Ok(())
    }

    /// Per-body local update and pose propagation, in increasing index
    /// order so the parent is always processed before its children. Also
    /// fills the `S`/`S_dot` blocks and assembles the task coordinates `y`.
    fn update_poses(&mut self) {
        self.s.fill(0.0);
        self.s_dot.fill(0.0);
        for k in 0..self.bodies.len() {
            let nv = self.bodies[k].joint.num_vars();
            let nd = self.bodies[k].joint.num_dofs();
            let vo = self.var_offsets[k];
            let dof = self.dof_offsets[k];
            let qs = &self.q.as_slice()[vo..vo + nv];
            let qds = &self.q_dot.as_slice()[dof..dof + nd];

            let parent = self.bodies[k].parent_link_id;
            let (parent_rot, parent_r_op) = if parent > 0 {
                let pb = &self.bodies[parent - 1];
                (pb.r_0k, pb.r_op)
            } else {
                (Rotation3::identity(), Vector3::zeros())
            };

            let body = &mut self.bodies[k];
            body.r_rel_rot = body.joint.relative_rotation(qs);
            body.r_rel = body.joint.relative_translation(qs);
            body.r_0k = parent_rot * body.r_rel_rot;
            body.r_op = body.r_rel_rot.inverse()
                * (parent_r_op + body.r_parent + body.r_rel);
            body.r_og = body.r_op + body.r_g;
            body.r_ope = body.r_op + body.r_pe;
            body.r_oy = body.r_op + body.r_y.unwrap_or_else(Vector3::zeros);

            let s_block = self.bodies[k].joint.motion_subspace(qs, qds);
            let s_dot_block = self.bodies[k].joint.motion_subspace_dot(qs, qds);
            self.s.view_mut((6 * k, dof), (6, nd)).copy_from(&s_block);
            self.s_dot.view_mut((6 * k, dof), (6, nd)).copy_from(&s_dot_block);
        }

        for (k, body) in self.bodies.iter().enumerate() {
            if let Some(map) = &body.op_space {
                let yk = map.extract(&body.r_oy, &body.r_0k);
                self.y.rows_mut(self.op_offsets[k], yk.len()).copy_from(&yk);
            }
        }
    }

    /// Assemble `P` and the operational-space variant `Q`, then
    /// `W = P·S` and `J = T·Q·S`. A block (k, a) is filled only when `a`
    /// lies on the root path of `k`; every other pair keeps a zero block,
    /// which is what restricts propagation to the kinematic chain.
    fn assemble_propagation(&mut self) {
        self.p.fill(0.0);
        self.q_op.fill(0.0);
        for k in 0..self.bodies.len() {
            for a in 0..=k {
                if !self.bodies_path_graph[(a, k)] {
                    continue;
                }
                let bk = &self.bodies[k];
                let ba = &self.bodies[a];
                let r_ka = bk.r_0k.inverse() * ba.r_0k;
                let rel_inv = ba.r_rel_rot.inverse();

                let top_left = r_ka * rel_inv;
                let arm = -ba.r_op + r_ka.inverse() * bk.r_og;
                let top_right = -(r_ka.matrix() * skew(&arm));
                self.p.view_mut((6 * k, 6 * a), (3, 3)).copy_from(top_left.matrix());
                self.p.view_mut((6 * k, 6 * a + 3), (3, 3)).copy_from(&top_right);
                self.p.view_mut((6 * k + 3, 6 * a + 3), (3, 3)).copy_from(r_ka.matrix());

                // Q is P premultiplied by diag(R_0k, R_0k) and built around
                // the operational point instead of the center of mass, so
                // the task Jacobian comes out in world coordinates.
                let top_left_q = ba.r_0k * rel_inv;
                let arm_q = -ba.r_op + r_ka.inverse() * bk.r_oy;
                let top_right_q = -(ba.r_0k.matrix() * skew(&arm_q));
                self.q_op.view_mut((6 * k, 6 * a), (3, 3)).copy_from(top_left_q.matrix());
                self.q_op.view_mut((6 * k, 6 * a + 3), (3, 3)).copy_from(&top_right_q);
                self.q_op.view_mut((6 * k + 3, 6 * a + 3), (3, 3)).copy_from(ba.r_0k.matrix());
            }
        }
        self.w = &self.p * &self.s;
        self.j = &self.t * &(&self.q_op * &self.s);
    }

    /// `x_dot = W·q_dot`, unpacked per body into `(v_og, w)`, and the task
    /// velocity `y_dot = J·q_dot`.
    fn propagate_velocity(&mut self) {
        self.x_dot = &self.w * &self.q_dot;
        for (k, body) in self.bodies.iter_mut().enumerate() {
            body.v_og = self.x_dot.fixed_rows::<3>(6 * k).into_owned();
            body.w = self.x_dot.fixed_rows::<3>(6 * k + 3).into_owned();
        }
        self.y_dot = &self.j * &self.q_dot;
    }

    /// Acceleration bias term and acceleration propagation:
    /// `C_a = P·S_dot·q_dot + P·ang_mat·S·q_dot` plus the centripetal
    /// corrections gathered over each body's root path, then
    /// `x_ddot = W·q_ddot + C_a`, unpacked into `(a_og, w_dot)`.
    fn propagate_acceleration(&mut self) {
        let ang_mat = self.angular_velocity_matrix();
        self.c_a = &self.p * (&self.s_dot * &self.q_dot)
            + &self.p * (&ang_mat * (&self.s * &self.q_dot));

        for k in 0..self.bodies.len() {
            for a in 0..=k {
                if !self.bodies_path_graph[(a, k)] {
                    continue;
                }
                let a_parent = self.bodies[a].parent_link_id;
                if a_parent == 0 {
                    continue;
                }
                // Centripetal acceleration the spinning parent of `a`
                // imparts on the joint offset of `a`, carried into the
                // frame of `k`. The reachability mask substitutes for an
                // explicit recursive walk.
                let bp = &self.bodies[a_parent - 1];
                let offset = self.bodies[a].r_parent + self.bodies[a].r_rel;
                let centripetal = bp.w.cross(&bp.w.cross(&offset));
                let term = self.bodies[k].r_0k.inverse() * (bp.r_0k * centripetal);
                let mut rows = self.c_a.fixed_rows_mut::<3>(6 * k);
                rows += term;
            }
            let bk = &self.bodies[k];
            let own = bk.w.cross(&bk.w.cross(&bk.r_g));
            let mut rows = self.c_a.fixed_rows_mut::<3>(6 * k);
            rows += own;
        }

        self.x_ddot = &self.w * &self.q_ddot + &self.c_a;
        for (k, body) in self.bodies.iter_mut().enumerate() {
            body.a_og = self.x_ddot.fixed_rows::<3>(6 * k).into_owned();
            body.w_dot = self.x_ddot.fixed_rows::<3>(6 * k + 3).into_owned();
        }
    }

    /// `J_dot` built the same way as the `C_a` derivation but applied to
    /// `Q`: `temp = Q·S_dot + Q·ang_mat·S` plus correction rows expressed
    /// against the angular rows of the already computed `W`
    /// (`w×(w×r) = -skew(w)·skew(r)·w`), so that `J_dot·q_dot` reproduces
    /// the world-frame centripetal terms exactly. Then `J_dot = T·temp`
    /// and `y_ddot = J_dot·q_dot + J·q_ddot`.
    fn differentiate_task_jacobian(&mut self) {
        let ang_mat = self.angular_velocity_matrix();
        let mut temp = &self.q_op * &self.s_dot + &self.q_op * (&ang_mat * &self.s);

        for k in 0..self.bodies.len() {
            for a in 0..=k {
                if !self.bodies_path_graph[(a, k)] {
                    continue;
                }
                let a_parent = self.bodies[a].parent_link_id;
                if a_parent == 0 {
                    continue;
                }
                let bp = &self.bodies[a_parent - 1];
                let offset = self.bodies[a].r_parent + self.bodies[a].r_rel;
                let gain = bp.r_0k.matrix() * skew(&bp.w) * skew(&offset);
                let delta = gain * self.w.rows(6 * (a_parent - 1) + 3, 3);
                let mut rows = temp.rows_mut(6 * k, 3);
                rows -= delta;
            }
            let bk = &self.bodies[k];
            let r_y = bk.r_y.unwrap_or_else(Vector3::zeros);
            let gain = bk.r_0k.matrix() * skew(&bk.w) * skew(&r_y);
            let delta = gain * self.w.rows(6 * k + 3, 3);
            let mut rows = temp.rows_mut(6 * k, 3);
            rows -= delta;
        }

        self.j_dot = &self.t * &temp;
        self.y_ddot = &self.j_dot * &self.q_dot + &self.j * &self.q_ddot;
    }

    /// Block-diagonal matrix with per-body blocks
    /// `[2·skew(w_parent), 0; 0, skew(w_k)]` (the root's parent angular
    /// velocity is zero).
    fn angular_velocity_matrix(&self) -> DMatrix<f64> {
        let n_links = self.bodies.len();
        let mut ang_mat = DMatrix::zeros(6 * n_links, 6 * n_links);
        for (k, body) in self.bodies.iter().enumerate() {
            let w_parent = if body.parent_link_id > 0 {
                self.bodies[body.parent_link_id - 1].w
            } else {
                Vector3::zeros()
            };
            ang_mat
                .view_mut((6 * k, 6 * k), (3, 3))
                .copy_from(&(2.0 * skew(&w_parent)));
            ang_mat
                .view_mut((6 * k + 3, 6 * k + 3), (3, 3))
                .copy_from(&skew(&body.w));
        }
        ang_mat
    }

    fn check_len(
        &self,
        what: &'static str,
        found: usize,
        expected: usize,
    ) -> Result<(), KinematicsError> {
        if found != expected {
            return Err(KinematicsError::Dimension { what, expected, found });
        }
        Ok(())
    }

    /// One explicit integration step for the whole coordinate vector,
    /// delegated per body to the owning joint.
    pub fn integrate(
        &self,
        q: &DVector<f64>,
        q_dot: &DVector<f64>,
        dt: f64,
    ) -> Result<DVector<f64>, KinematicsError> {
        self.check_len("q", q.len(), self.num_dof_vars)?;
        self.check_len("q_dot", q_dot.len(), self.num_dofs)?;
        let mut next = Vec::with_capacity(self.num_dof_vars);
        for (k, body) in self.bodies.iter().enumerate() {
            let vo = self.var_offsets[k];
            let dof = self.dof_offsets[k];
            let qs = &q.as_slice()[vo..vo + body.joint.num_vars()];
            let qds = &q_dot.as_slice()[dof..dof + body.joint.num_dofs()];
            next.extend(body.joint.integrate(qs, qds, dt));
        }
        Ok(DVector::from_vec(next))
    }

    /// Concatenation of the per-joint default coordinates.
    pub fn q_default(&self) -> DVector<f64> {
        let mut q = Vec::with_capacity(self.num_dof_vars);
        for body in &self.bodies {
            q.extend(body.joint.q_default());
        }
        DVector::from_vec(q)
    }

    /// Per-variable lower coordinate bounds, concatenated in body order.
    pub fn q_lower(&self) -> DVector<f64> {
        let mut q = Vec::with_capacity(self.num_dof_vars);
        for body in &self.bodies {
            q.extend(body.joint.q_lower());
        }
        DVector::from_vec(q)
    }

    /// Per-variable upper coordinate bounds, concatenated in body order.
    pub fn q_upper(&self) -> DVector<f64> {
        let mut q = Vec::with_capacity(self.num_dof_vars);
        for body in &self.bodies {
            q.extend(body.joint.q_upper());
        }
        DVector::from_vec(q)
    }

    /// All bodies in index order, with the state of the latest update.
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Body by 1-based link id.
    pub fn body(&self, id: usize) -> Option<&Body> {
        if id == 0 { None } else { self.bodies.get(id - 1) }
    }

    /// True iff link `a` lies on the path from the ground to link `k`
    /// (including `a == k`). Ids are 1-based.
    pub fn is_ancestor(&self, a: usize, k: usize) -> bool {
        if a == 0 || k == 0 || a > self.bodies.len() || k > self.bodies.len() {
            return false;
        }
        self.bodies_path_graph[(a - 1, k - 1)]
    }

    pub fn num_links(&self) -> usize {
        self.bodies.len()
    }

    /// Total velocity-level degree-of-freedom count.
    pub fn num_dofs(&self) -> usize {
        self.num_dofs
    }

    /// Total position-level coordinate variable count.
    pub fn num_dof_vars(&self) -> usize {
        self.num_dof_vars
    }

    /// Total declared task-space dimension.
    pub fn num_op_dofs(&self) -> usize {
        self.num_op_dofs
    }

    /// Direct connectivity: entry `(parent, child - 1)` is true iff
    /// `parent` (0 = ground) is the direct parent of `child`.
    pub fn connectivity(&self) -> &DMatrix<bool> {
        &self.connectivity
    }

    /// Reachability over bodies: entry `(a - 1, k - 1)` is true iff `a`
    /// is an ancestor of `k` or `a == k`.
    pub fn bodies_path_graph(&self) -> &DMatrix<bool> {
        &self.bodies_path_graph
    }

    pub fn s(&self) -> &DMatrix<f64> {
        &self.s
    }

    pub fn s_dot(&self) -> &DMatrix<f64> {
        &self.s_dot
    }

    /// Body propagation matrix (block lower triangular).
    pub fn p(&self) -> &DMatrix<f64> {
        &self.p
    }

    /// Operational-space variant of the propagation matrix.
    pub fn q_op(&self) -> &DMatrix<f64> {
        &self.q_op
    }

    /// Velocity mapping `W = P·S`: `x_dot = W·q_dot`.
    pub fn w(&self) -> &DMatrix<f64> {
        &self.w
    }

    /// Fixed task selection matrix.
    pub fn t(&self) -> &DMatrix<f64> {
        &self.t
    }

    /// Task Jacobian `J = T·Q·S`.
    pub fn j(&self) -> &DMatrix<f64> {
        &self.j
    }

    pub fn j_dot(&self) -> &DMatrix<f64> {
        &self.j_dot
    }

    pub fn q(&self) -> &DVector<f64> {
        &self.q
    }

    pub fn q_dot(&self) -> &DVector<f64> {
        &self.q_dot
    }

    pub fn q_ddot(&self) -> &DVector<f64> {
        &self.q_ddot
    }

    /// Stacked absolute spatial velocities, 6 rows per body.
    pub fn x_dot(&self) -> &DVector<f64> {
        &self.x_dot
    }

    /// Stacked absolute spatial accelerations, 6 rows per body.
    pub fn x_ddot(&self) -> &DVector<f64> {
        &self.x_ddot
    }

    /// Acceleration bias term: `x_ddot = W·q_ddot + C_a`.
    pub fn c_a(&self) -> &DVector<f64> {
        &self.c_a
    }

    /// Task coordinates, concatenated in body order.
    pub fn y(&self) -> &DVector<f64> {
        &self.y
    }

    pub fn y_dot(&self) -> &DVector<f64> {
        &self.y_dot
    }

    pub fn y_ddot(&self) -> &DVector<f64> {
        &self.y_ddot
    }
}
