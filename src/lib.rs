//! Rust implementation of the kinematic core of a cable-driven robot
//! modeling toolkit: forward kinematics and velocity/acceleration Jacobians
//! for tree-structured multibody mechanisms with arbitrary joint types.
//!
//! A mechanism is an ordered list of rigid links ([`body::Body`]), each
//! owning a joint ([`joint::Joint`]) and optionally declaring an
//! operational-space (task-space) coordinate ([`op_space::OperationalSpace`]).
//! The [`assembly::BodyAssembly`] builds the connectivity and reachability
//! structure once, and on every `update(q, q_dot, q_ddot)` recomputes:
//!
//! - per-body absolute pose, velocity and acceleration,
//! - the joint motion matrix `S` and its derivative `S_dot`,
//! - the body propagation matrix `P` and velocity mapping `W = P·S`,
//! - the operational-space Jacobian chain `J = T·Q·S` with `J_dot`,
//! - the acceleration bias term `C_a` (`x_ddot = W·q_ddot + C_a`).
//!
//! Cable lengths and the cable Jacobian `L = V·W` are computed on top of
//! the assembly by [`cables::CableSystem`]. Every higher-level analysis
//! (workspace computation, force analysis) consumes these matrices.
//!
//! # Features
//!
//! - Arbitrary tree/forest topologies: bodies declare their parent link,
//!   numbered so parents always precede children.
//! - Revolute, prismatic, planar and quaternion-backed spherical joints;
//!   coordinate-variable and degree-of-freedom counts may differ.
//! - All derived state is recomputed wholesale per update; a call either
//!   completes consistently or fails on a precondition before mutating.
//! - Mechanism descriptions loadable from YAML (feature
//!   `allow_filesystem`, enabled by default).

pub mod assembly;
pub mod body;
pub mod cables;
pub mod joint;
pub mod kinematics_error;
pub mod op_space;

#[path = "utils/utils.rs"]
pub mod utils;

#[cfg(feature = "allow_filesystem")]
pub mod mechanism_from_file;

#[cfg(test)]
mod tests;
