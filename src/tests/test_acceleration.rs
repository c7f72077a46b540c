//! Acceleration-level behavior: the bias term `C_a`, the per-body
//! accelerations it produces, and the task acceleration `y_ddot`.

use crate::tests::test_utils::{
    assert_dvector_near, assert_vector3_near, two_link_arm, two_link_arm_with_tip,
};
use crate::assembly::BodyAssembly;
use crate::body::Body;
use crate::joint::Joint;
use crate::op_space::OperationalSpace;
use nalgebra::{DVector, Vector3};

#[test]
fn test_two_link_centripetal_closed_form() {
    let mut assembly = two_link_arm();
    // Root spinning at 1 rad/s, elbow locked, no joint acceleration: the
    // second joint point sits 1 m out and sees pure centripetal pull of
    // ω²·r = 1 back toward the axis, along -x in its own frame.
    let q = DVector::zeros(2);
    let q_dot = DVector::from_vec(vec![1.0, 0.0]);
    let q_ddot = DVector::zeros(2);
    assembly.update(&q, &q_dot, &q_ddot).unwrap();

    let body1 = &assembly.bodies()[0];
    assert_vector3_near(&body1.a_og, &Vector3::zeros(), 1e-12);
    assert_vector3_near(&body1.w_dot, &Vector3::zeros(), 1e-12);

    let body2 = &assembly.bodies()[1];
    assert_vector3_near(&body2.a_og, &Vector3::new(-1.0, 0.0, 0.0), 1e-12);
    assert_vector3_near(&body2.w_dot, &Vector3::zeros(), 1e-12);
}

#[test]
fn test_centripetal_with_offset_centers_of_mass() {
    // Same chain with the centers of mass halfway along each link: each
    // body's own spin adds ω²·r_g on top of what the parent imparts.
    let link = |parent, r_parent| {
        Body::new(
            parent,
            Joint::revolute_z(),
            r_parent,
            Vector3::new(0.5, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
        )
    };
    let bodies = vec![
        link(0, Vector3::zeros()),
        link(1, Vector3::new(1.0, 0.0, 0.0)),
    ];
    let mut assembly = BodyAssembly::new(bodies).unwrap();
    let q = DVector::zeros(2);
    let q_dot = DVector::from_vec(vec![1.0, 0.0]);
    let q_ddot = DVector::zeros(2);
    assembly.update(&q, &q_dot, &q_ddot).unwrap();

    // Body 1: center of mass 0.5 m out, a = -ω²·0.5.
    let body1 = &assembly.bodies()[0];
    assert_vector3_near(&body1.a_og, &Vector3::new(-0.5, 0.0, 0.0), 1e-12);
    // Body 2: joint 1.0 m out plus its own center 0.5 m further.
    let body2 = &assembly.bodies()[1];
    assert_vector3_near(&body2.a_og, &Vector3::new(-1.5, 0.0, 0.0), 1e-12);
}

#[test]
fn test_pure_joint_acceleration() {
    let mut assembly = two_link_arm();
    // From rest, the bias term vanishes and x_ddot reduces to W·q_ddot.
    let q = DVector::from_vec(vec![0.6, -1.1]);
    let q_dot = DVector::zeros(2);
    let q_ddot = DVector::from_vec(vec![2.0, -3.0]);
    assembly.update(&q, &q_dot, &q_ddot).unwrap();

    assert!(assembly.c_a().amax() < 1e-12);
    let expected = assembly.w() * assembly.q_ddot();
    assert_dvector_near(assembly.x_ddot(), &expected, 1e-12);
    // Angular accelerations accumulate along the chain.
    assert_vector3_near(&assembly.bodies()[0].w_dot, &Vector3::new(0.0, 0.0, 2.0), 1e-12);
    assert_vector3_near(&assembly.bodies()[1].w_dot, &Vector3::new(0.0, 0.0, -1.0), 1e-12);
}

#[test]
fn test_body_acceleration_matches_finite_difference() {
    let mut assembly = two_link_arm_with_tip();
    let q = DVector::from_vec(vec![0.8, -0.5]);
    let q_dot = DVector::from_vec(vec![1.2, 0.7]);
    let q_ddot = DVector::zeros(2);
    assembly.update(&q, &q_dot, &q_ddot).unwrap();

    // Per-body accelerations are world accelerations expressed in the body
    // frame, so the check differentiates the world velocity R_0k·v_Og.
    let world_velocity: Vec<Vector3<f64>> = assembly
        .bodies()
        .iter()
        .map(|b| b.r_0k * b.v_og)
        .collect();
    let world_acceleration: Vec<Vector3<f64>> = assembly
        .bodies()
        .iter()
        .map(|b| b.r_0k * b.a_og)
        .collect();

    let dt = 1e-7;
    let q_next = assembly.integrate(&q, &q_dot, dt).unwrap();
    assembly.update(&q_next, &q_dot, &q_ddot).unwrap();
    for (k, body) in assembly.bodies().iter().enumerate() {
        let numeric = (body.r_0k * body.v_og - world_velocity[k]) / dt;
        assert_vector3_near(&numeric, &world_acceleration[k], 1e-5);
    }
}

#[test]
fn test_task_acceleration_matches_finite_difference() {
    let mut assembly = two_link_arm_with_tip();
    let q = DVector::from_vec(vec![0.8, -0.5]);
    let q_dot = DVector::from_vec(vec![1.2, 0.7]);
    let q_ddot = DVector::zeros(2);
    assembly.update(&q, &q_dot, &q_ddot).unwrap();
    let y_dot_before = assembly.y_dot().clone();
    let y_ddot = assembly.y_ddot().clone();

    // Task coordinates are world-frame, so y_ddot is the plain second
    // derivative of y along the constant-q_dot trajectory.
    let dt = 1e-7;
    let q_next = assembly.integrate(&q, &q_dot, dt).unwrap();
    assembly.update(&q_next, &q_dot, &q_ddot).unwrap();
    let numeric = (assembly.y_dot() - y_dot_before) / dt;
    assert_dvector_near(&numeric, &y_ddot, 1e-5);
}

#[test]
fn test_task_acceleration_with_joint_acceleration() {
    let mut assembly = two_link_arm_with_tip();
    let q = DVector::from_vec(vec![0.3, 0.9]);
    let q_dot = DVector::from_vec(vec![-0.4, 1.0]);
    let q_ddot = DVector::from_vec(vec![0.6, -2.0]);
    assembly.update(&q, &q_dot, &q_ddot).unwrap();

    let expected = assembly.j_dot() * assembly.q_dot() + assembly.j() * assembly.q_ddot();
    assert_dvector_near(assembly.y_ddot(), &expected, 1e-13);
}

#[test]
fn test_planar_joint_acceleration_matches_finite_difference() {
    // A planar base carrying a revolute link: translation and rotation
    // coordinates mix in the bias term.
    let bodies = vec![
        Body::new(
            0,
            Joint::PlanarXY,
            Vector3::zeros(),
            Vector3::new(0.3, 0.0, 0.0),
            Vector3::new(0.6, 0.0, 0.0),
        ),
        Body::new(
            1,
            Joint::revolute_z(),
            Vector3::new(0.6, 0.0, 0.0),
            Vector3::new(0.5, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
        ),
    ];
    let mut assembly = BodyAssembly::new(bodies).unwrap();
    let q = DVector::from_vec(vec![0.2, -0.1, 0.5, 0.8]);
    let q_dot = DVector::from_vec(vec![0.9, 0.4, -1.1, 0.7]);
    let q_ddot = DVector::zeros(4);
    assembly.update(&q, &q_dot, &q_ddot).unwrap();

    let world_velocity: Vec<Vector3<f64>> = assembly
        .bodies()
        .iter()
        .map(|b| b.r_0k * b.v_og)
        .collect();
    let world_acceleration: Vec<Vector3<f64>> = assembly
        .bodies()
        .iter()
        .map(|b| b.r_0k * b.a_og)
        .collect();

    let dt = 1e-7;
    let q_next = assembly.integrate(&q, &q_dot, dt).unwrap();
    assembly.update(&q_next, &q_dot, &q_ddot).unwrap();
    for (k, body) in assembly.bodies().iter().enumerate() {
        let numeric = (body.r_0k * body.v_og - world_velocity[k]) / dt;
        assert_vector3_near(&numeric, &world_acceleration[k], 1e-5);
    }
}

#[test]
fn test_planar_child_of_spinning_body_matches_finite_difference() {
    // A planar joint riding on a revolute root: the rotating parent drags
    // the sliding child, so the Coriolis pathway of the bias term carries
    // nonzero relative translation velocity.
    let bodies = vec![
        Body::new(
            0,
            Joint::revolute_z(),
            Vector3::zeros(),
            Vector3::new(0.3, 0.0, 0.0),
            Vector3::new(0.6, 0.0, 0.0),
        ),
        Body::new(
            1,
            Joint::PlanarXY,
            Vector3::new(0.6, 0.0, 0.0),
            Vector3::new(0.4, 0.0, 0.0),
            Vector3::new(0.8, 0.0, 0.0),
        )
        .with_op_space(
            Vector3::new(0.8, 0.0, 0.0),
            OperationalSpace::Position { axes: [true, true, false] },
        ),
    ];
    let mut assembly = BodyAssembly::new(bodies).unwrap();
    let q = DVector::from_vec(vec![0.4, 0.2, -0.1, 0.5]);
    let q_dot = DVector::from_vec(vec![0.9, 0.3, -0.4, 0.6]);
    let q_ddot = DVector::zeros(4);
    assembly.update(&q, &q_dot, &q_ddot).unwrap();

    let world_position: Vec<Vector3<f64>> = assembly
        .bodies()
        .iter()
        .map(|b| b.r_0k * b.r_og)
        .collect();
    let world_velocity: Vec<Vector3<f64>> = assembly
        .bodies()
        .iter()
        .map(|b| b.r_0k * b.v_og)
        .collect();
    let world_acceleration: Vec<Vector3<f64>> = assembly
        .bodies()
        .iter()
        .map(|b| b.r_0k * b.a_og)
        .collect();
    let y_dot_before = assembly.y_dot().clone();
    let y_ddot = assembly.y_ddot().clone();

    let dt = 1e-7;
    let q_next = assembly.integrate(&q, &q_dot, dt).unwrap();
    assembly.update(&q_next, &q_dot, &q_ddot).unwrap();
    for (k, body) in assembly.bodies().iter().enumerate() {
        // Position differences validate the velocities, velocity
        // differences the accelerations; both in world coordinates.
        let numeric_v = (body.r_0k * body.r_og - world_position[k]) / dt;
        assert_vector3_near(&numeric_v, &world_velocity[k], 1e-5);
        let numeric_a = (body.r_0k * body.v_og - world_velocity[k]) / dt;
        assert_vector3_near(&numeric_a, &world_acceleration[k], 1e-5);
    }
    let numeric_y_ddot = (assembly.y_dot() - y_dot_before) / dt;
    assert_dvector_near(&numeric_y_ddot, &y_ddot, 1e-5);
}
