use nalgebra::{DVector, Vector3};
use rs_cdpr_kinematics::assembly::BodyAssembly;
use rs_cdpr_kinematics::body::Body;
use rs_cdpr_kinematics::cables::{Cable, CableSegment, CableSystem};
use rs_cdpr_kinematics::joint::Joint;
use rs_cdpr_kinematics::op_space::OperationalSpace;
use rs_cdpr_kinematics::utils::{dump_coordinates, dump_point};

/// Usage example: a planar two-link arm driven by two cables.
fn main() -> anyhow::Result<()> {
    // Two revolute links of length 1; the operational point is the tip of
    // the second link, tracked in x and y.
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
    let mut assembly = BodyAssembly::new(bodies)?;

    // Two cables from overhead anchors to the elbow and the tip.
    let cables = CableSystem::new(vec![
        Cable {
            segments: vec![
                CableSegment { link: 0, point: Vector3::new(-1.0, 0.0, 2.0) },
                CableSegment { link: 1, point: Vector3::new(1.0, 0.0, 0.0) },
            ],
        },
        Cable {
            segments: vec![
                CableSegment { link: 0, point: Vector3::new(2.0, 0.0, 2.0) },
                CableSegment { link: 2, point: Vector3::new(1.0, 0.0, 0.0) },
            ],
        },
    ]);

    let q = DVector::from_vec(vec![0.4, -0.3]);
    let q_dot = DVector::from_vec(vec![1.0, 0.5]);
    let q_ddot = DVector::from_vec(vec![0.0, 0.0]);
    assembly.update(&q, &q_dot, &q_ddot)?;

    println!("Two-link cable-driven arm at q = (0.4, -0.3):");
    for (k, body) in assembly.bodies().iter().enumerate() {
        dump_point(&format!("  link {} end (world)", k + 1), &(body.r_0k * body.r_ope));
    }
    dump_coordinates("  task coordinates y", assembly.y());
    dump_coordinates("  task velocity y_dot", assembly.y_dot());
    dump_coordinates("  cable lengths", &cables.lengths(&assembly)?);
    dump_coordinates("  cable length rates", &cables.length_rates(&assembly)?);

    // Integrate the coordinates forward for a second and look again.
    let mut q = q;
    for _ in 0..100 {
        q = assembly.integrate(&q, &q_dot, 0.01)?;
        assembly.update(&q, &q_dot, &q_ddot)?;
    }
    println!("After one second at constant joint velocity:");
    dump_coordinates("  q", assembly.q());
    dump_coordinates("  cable lengths", &cables.lengths(&assembly)?);

    Ok(())
}
