//! Cable kinematics on top of the body assembly: straight-line cable
//! segments between attachment points on the ground and on links, their
//! total lengths, and the cable Jacobian `L` mapping generalized velocities
//! to cable length rates (`l_dot = L·q_dot`).

use crate::assembly::BodyAssembly;
use crate::kinematics_error::KinematicsError;
use crate::utils::skew;
use nalgebra::{DMatrix, DVector, Matrix3, Vector3};

/// One cable attachment. Points on a link are given in that link's body
/// frame as an offset from the link's joint; ground attachments (link 0)
/// are world-frame anchor points.
#[derive(Debug, Clone)]
pub struct CableSegment {
    /// Link id the point is attached to, 0 for the ground.
    pub link: usize,
    /// Attachment point (body frame for links, world frame for ground).
    pub point: Vector3<f64>,
}

/// A cable routed through two or more attachment points; consecutive pairs
/// form straight segments. The cable length is the sum of segment lengths.
#[derive(Debug, Clone)]
pub struct Cable {
    pub segments: Vec<CableSegment>,
}

/// The full cable arrangement of a mechanism.
#[derive(Debug, Clone)]
pub struct CableSystem {
    pub cables: Vec<Cable>,
}

impl CableSystem {
    pub fn new(cables: Vec<Cable>) -> Self {
        CableSystem { cables }
    }

    pub fn num_cables(&self) -> usize {
        self.cables.len()
    }

    /// World-frame position of an attachment for the assembly's current pose.
    fn world_point(
        assembly: &BodyAssembly,
        segment: &CableSegment,
    ) -> Result<Vector3<f64>, KinematicsError> {
        if segment.link == 0 {
            return Ok(segment.point);
        }
        let body = assembly
            .body(segment.link)
            .ok_or(KinematicsError::MissingBody(segment.link))?;
        Ok(body.r_0k * (body.r_op + segment.point))
    }

    /// Total length of every cable for the assembly's current pose.
    pub fn lengths(&self, assembly: &BodyAssembly) -> Result<DVector<f64>, KinematicsError> {
        let mut lengths = DVector::zeros(self.cables.len());
        for (i, cable) in self.cables.iter().enumerate() {
            for pair in cable.segments.windows(2) {
                let from = Self::world_point(assembly, &pair[0])?;
                let to = Self::world_point(assembly, &pair[1])?;
                lengths[i] += (to - from).norm();
            }
        }
        Ok(lengths)
    }

    /// Cable Jacobian `L = V·W` (num_cables × num_dofs): `V` maps the
    /// stacked body-frame spatial velocities to segment length rates. An
    /// attachment on link k moving with world velocity
    /// `R_0k·[I | -skew(r_oa - r_og)]·[v_og; w]` contributes its projection
    /// on the segment direction, with opposite signs at the two ends.
    pub fn jacobian(&self, assembly: &BodyAssembly) -> Result<DMatrix<f64>, KinematicsError> {
        let v = self.velocity_projection(assembly)?;
        Ok(v * assembly.w())
    }

    /// Length rates for the assembly's current coordinates: `L·q_dot`.
    pub fn length_rates(&self, assembly: &BodyAssembly) -> Result<DVector<f64>, KinematicsError> {
        Ok(self.jacobian(assembly)? * assembly.q_dot())
    }

    fn velocity_projection(
        &self,
        assembly: &BodyAssembly,
    ) -> Result<DMatrix<f64>, KinematicsError> {
        let mut v = DMatrix::zeros(self.cables.len(), 6 * assembly.num_links());
        for (i, cable) in self.cables.iter().enumerate() {
            for pair in cable.segments.windows(2) {
                let from = Self::world_point(assembly, &pair[0])?;
                let to = Self::world_point(assembly, &pair[1])?;
                let length = (to - from).norm();
                if length == 0.0 {
                    continue; // degenerate segment contributes no direction
                }
                let direction = (to - from) / length;
                // Receding "to" end lengthens the segment, "from" shortens.
                Self::accumulate(&mut v, i, assembly, &pair[1], &direction, 1.0)?;
                Self::accumulate(&mut v, i, assembly, &pair[0], &direction, -1.0)?;
            }
        }
        Ok(v)
    }

    fn accumulate(
        v: &mut DMatrix<f64>,
        row: usize,
        assembly: &BodyAssembly,
        segment: &CableSegment,
        direction: &Vector3<f64>,
        sign: f64,
    ) -> Result<(), KinematicsError> {
        if segment.link == 0 {
            return Ok(()); // ground anchors do not move
        }
        let body = assembly
            .body(segment.link)
            .ok_or(KinematicsError::MissingBody(segment.link))?;
        let r_oa = body.r_op + segment.point;
        let u_body = body.r_0k.inverse() * (sign * direction);
        let angular: Matrix3<f64> = -skew(&(r_oa - body.r_og));
        let k = segment.link - 1;
        let mut linear_cols = v.view_mut((row, 6 * k), (1, 3));
        linear_cols += u_body.transpose();
        let mut angular_cols = v.view_mut((row, 6 * k + 3), (1, 3));
        angular_cols += u_body.transpose() * angular;
        Ok(())
    }
}
