//! Operational-space capability: extracts a task-space coordinate vector
//! from a body's absolute pose and supplies the fixed 0/1 selection matrix
//! picking which of the body's 6 spatial components the task uses.

use nalgebra::{DMatrix, DVector, Rotation3, Vector3};

/// Task-space coordinate declared on a body. At most one per body.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationalSpace {
    /// World-frame Cartesian position of the operational point; `axes`
    /// selects which of x/y/z participate.
    Position { axes: [bool; 3] },
    /// World-frame orientation of the body as rotation-vector components.
    /// The velocity rows selected by this variant carry the world angular
    /// velocity, which matches the rotation-vector derivative only
    /// instantaneously; position rows are exact.
    Orientation { axes: [bool; 3] },
}

impl OperationalSpace {
    /// Position task over all three axes.
    pub fn full_position() -> Self {
        OperationalSpace::Position { axes: [true, true, true] }
    }

    /// Number of task-space coordinates this map contributes.
    pub fn num_dofs(&self) -> usize {
        match self {
            OperationalSpace::Position { axes } | OperationalSpace::Orientation { axes } => {
                axes.iter().filter(|&&a| a).count()
            }
        }
    }

    /// Extract the task coordinates from the body's absolute pose. `point`
    /// is the operational point `r_Oy` in the body frame, `rotation` is
    /// the body's absolute rotation `R_0k`.
    pub fn extract(&self, point: &Vector3<f64>, rotation: &Rotation3<f64>) -> DVector<f64> {
        match self {
            OperationalSpace::Position { axes } => {
                let world = rotation * point;
                select(axes, &world)
            }
            OperationalSpace::Orientation { axes } => {
                let rotation_vector = rotation.scaled_axis();
                select(axes, &rotation_vector)
            }
        }
    }

    /// Fixed 0/1 selection matrix (`num_dofs() × 6`) picking task rows out
    /// of the `[v; w]` spatial stacking: positions select linear rows,
    /// orientations angular rows.
    pub fn selection_matrix(&self) -> DMatrix<f64> {
        let (axes, offset) = match self {
            OperationalSpace::Position { axes } => (axes, 0),
            OperationalSpace::Orientation { axes } => (axes, 3),
        };
        let mut t = DMatrix::zeros(self.num_dofs(), 6);
        let mut row = 0;
        for (i, &active) in axes.iter().enumerate() {
            if active {
                t[(row, offset + i)] = 1.0;
                row += 1;
            }
        }
        t
    }
}

fn select(axes: &[bool; 3], v: &Vector3<f64>) -> DVector<f64> {
    let values: Vec<f64> = axes
        .iter()
        .enumerate()
        .filter(|&(_, &active)| active)
        .map(|(i, _)| v[i])
        .collect();
    DVector::from_vec(values)
}
