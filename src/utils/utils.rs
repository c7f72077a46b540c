//! Helper functions

use nalgebra::{DVector, Matrix3, Vector3};

/// Cross-product (skew-symmetric) matrix of a vector: `skew(v) * u == v × u`.
pub fn skew(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(
        0.0, -v.z, v.y,
        v.z, 0.0, -v.x,
        -v.y, v.x, 0.0,
    )
}

/// Print a generalized coordinate vector on one line.
#[allow(dead_code)]
pub fn dump_coordinates(label: &str, q: &DVector<f64>) {
    let mut row_str = String::new();
    for value in q.iter() {
        row_str.push_str(&format!("{:8.4} ", value));
    }
    println!("{}: [{}]", label, row_str.trim_end());
}

/// Print a Cartesian vector on one line.
#[allow(dead_code)]
pub fn dump_point(label: &str, p: &Vector3<f64>) {
    println!("{}: [{:8.4} {:8.4} {:8.4}]", label, p.x, p.y, p.z);
}
