//! Error handling for assembly construction, update preconditions and
//! mechanism description loading.

use std::io;

/// Unified error for the kinematic core and the mechanism loader.
/// Everything here is fatal: there is no recoverable path inside `update`,
/// a failure is a precondition violation.
#[derive(Debug)]
pub enum KinematicsError {
    /// Parent link index is not strictly less than the child index, so the
    /// body numbering does not respect a topological order.
    Topology { parent: usize, child: usize },
    /// A body or cable references a link id that does not exist.
    MissingBody(usize),
    /// An input vector does not match the sum of per-body requirements.
    Dimension { what: &'static str, expected: usize, found: usize },
    /// A joint or operational-space type tag is not recognized by the loader.
    UnsupportedCapability(String),
    IoError(io::Error),
    ParseError(String),
    MissingField(String),
    InvalidLength { field: String, expected: usize, found: usize },
}

impl std::fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            KinematicsError::Topology { parent, child } =>
                write!(f, "Topology Error: parent link {} must come before child link {}", parent, child),
            KinematicsError::MissingBody(ref id) =>
                write!(f, "Missing Body: link {} is not part of the assembly", id),
            KinematicsError::Dimension { what, expected, found } =>
                write!(f, "Dimension Error: {} must have length {}, got {}", what, expected, found),
            KinematicsError::UnsupportedCapability(ref tag) =>
                write!(f, "Unsupported Capability: {}", tag),
            KinematicsError::IoError(ref err) =>
                write!(f, "IO Error: {}", err),
            KinematicsError::ParseError(ref msg) =>
                write!(f, "Parse Error: {}", msg),
            KinematicsError::MissingField(ref field) =>
                write!(f, "Missing Field: {}", field),
            KinematicsError::InvalidLength { ref field, expected, found } =>
                write!(f, "Invalid Length: {} expected {} values, found {}", field, expected, found),
        }
    }
}

impl std::error::Error for KinematicsError {}

impl From<io::Error> for KinematicsError {
    fn from(err: io::Error) -> Self {
        KinematicsError::IoError(err)
    }
}
