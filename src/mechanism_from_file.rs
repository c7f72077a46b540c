//! Loads a mechanism description (links, joints, operational-space points
//! and cable routing) from a YAML file (optional feature).

use std::path::Path;
use yaml_rust2::{Yaml, YamlLoader};

use crate::assembly::BodyAssembly;
use crate::body::Body;
use crate::cables::{Cable, CableSegment, CableSystem};
use crate::joint::Joint;
use crate::kinematics_error::KinematicsError;
use crate::op_space::OperationalSpace;
use nalgebra::{Unit, Vector3};

/// Read a mechanism description from a YAML file. A file like this is
/// supported:
/// ```yaml
/// links:
///   - parent: 0
///     joint: { type: revolute, axis: [0.0, 0.0, 1.0] }
///     r_parent: [0.0, 0.0, 0.0]
///     r_g:  [0.5, 0.0, 0.0]
///     r_pe: [1.0, 0.0, 0.0]
///     op_space: { type: position, axes: [x, y], r_y: [1.0, 0.0, 0.0] }
/// cables:
///   - segments:
///       - { link: 0, point: [0.0, 0.0, 2.0] }
///       - { link: 1, point: [1.0, 0.0, 0.0] }
/// ```
/// Joint types: `revolute`, `prismatic` (both take an optional `axis`,
/// default z), `planar` (XY plane) and `spherical`. Offsets default to zero
/// vectors; `cables` may be omitted entirely. Any other joint or
/// operational-space type tag fails with an unsupported-capability error
/// before an assembly is constructed.
pub fn from_yaml_file<P: AsRef<Path>>(
    path: P,
) -> Result<(BodyAssembly, CableSystem), KinematicsError> {
    let contents = std::fs::read_to_string(path)?;
    from_yaml_str(&contents)
}

/// Same as [`from_yaml_file`], parsing the description from a string.
pub fn from_yaml_str(text: &str) -> Result<(BodyAssembly, CableSystem), KinematicsError> {
    let docs = YamlLoader::load_from_str(text)
        .map_err(|e| KinematicsError::ParseError(format!("{}", e)))?;
    let doc = docs
        .first()
        .ok_or_else(|| KinematicsError::ParseError("empty YAML document".to_string()))?;

    let links = doc["links"]
        .as_vec()
        .ok_or_else(|| KinematicsError::MissingField("links".to_string()))?;
    let mut bodies = Vec::with_capacity(links.len());
    for (idx, link) in links.iter().enumerate() {
        bodies.push(parse_link(idx + 1, link)?);
    }
    let num_links = bodies.len();
    let assembly = BodyAssembly::new(bodies)?;

    let mut cables = Vec::new();
    if !doc["cables"].is_badvalue() {
        let list = doc["cables"]
            .as_vec()
            .ok_or_else(|| KinematicsError::ParseError("cables must be a list".to_string()))?;
        for (idx, cable) in list.iter().enumerate() {
            cables.push(parse_cable(idx, cable, num_links)?);
        }
    }

    Ok((assembly, CableSystem::new(cables)))
}

fn parse_link(id: usize, yaml: &Yaml) -> Result<Body, KinematicsError> {
    let parent = yaml["parent"]
        .as_i64()
        .ok_or_else(|| KinematicsError::MissingField(format!("links[{}].parent", id - 1)))?;
    if parent < 0 {
        return Err(KinematicsError::ParseError(format!(
            "links[{}].parent must be non-negative (got {})",
            id - 1,
            parent
        )));
    }

    let joint = parse_joint(id, &yaml["joint"])?;
    let r_parent = vector3_or_zero(&yaml["r_parent"], &format!("links[{}].r_parent", id - 1))?;
    let r_g = vector3_or_zero(&yaml["r_g"], &format!("links[{}].r_g", id - 1))?;
    let r_pe = vector3_or_zero(&yaml["r_pe"], &format!("links[{}].r_pe", id - 1))?;

    let mut body = Body::new(parent as usize, joint, r_parent, r_g, r_pe);
    if !yaml["op_space"].is_badvalue() {
        let (r_y, map) = parse_op_space(id, &yaml["op_space"])?;
        body = body.with_op_space(r_y, map);
    }
    Ok(body)
}

fn parse_joint(id: usize, yaml: &Yaml) -> Result<Joint, KinematicsError> {
    let tag = yaml["type"]
        .as_str()
        .ok_or_else(|| KinematicsError::MissingField(format!("links[{}].joint.type", id - 1)))?;
    let axis = if yaml["axis"].is_badvalue() {
        Vector3::z()
    } else {
        parse_vector3(&yaml["axis"], &format!("links[{}].joint.axis", id - 1))?
    };
    match tag {
        "revolute" => Ok(Joint::Revolute { axis: Unit::new_normalize(axis) }),
        "prismatic" => Ok(Joint::Prismatic { axis: Unit::new_normalize(axis) }),
        "planar" => Ok(Joint::PlanarXY),
        "spherical" => Ok(Joint::Spherical),
        other => Err(KinematicsError::UnsupportedCapability(format!(
            "joint type '{}'",
            other
        ))),
    }
}

fn parse_op_space(
    id: usize,
    yaml: &Yaml,
) -> Result<(Vector3<f64>, OperationalSpace), KinematicsError> {
    let tag = yaml["type"].as_str().ok_or_else(|| {
        KinematicsError::MissingField(format!("links[{}].op_space.type", id - 1))
    })?;
    let axes = parse_axes(id, &yaml["axes"])?;
    let r_y = vector3_or_zero(&yaml["r_y"], &format!("links[{}].op_space.r_y", id - 1))?;
    match tag {
        "position" => Ok((r_y, OperationalSpace::Position { axes })),
        "orientation" => Ok((r_y, OperationalSpace::Orientation { axes })),
        other => Err(KinematicsError::UnsupportedCapability(format!(
            "operational space type '{}'",
            other
        ))),
    }
}

/// Axis selection like `[x, z]`; omitted means all three.
fn parse_axes(id: usize, yaml: &Yaml) -> Result<[bool; 3], KinematicsError> {
    if yaml.is_badvalue() {
        return Ok([true, true, true]);
    }
    let list = yaml.as_vec().ok_or_else(|| {
        KinematicsError::ParseError(format!("links[{}].op_space.axes must be a list", id - 1))
    })?;
    let mut axes = [false; 3];
    for entry in list {
        match entry.as_str() {
            Some("x") => axes[0] = true,
            Some("y") => axes[1] = true,
            Some("z") => axes[2] = true,
            _ => {
                return Err(KinematicsError::ParseError(format!(
                    "links[{}].op_space.axes entries must be x, y or z",
                    id - 1
                )));
            }
        }
    }
    Ok(axes)
}

fn parse_cable(idx: usize, yaml: &Yaml, num_links: usize) -> Result<Cable, KinematicsError> {
    let list = yaml["segments"]
        .as_vec()
        .ok_or_else(|| KinematicsError::MissingField(format!("cables[{}].segments", idx)))?;
    if list.len() < 2 {
        return Err(KinematicsError::ParseError(format!(
            "cables[{}] needs at least two attachment points",
            idx
        )));
    }
    let mut segments = Vec::with_capacity(list.len());
    for segment in list {
        let link = segment["link"]
            .as_i64()
            .ok_or_else(|| KinematicsError::MissingField(format!("cables[{}].segments.link", idx)))?;
        if link < 0 || link as usize > num_links {
            return Err(KinematicsError::MissingBody(link.max(0) as usize));
        }
        let point = parse_vector3(&segment["point"], &format!("cables[{}].segments.point", idx))?;
        segments.push(CableSegment { link: link as usize, point });
    }
    Ok(Cable { segments })
}

fn vector3_or_zero(yaml: &Yaml, field: &str) -> Result<Vector3<f64>, KinematicsError> {
    if yaml.is_badvalue() {
        return Ok(Vector3::zeros());
    }
    parse_vector3(yaml, field)
}

fn parse_vector3(yaml: &Yaml, field: &str) -> Result<Vector3<f64>, KinematicsError> {
    let list = yaml.as_vec().ok_or_else(|| {
        KinematicsError::ParseError(format!("{} must be a list", field))
    })?;
    if list.len() != 3 {
        return Err(KinematicsError::InvalidLength {
            field: field.to_string(),
            expected: 3,
            found: list.len(),
        });
    }
    let mut v = Vector3::zeros();
    for (i, entry) in list.iter().enumerate() {
        v[i] = as_float(entry).ok_or_else(|| {
            KinematicsError::ParseError(format!("{} entries must be numeric", field))
        })?;
    }
    Ok(v)
}

// YAML scalars may come in as integers or reals.
fn as_float(yaml: &Yaml) -> Option<f64> {
    yaml.as_f64().or_else(|| yaml.as_i64().map(|i| i as f64))
}
