//! Parsers for the colon-delimited descriptors accepted by `scn build`
//!
//! | Descriptor   | Grammar                              |
//! |--------------|--------------------------------------|
//! | node / root  | `name:type` or `name:type:parent`    |
//! | script       | `name=resourcePath`                  |
//! | sub-resource | `type` or `type:key=value,key=value` |
//! | connection   | `from:signal:to:method`              |
//!
//! Only field counts are checked. Names, types and values are kept verbatim.

use crate::error::{DescriptorKind, SceneError};

/// A node to place in the scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub name: String,
    pub node_type: String,
    /// Raw parent field, emitted verbatim when present
    pub parent: Option<String>,
}

/// A script attachment: node name to resource path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSpec {
    pub node: String,
    pub path: String,
}

/// An inline resource with its properties in caller order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubResourceSpec {
    pub resource_type: String,
    pub properties: Vec<(String, String)>,
}

/// A signal connection between two node paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSpec {
    pub from: String,
    pub signal: String,
    pub to: String,
    pub method: String,
}

/// Parse a node descriptor: `name:type` or `name:type:parent`.
///
/// Fields past the parent are ignored.
pub fn parse_node(s: &str) -> Result<NodeSpec, SceneError> {
    parse_node_as(s, DescriptorKind::Node)
}

/// Parse the root descriptor. Same grammar as a node; a parent field is
/// accepted but has no meaning for the root.
pub fn parse_root(s: &str) -> Result<NodeSpec, SceneError> {
    parse_node_as(s, DescriptorKind::Root)
}

fn parse_node_as(s: &str, kind: DescriptorKind) -> Result<NodeSpec, SceneError> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() < 2 {
        return Err(SceneError::malformed(kind, s, "expected name:type or name:type:parent"));
    }
    Ok(NodeSpec {
        name: parts[0].to_string(),
        node_type: parts[1].to_string(),
        parent: parts.get(2).map(|p| p.to_string()),
    })
}

/// Parse a script descriptor: `name=resourcePath`.
pub fn parse_script(s: &str) -> Result<ScriptSpec, SceneError> {
    match s.split_once('=') {
        Some((node, path)) => Ok(ScriptSpec { node: node.to_string(), path: path.to_string() }),
        None => Err(SceneError::malformed(
            DescriptorKind::Script,
            s,
            "expected name=resourcePath",
        )),
    }
}

/// Parse a sub-resource descriptor: `type` optionally followed by
/// `:key=value,key2=value2`.
///
/// Empty pairs (from trailing commas) are skipped. A pair without `=` is
/// rejected.
pub fn parse_sub_resource(s: &str) -> Result<SubResourceSpec, SceneError> {
    let (resource_type, props) = match s.split_once(':') {
        Some((t, rest)) => (t, Some(rest)),
        None => (s, None),
    };

    let mut properties = Vec::new();
    if let Some(props) = props {
        for pair in props.split(',') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                SceneError::malformed(
                    DescriptorKind::SubResource,
                    s,
                    format!("property '{}' is missing '='", pair),
                )
            })?;
            properties.push((key.to_string(), value.to_string()));
        }
    }

    Ok(SubResourceSpec { resource_type: resource_type.to_string(), properties })
}

/// Parse a connection descriptor: exactly `from:signal:to:method`.
pub fn parse_connection(s: &str) -> Result<ConnectionSpec, SceneError> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 4 {
        return Err(SceneError::malformed(
            DescriptorKind::Connection,
            s,
            format!("expected from:signal:to:method, got {} field(s)", parts.len()),
        ));
    }
    Ok(ConnectionSpec {
        from: parts[0].to_string(),
        signal: parts[1].to_string(),
        to: parts[2].to_string(),
        method: parts[3].to_string(),
    })
}
