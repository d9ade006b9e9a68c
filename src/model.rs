//! Scene document model shared by the builder and the inspector
//!
//! A scene document is a flat, ordered list of records: a header, external
//! resources, sub-resources, nodes (root first) and connections. Parent
//! relationships are encoded as path strings rather than nesting.
//!
//! # Path rules
//!
//! - The root's path token is `"."`.
//! - A direct child of the root has parent path `"."`.
//! - Deeper descendants use the slash-joined chain of ancestor names starting
//!   one level under the root, e.g. `"Body/Sprite"`.
//! - A connection endpoint equal to the root's name is written as `"."`.

use serde::Serialize;

/// Path token addressing the root node
pub const ROOT_PATH: &str = ".";

/// Default `format=` marker written in the document header
pub const DEFAULT_FORMAT: u32 = 3;

/// Default external resource type for script attachments
pub const DEFAULT_SCRIPT_TYPE: &str = "Script";

/// Type recorded for an external resource whose `type` attribute is absent
pub const GENERIC_RESOURCE_TYPE: &str = "Resource";

/// Normalize a connection endpoint: the root's own name becomes `"."`.
pub fn normalize_endpoint<'a>(endpoint: &'a str, root_name: &str) -> &'a str {
    if endpoint == root_name {
        ROOT_PATH
    } else {
        endpoint
    }
}

/// Path key under which a node is registered, given its parent's key.
///
/// Children of the root are keyed by their bare name.
pub fn child_path_key(parent_key: &str, name: &str) -> String {
    if parent_key == ROOT_PATH {
        name.to_string()
    } else {
        format!("{}/{}", parent_key, name)
    }
}

/// A reference to content stored outside the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalResource {
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub path: String,
}

/// A resource defined inline in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubResource {
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Property name to literal value, in declaration order. Values are
    /// stored verbatim and never type-checked.
    pub properties: Vec<(String, String)>,
}

/// A node record as it appears in the flat serialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    /// Raw `parent` attribute; `None` marks the root record
    pub parent: Option<String>,
    /// External resource id of the attached script
    pub script: Option<String>,
}

impl NodeRecord {
    /// The parent path, with an absent attribute read as `"."`.
    pub fn parent_or_root(&self) -> &str {
        self.parent.as_deref().unwrap_or(ROOT_PATH)
    }
}

/// A signal-to-method wiring between two addressed nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub signal: String,
    pub from: String,
    pub to: String,
    pub method: String,
}

/// A complete scene document ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneDocument {
    pub format: u32,
    pub ext_resources: Vec<ExternalResource>,
    pub sub_resources: Vec<SubResource>,
    /// Root first, then descendants in declaration order
    pub nodes: Vec<NodeRecord>,
    pub connections: Vec<Connection>,
}

impl SceneDocument {
    /// Number of load steps: every resource plus the scene itself.
    ///
    /// Always derived from the resource lists, never stored.
    pub fn load_steps(&self) -> usize {
        self.ext_resources.len() + self.sub_resources.len() + 1
    }

    pub fn root(&self) -> Option<&NodeRecord> {
        self.nodes.first()
    }

    /// Nodes after the root, in declaration order
    pub fn children(&self) -> &[NodeRecord] {
        self.nodes.get(1..).unwrap_or(&[])
    }
}
