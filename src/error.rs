//! Error types shared by the scene builder and inspector

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which descriptor grammar a malformed input violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    Root,
    Node,
    Script,
    SubResource,
    Connection,
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DescriptorKind::Root => "root",
            DescriptorKind::Node => "node",
            DescriptorKind::Script => "script",
            DescriptorKind::SubResource => "sub-resource",
            DescriptorKind::Connection => "connection",
        };
        f.write_str(name)
    }
}

/// A reference the inspector could not resolve.
///
/// The permissive inspector absorbs these: an unknown script id leaves the
/// script unset and an unknown parent path drops the node from the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnresolvedReference {
    /// `script = ExtResource(id)` named an id missing from the resource table
    Script { node: String, id: String },
    /// A node's `parent` did not match any previously registered path
    Parent { node: String, parent: String },
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReference::Script { node, id } => {
                write!(f, "node '{}' references unknown external resource '{}'", node, id)
            }
            UnresolvedReference::Parent { node, parent } => {
                write!(f, "node '{}' has unresolved parent path '{}'", node, parent)
            }
        }
    }
}

/// Errors raised while building or inspecting a scene document
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SceneError {
    /// A caller-supplied descriptor violates its field-count grammar
    #[error("malformed {kind} descriptor '{descriptor}': {reason}")]
    MalformedSpecification { kind: DescriptorKind, descriptor: String, reason: String },
    /// No candidate path for the requested file exists
    #[error("file not found: {} (tried {})", .path.display(), .tried)]
    NotFound { path: PathBuf, tried: TriedPaths },
    /// Reading or writing an existing path failed
    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Strict inspection refused an unresolved reference
    #[error("unresolved reference: {0}")]
    Unresolved(UnresolvedReference),
}

impl SceneError {
    pub(crate) fn malformed(
        kind: DescriptorKind,
        descriptor: &str,
        reason: impl Into<String>,
    ) -> Self {
        SceneError::MalformedSpecification {
            kind,
            descriptor: descriptor.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SceneError::Io { path: path.into(), source }
    }
}

/// Candidate paths checked before giving up on a lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriedPaths(pub Vec<PathBuf>);

impl fmt::Display for TriedPaths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("no candidates");
        }
        let joined = self.0.iter().map(|p| p.display().to_string()).collect::<Vec<_>>();
        f.write_str(&joined.join(", "))
    }
}
