//! Scene document construction from flat descriptors
//!
//! [`SceneBuilder`] collects a root, child nodes, script attachments,
//! sub-resources and connections, assigns identifiers, and produces a
//! [`SceneDocument`]. No ancestor resolution happens here: parent fields are
//! written exactly as given and connection endpoints are only rewritten when
//! they name the root.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::descriptor::{
    parse_connection, parse_node, parse_root, parse_script, parse_sub_resource, ConnectionSpec,
    NodeSpec, ScriptSpec, SubResourceSpec,
};
use crate::error::SceneError;
use crate::ids::IdGenerator;
use crate::model::{
    normalize_endpoint, Connection, ExternalResource, NodeRecord, SceneDocument, SubResource,
    DEFAULT_FORMAT, DEFAULT_SCRIPT_TYPE, ROOT_PATH,
};
use crate::writer::write_scene;

/// Counts reported after a successful build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub root: String,
    /// Child nodes, root excluded
    pub nodes: usize,
    /// Script mapping entries
    pub scripts: usize,
    pub connections: usize,
    pub load_steps: usize,
}

impl BuildSummary {
    fn of(doc: &SceneDocument) -> Self {
        Self {
            root: doc.root().map(|r| r.name.clone()).unwrap_or_default(),
            nodes: doc.children().len(),
            scripts: doc.ext_resources.len(),
            connections: doc.connections.len(),
            load_steps: doc.load_steps(),
        }
    }
}

/// Builds one scene document.
#[derive(Debug)]
pub struct SceneBuilder {
    root: NodeSpec,
    nodes: Vec<NodeSpec>,
    scripts: Vec<ScriptSpec>,
    sub_resources: Vec<SubResourceSpec>,
    connections: Vec<ConnectionSpec>,
    format: u32,
    script_type: String,
    ids: IdGenerator,
}

impl SceneBuilder {
    /// Create a builder for a scene with the given root.
    pub fn new(root: NodeSpec) -> Self {
        Self {
            root,
            nodes: Vec::new(),
            scripts: Vec::new(),
            sub_resources: Vec::new(),
            connections: Vec::new(),
            format: DEFAULT_FORMAT,
            script_type: DEFAULT_SCRIPT_TYPE.to_string(),
            ids: IdGenerator::new(),
        }
    }

    /// Parse every descriptor up front.
    ///
    /// The first malformed descriptor aborts with
    /// [`SceneError::MalformedSpecification`] before anything is built.
    pub fn from_descriptors<S: AsRef<str>>(
        root: &str,
        nodes: &[S],
        scripts: &[S],
        sub_resources: &[S],
        connections: &[S],
    ) -> Result<Self, SceneError> {
        let root = parse_root(root)?;
        if let Some(parent) = &root.parent {
            log::warn!("ignoring parent '{}' on root node '{}'", parent, root.name);
        }

        let mut builder = Self::new(root);
        for n in nodes {
            builder.nodes.push(parse_node(n.as_ref())?);
        }
        for s in scripts {
            builder.scripts.push(parse_script(s.as_ref())?);
        }
        for s in sub_resources {
            builder.sub_resources.push(parse_sub_resource(s.as_ref())?);
        }
        for c in connections {
            builder.connections.push(parse_connection(c.as_ref())?);
        }
        Ok(builder)
    }

    pub fn with_node(mut self, node: NodeSpec) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_script(mut self, script: ScriptSpec) -> Self {
        self.scripts.push(script);
        self
    }

    pub fn with_sub_resource(mut self, sub: SubResourceSpec) -> Self {
        self.sub_resources.push(sub);
        self
    }

    pub fn with_connection(mut self, conn: ConnectionSpec) -> Self {
        self.connections.push(conn);
        self
    }

    /// Set the `format=` marker written in the header.
    pub fn with_format(mut self, format: u32) -> Self {
        self.format = format;
        self
    }

    /// Set the external resource type used for script attachments.
    pub fn with_script_type(mut self, script_type: &str) -> Self {
        self.script_type = script_type.to_string();
        self
    }

    /// Replace the identifier generator (e.g. with a seeded one).
    pub fn with_id_generator(mut self, ids: IdGenerator) -> Self {
        self.ids = ids;
        self
    }

    /// Assemble the document.
    ///
    /// Script mappings behave like an insertion-ordered map keyed by node
    /// name: a later entry for the same name replaces the path but keeps the
    /// first entry's position. Every entry becomes one external resource in
    /// that order, including entries naming no node, so they still count
    /// toward `load_steps`.
    pub fn build(mut self) -> SceneDocument {
        let mut mapping: Vec<(&str, &str)> = Vec::new();
        for s in &self.scripts {
            match mapping.iter_mut().find(|(node, _)| *node == s.node) {
                Some(entry) => entry.1 = s.path.as_str(),
                None => mapping.push((s.node.as_str(), s.path.as_str())),
            }
        }

        let all_nodes: Vec<&NodeSpec> = std::iter::once(&self.root).chain(&self.nodes).collect();

        let mut ext_resources = Vec::with_capacity(mapping.len());
        let mut id_for_node: HashMap<&str, String> = HashMap::new();
        for (node, path) in mapping {
            if !all_nodes.iter().any(|n| n.name == node) {
                log::warn!("script '{}' names unknown node '{}'", path, node);
            }
            let id = self.ids.next_ext_id();
            log::debug!("assigned external resource id {} to {}", id, path);
            ext_resources.push(ExternalResource {
                id: id.clone(),
                resource_type: self.script_type.clone(),
                path: path.to_string(),
            });
            id_for_node.insert(node, id);
        }

        let nodes = all_nodes
            .iter()
            .enumerate()
            .map(|(i, spec)| NodeRecord {
                name: spec.name.clone(),
                node_type: spec.node_type.clone(),
                parent: if i == 0 {
                    None
                } else {
                    Some(spec.parent.clone().unwrap_or_else(|| ROOT_PATH.to_string()))
                },
                script: id_for_node.get(spec.name.as_str()).cloned(),
            })
            .collect();

        let sub_resources = self
            .sub_resources
            .iter()
            .map(|sub| {
                let id = self.ids.next_sub_id();
                log::debug!("assigned sub-resource id {} to {}", id, sub.resource_type);
                SubResource {
                    id,
                    resource_type: sub.resource_type.clone(),
                    properties: sub.properties.clone(),
                }
            })
            .collect();

        let root_name = self.root.name.as_str();
        let connections = self
            .connections
            .iter()
            .map(|c| Connection {
                signal: c.signal.clone(),
                from: normalize_endpoint(&c.from, root_name).to_string(),
                to: normalize_endpoint(&c.to, root_name).to_string(),
                method: c.method.clone(),
            })
            .collect();

        SceneDocument {
            format: self.format,
            ext_resources,
            sub_resources,
            nodes,
            connections,
        }
    }

    /// Build and render the document without touching the filesystem.
    pub fn render(self) -> (String, BuildSummary) {
        let doc = self.build();
        (write_scene(&doc), BuildSummary::of(&doc))
    }

    /// Build the document and write it to `path`.
    ///
    /// The text is produced in full before any filesystem change. Missing
    /// parent directories are created and an existing file is overwritten.
    pub fn write_to(self, path: &Path) -> Result<BuildSummary, SceneError> {
        let (text, summary) = self.render();
        write_document(path, &text)?;
        Ok(summary)
    }
}

fn write_document(path: &Path, text: &str) -> Result<(), SceneError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| SceneError::io(parent, e))?;
    }
    let mut file = File::create(path).map_err(|e| SceneError::io(path, e))?;
    file.write_all(text.as_bytes()).map_err(|e| SceneError::io(path, e))?;
    Ok(())
}

/// Resolve the output path for a build, appending `extension` when the
/// given path has none.
pub fn output_path(path: &Path, extension: &str) -> PathBuf {
    if path.extension().is_none() {
        path.with_extension(extension)
    } else {
        path.to_path_buf()
    }
}
