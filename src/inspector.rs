//! Scene document inspection
//!
//! Reads a scene document in a single forward pass over its lines and
//! rebuilds the node tree from the flat, path-addressed node records.
//!
//! The pass is stateful rather than grammatical:
//! - `[ext_resource ...]` lines update the resource table by id.
//! - `[node ...]` lines open a new node record, which becomes current.
//! - `script = ExtResource(id)` attaches to the current node if the id is
//!   already in the resource table.
//! - Everything else that isn't a header or a `key = value` property is
//!   ignored.
//!
//! Tree reconstruction then walks the records in order. The first record is
//! the root, keyed `"."`. A record whose parent path was not registered
//! earlier is dropped along with anything that would have hung below it.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{SceneError, TriedPaths, UnresolvedReference};
use crate::model::{
    child_path_key, Connection, ExternalResource, NodeRecord, SubResource, GENERIC_RESOURCE_TYPE,
    ROOT_PATH,
};

/// A node in the reconstructed tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneNode {
    pub name: String,
    pub node_type: String,
    /// Resolved path of the attached script
    pub script: Option<String>,
    /// Arena indices, in attach order
    pub children: Vec<usize>,
}

/// Arena of reconstructed nodes; index 0 is the root
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SceneTree {
    nodes: Vec<SceneNode>,
    /// Registered path key to arena index
    paths: HashMap<String, usize>,
}

impl SceneTree {
    pub fn root(&self) -> Option<&SceneNode> {
        self.nodes.first()
    }

    pub fn get(&self, index: usize) -> Option<&SceneNode> {
        self.nodes.get(index)
    }

    /// Look up a node by its registered path key (`"."` for the root).
    pub fn find(&self, path: &str) -> Option<&SceneNode> {
        self.paths.get(path).and_then(|&i| self.nodes.get(i))
    }

    /// Number of nodes attached to the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order walk yielding `(depth, node)`.
    pub fn walk(&self) -> Vec<(usize, &SceneNode)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = Vec::new();
        if !self.nodes.is_empty() {
            stack.push((0usize, 0usize));
        }
        while let Some((depth, index)) = stack.pop() {
            let node = &self.nodes[index];
            out.push((depth, node));
            for &child in node.children.iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }

    /// Render the tree one node per line, two spaces per level.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (depth, node) in self.walk() {
            out.push_str(&"  ".repeat(depth));
            out.push_str(&node.name);
            if !node.node_type.is_empty() {
                out.push_str(&format!(" ({})", node.node_type));
            }
            if let Some(script) = &node.script {
                out.push_str(&format!(" script={}", script));
            }
            out.push('\n');
        }
        out
    }

    fn to_nested(&self, index: usize) -> NestedNode {
        let node = &self.nodes[index];
        NestedNode {
            name: node.name.clone(),
            node_type: node.node_type.clone(),
            script: node.script.clone(),
            children: node.children.iter().map(|&c| self.to_nested(c)).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct NestedNode {
    name: String,
    #[serde(rename = "type")]
    node_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    script: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<NestedNode>,
}

impl Serialize for SceneTree {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.nodes.is_empty() {
            serializer.serialize_none()
        } else {
            self.to_nested(0).serialize(serializer)
        }
    }
}

/// Everything recovered from one scene document
#[derive(Debug, Clone, Default, Serialize)]
pub struct Inspection {
    /// External resources in first-seen order
    pub resources: Vec<ExternalResource>,
    pub sub_resources: Vec<SubResource>,
    pub tree: SceneTree,
    pub connections: Vec<Connection>,
    /// References absorbed during the scan, in the order met
    pub unresolved: Vec<UnresolvedReference>,
}

impl Inspection {
    /// Fail on the first unresolved reference.
    pub fn check_strict(&self) -> Result<(), SceneError> {
        match self.unresolved.first() {
            Some(r) => Err(SceneError::Unresolved(r.clone())),
            None => Ok(()),
        }
    }

    /// Resource table, one `id  type  path` row per external resource.
    pub fn render_resources(&self) -> String {
        let mut out = format!("External resources ({}):\n", self.resources.len());
        if self.resources.is_empty() {
            out.push_str("  (none)\n");
        }
        for res in &self.resources {
            out.push_str(&format!("  {}  {}  {}\n", res.id, res.resource_type, res.path));
        }
        out
    }

    /// Sub-resources and connections, for `inspect --all`.
    pub fn render_extras(&self) -> String {
        let mut out = format!("Sub-resources ({}):\n", self.sub_resources.len());
        for sub in &self.sub_resources {
            out.push_str(&format!("  {}  {}\n", sub.id, sub.resource_type));
            for (key, value) in &sub.properties {
                out.push_str(&format!("    {} = {}\n", key, value));
            }
        }
        out.push_str(&format!("Connections ({}):\n", self.connections.len()));
        for conn in &self.connections {
            out.push_str(&format!(
                "  {}.{} -> {}.{}\n",
                conn.from, conn.signal, conn.to, conn.method
            ));
        }
        out
    }
}

/// Header tokenizer: `key="quoted value"` or `key=bare`
fn attribute_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Literal pattern, exercised by test_header_attributes
        Regex::new(r#"([A-Za-z_][A-Za-z0-9_]*)=(?:"([^"]*)"|([^\s\]]+))"#)
            .expect("attribute pattern is valid")
    })
}

/// A bracketed header line split into its tag and attributes.
struct Header<'a> {
    tag: &'a str,
    attrs: HashMap<&'a str, &'a str>,
}

impl<'a> Header<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let inner = line.strip_prefix('[')?.strip_suffix(']')?;
        let (tag, rest) = inner.split_once(char::is_whitespace).unwrap_or((inner, ""));
        let mut attrs = HashMap::new();
        for caps in attribute_pattern().captures_iter(rest) {
            let (Some(key), Some(value)) = (caps.get(1), caps.get(2).or_else(|| caps.get(3)))
            else {
                continue;
            };
            attrs.insert(key.as_str(), value.as_str());
        }
        Some(Self { tag, attrs })
    }

    fn get(&self, key: &str) -> Option<&'a str> {
        self.attrs.get(key).copied()
    }
}

/// Extract the id from `ExtResource("id")` or `ExtResource( id )`.
fn ext_resource_ref(value: &str) -> Option<&str> {
    let inner = value.strip_prefix("ExtResource(")?.strip_suffix(')')?;
    Some(inner.trim().trim_matches('"'))
}

/// What the most recent header opened
enum Context {
    None,
    Node(usize),
    SubResource(usize),
}

/// Parse scene text. Malformed input is tolerated and never aborts.
pub fn parse_scene(text: &str) -> Inspection {
    let mut inspection = Inspection::default();
    let mut resource_index: HashMap<String, usize> = HashMap::new();
    // Node records with the script path already resolved
    let mut records: Vec<NodeRecord> = Vec::new();
    let mut context = Context::None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        if let Some(header) = Header::parse(line) {
            context = Context::None;
            match header.tag {
                "ext_resource" => {
                    let Some(id) = header.get("id") else {
                        log::debug!("ext_resource without id ignored: {}", line);
                        continue;
                    };
                    let resource = ExternalResource {
                        id: id.to_string(),
                        resource_type: header
                            .get("type")
                            .unwrap_or(GENERIC_RESOURCE_TYPE)
                            .to_string(),
                        path: header.get("path").unwrap_or_default().to_string(),
                    };
                    match resource_index.get(id) {
                        Some(&i) => inspection.resources[i] = resource,
                        None => {
                            resource_index.insert(id.to_string(), inspection.resources.len());
                            inspection.resources.push(resource);
                        }
                    }
                }
                "sub_resource" => {
                    inspection.sub_resources.push(SubResource {
                        id: header.get("id").unwrap_or_default().to_string(),
                        resource_type: header
                            .get("type")
                            .unwrap_or(GENERIC_RESOURCE_TYPE)
                            .to_string(),
                        properties: Vec::new(),
                    });
                    context = Context::SubResource(inspection.sub_resources.len() - 1);
                }
                "node" => {
                    records.push(NodeRecord {
                        name: header.get("name").unwrap_or_default().to_string(),
                        node_type: header.get("type").unwrap_or_default().to_string(),
                        parent: header.get("parent").map(String::from),
                        script: None,
                    });
                    context = Context::Node(records.len() - 1);
                }
                "connection" => {
                    inspection.connections.push(Connection {
                        signal: header.get("signal").unwrap_or_default().to_string(),
                        from: header.get("from").unwrap_or_default().to_string(),
                        to: header.get("to").unwrap_or_default().to_string(),
                        method: header.get("method").unwrap_or_default().to_string(),
                    });
                }
                _ => {}
            }
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());

        match context {
            Context::SubResource(i) => {
                inspection.sub_resources[i].properties.push((key.to_string(), value.to_string()));
            }
            Context::Node(i) if key == "script" => {
                let Some(id) = ext_resource_ref(value) else {
                    continue;
                };
                let record = &mut records[i];
                match resource_index.get(id) {
                    Some(&r) => record.script = Some(inspection.resources[r].path.clone()),
                    None => {
                        log::debug!("node '{}': unknown script resource '{}'", record.name, id);
                        inspection.unresolved.push(UnresolvedReference::Script {
                            node: record.name.clone(),
                            id: id.to_string(),
                        });
                    }
                }
            }
            _ => {}
        }
    }

    inspection.tree = reconstruct_tree(records, &mut inspection.unresolved);
    inspection
}

/// Attach records to an arena in parse order.
fn reconstruct_tree(
    records: Vec<NodeRecord>,
    unresolved: &mut Vec<UnresolvedReference>,
) -> SceneTree {
    let mut tree = SceneTree::default();
    let mut records = records.into_iter();

    let Some(root) = records.next() else {
        return tree;
    };
    tree.nodes.push(SceneNode {
        name: root.name,
        node_type: root.node_type,
        script: root.script,
        children: Vec::new(),
    });
    tree.paths.insert(ROOT_PATH.to_string(), 0);

    for record in records {
        let parent = record.parent_or_root();
        let Some(&parent_index) = tree.paths.get(parent) else {
            log::debug!("dropping node '{}': parent path '{}' not registered", record.name, parent);
            unresolved.push(UnresolvedReference::Parent {
                node: record.name.clone(),
                parent: parent.to_string(),
            });
            continue;
        };

        let key = child_path_key(parent, &record.name);
        let index = tree.nodes.len();
        tree.nodes[parent_index].children.push(index);
        tree.paths.insert(key, index);
        tree.nodes.push(SceneNode {
            name: record.name,
            node_type: record.node_type,
            script: record.script,
            children: Vec::new(),
        });
    }

    tree
}

/// Read and parse a scene document at an exact path.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub fn inspect_file(path: &Path) -> Result<Inspection, SceneError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => SceneError::NotFound {
            path: path.to_path_buf(),
            tried: TriedPaths(vec![path.to_path_buf()]),
        },
        _ => SceneError::io(path, e),
    })?;
    Ok(parse_scene(&String::from_utf8_lossy(&bytes)))
}

/// Where to look for a scene that isn't found verbatim
#[derive(Debug, Clone)]
pub struct SceneLocator {
    /// Directory `res://` paths are relative to
    pub project_root: PathBuf,
    /// Extension appended when the input has none
    pub extension: String,
    /// Fallback directories, relative to the project root
    pub search_dirs: Vec<PathBuf>,
}

impl SceneLocator {
    /// Candidate paths in the order they are tried.
    pub fn candidates(&self, input: &Path) -> Vec<PathBuf> {
        let mut out = vec![input.to_path_buf()];

        let input_str = input.to_string_lossy();
        let base = match input_str.strip_prefix("res://") {
            Some(rel) => {
                let p = self.project_root.join(rel);
                out.push(p.clone());
                PathBuf::from(rel)
            }
            None => input.to_path_buf(),
        };

        let with_ext = if base.extension().is_none() && !self.extension.is_empty() {
            let p = base.with_extension(&self.extension);
            out.push(p.clone());
            Some(p)
        } else {
            None
        };

        if base.is_relative() {
            for dir in &self.search_dirs {
                let dir = self.project_root.join(dir);
                out.push(dir.join(&base));
                if let Some(p) = &with_ext {
                    out.push(dir.join(p));
                }
            }
        }

        out.dedup();
        out
    }

    /// First existing candidate, or [`SceneError::NotFound`].
    pub fn locate(&self, input: &Path) -> Result<PathBuf, SceneError> {
        let candidates = self.candidates(input);
        for candidate in &candidates {
            if candidate.is_file() {
                log::debug!("resolved {} to {}", input.display(), candidate.display());
                return Ok(candidate.clone());
            }
            log::debug!("no scene at {}", candidate.display());
        }
        Err(SceneError::NotFound { path: input.to_path_buf(), tried: TriedPaths(candidates) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MAIN_SCENE: &str = r#"[gd_scene load_steps=2 format=3]

[ext_resource type="Script" path="res://main.gd" id="1_abcde"]

[node name="Main" type="Node2D"]
script = ExtResource("1_abcde")

[node name="Sprite" type="Sprite2D" parent="."]
"#;

    fn names(tree: &SceneTree) -> Vec<(usize, String)> {
        tree.walk().into_iter().map(|(d, n)| (d, n.name.clone())).collect()
    }

    #[test]
    fn test_render_main_scene() {
        let inspection = parse_scene(MAIN_SCENE);
        assert_eq!(
            inspection.tree.render(),
            "Main (Node2D) script=res://main.gd\n  Sprite (Sprite2D)\n"
        );
        assert_eq!(inspection.resources.len(), 1);
        assert_eq!(inspection.resources[0].resource_type, "Script");
        assert!(inspection.unresolved.is_empty());
    }

    #[test]
    fn test_nested_paths() {
        let text = r#"[node name="Main" type="Node2D"]
[node name="Body" type="CharacterBody2D" parent="."]
[node name="Sprite" type="Sprite2D" parent="Body"]
[node name="Light" type="PointLight2D" parent="Body/Sprite"]
[node name="Hud" type="CanvasLayer" parent="."]
"#;
        let tree = parse_scene(text).tree;
        assert_eq!(
            names(&tree),
            vec![
                (0, "Main".to_string()),
                (1, "Body".to_string()),
                (2, "Sprite".to_string()),
                (3, "Light".to_string()),
                (1, "Hud".to_string()),
            ]
        );
        assert!(tree.find("Body/Sprite/Light").is_some());
        assert_eq!(tree.find(".").map(|n| n.name.as_str()), Some("Main"));
    }

    #[test]
    fn test_forward_reference_is_dropped() {
        let text = r#"[node name="Main" type="Node"]
[node name="B" type="Node" parent="C"]
[node name="C" type="Node" parent="."]
"#;
        let inspection = parse_scene(text);
        assert_eq!(names(&inspection.tree), vec![(0, "Main".to_string()), (1, "C".to_string())]);
        assert_eq!(
            inspection.unresolved,
            vec![UnresolvedReference::Parent { node: "B".into(), parent: "C".into() }]
        );
        assert!(inspection.check_strict().is_err());
    }

    #[test]
    fn test_descendants_of_dropped_node_are_dropped() {
        let text = r#"[node name="Main" type="Node"]
[node name="B" type="Node" parent="Missing"]
[node name="Leaf" type="Node" parent="Missing/B"]
"#;
        let tree = parse_scene(text).tree;
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_first_record_is_root_even_with_parent() {
        let text = r#"[node name="Odd" type="Node" parent="Somewhere"]
[node name="Child" type="Node" parent="."]
"#;
        let tree = parse_scene(text).tree;
        assert_eq!(tree.root().map(|n| n.name.as_str()), Some("Odd"));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_second_parentless_record_attaches_to_root() {
        let text = "[node name=\"Main\" type=\"Node\"]\n[node name=\"Stray\" type=\"Node\"]\n";
        let tree = parse_scene(text).tree;
        assert_eq!(names(&tree), vec![(0, "Main".to_string()), (1, "Stray".to_string())]);
    }

    #[test]
    fn test_duplicate_sibling_names_last_registration_wins() {
        let text = r#"[node name="Main" type="Node"]
[node name="Dup" type="Node" parent="."]
[node name="Dup" type="Node2D" parent="."]
[node name="Child" type="Node" parent="Dup"]
"#;
        let tree = parse_scene(text).tree;
        let root = tree.root().unwrap();
        let second = tree.get(root.children[1]).unwrap();
        assert_eq!(second.node_type, "Node2D");
        assert_eq!(second.children.len(), 1);
    }

    #[test]
    fn test_unknown_script_id_left_unset() {
        let text = r#"[node name="Main" type="Node"]
script = ExtResource("9_zzzzz")
"#;
        let inspection = parse_scene(text);
        assert_eq!(inspection.tree.root().unwrap().script, None);
        assert_eq!(
            inspection.unresolved,
            vec![UnresolvedReference::Script { node: "Main".into(), id: "9_zzzzz".into() }]
        );
    }

    #[test]
    fn test_script_attaches_to_most_recent_node() {
        let text = r#"[ext_resource type="Script" path="res://a.gd" id="1"]
[node name="Main" type="Node"]
[node name="Child" type="Node" parent="."]
position = Vector2(1, 2)
script = ExtResource( 1 )
"#;
        let tree = parse_scene(text).tree;
        assert_eq!(tree.root().unwrap().script, None);
        assert_eq!(tree.find("Child").unwrap().script.as_deref(), Some("res://a.gd"));
    }

    #[test]
    fn test_ext_resource_type_defaults_and_updates_by_id() {
        let text = r#"[ext_resource path="res://icon.png" id="1"]
[ext_resource type="Texture2D" path="res://icon2.png" id="2"]
[ext_resource type="Texture2D" path="res://icon.svg" id="1"]
"#;
        let resources = parse_scene(text).resources;
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].id, "1");
        assert_eq!(resources[0].path, "res://icon.svg");
        assert_eq!(resources[1].id, "2");

        let generic = parse_scene("[ext_resource path=\"res://x.tres\" id=\"7\"]").resources;
        assert_eq!(generic[0].resource_type, GENERIC_RESOURCE_TYPE);
    }

    #[test]
    fn test_sub_resources_and_connections_collected() {
        let text = r#"[sub_resource type="CircleShape2D" id="sub_1"]
radius = 16.0

[node name="Game" type="Node"]

[connection signal="ready" from="." to="." method="on_ready"]
"#;
        let inspection = parse_scene(text);
        assert_eq!(
            inspection.sub_resources[0].properties,
            vec![("radius".to_string(), "16.0".to_string())]
        );
        assert_eq!(inspection.connections[0].method, "on_ready");
        assert!(inspection.render_extras().contains(".ready -> ..on_ready"));
    }

    #[test]
    fn test_garbage_lines_ignored() {
        let text = "not a header\n[unterminated\n[node name=\"Main\" type=\"Node\"]\n}}}\n";
        let tree = parse_scene(text).tree;
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_empty_document() {
        let inspection = parse_scene("");
        assert!(inspection.tree.is_empty());
        assert_eq!(inspection.tree.render(), "");
    }

    #[test]
    fn test_json_tree_is_nested() {
        let json = serde_json::to_value(parse_scene(MAIN_SCENE)).unwrap();
        assert_eq!(json["tree"]["name"], "Main");
        assert_eq!(json["tree"]["script"], "res://main.gd");
        assert_eq!(json["tree"]["children"][0]["type"], "Sprite2D");
        assert_eq!(json["resources"][0]["path"], "res://main.gd");
    }

    #[test]
    fn test_header_attributes() {
        let header = Header::parse(r#"[gd_scene load_steps=4 format=3 uid="uid://abc"]"#).unwrap();
        assert_eq!(header.tag, "gd_scene");
        assert_eq!(header.get("load_steps"), Some("4"));
        assert_eq!(header.get("uid"), Some("uid://abc"));
        assert!(Header::parse("no brackets").is_none());
    }

    #[test]
    fn test_inspect_file_not_found() {
        let dir = TempDir::new().unwrap();
        let err = inspect_file(&dir.path().join("missing.tscn")).unwrap_err();
        assert!(matches!(err, SceneError::NotFound { .. }));
    }

    #[test]
    fn test_inspect_file_tolerates_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.tscn");
        let mut bytes = MAIN_SCENE.as_bytes().to_vec();
        bytes.extend_from_slice(b"; \xff\xfe broken comment\n");
        std::fs::write(&path, bytes).unwrap();

        let inspection = inspect_file(&path).unwrap();
        assert_eq!(inspection.tree.len(), 2);
    }

    #[test]
    fn test_locator_fallbacks() {
        let dir = TempDir::new().unwrap();
        let scenes = dir.path().join("scenes");
        std::fs::create_dir_all(&scenes).unwrap();
        std::fs::write(scenes.join("level.tscn"), MAIN_SCENE).unwrap();

        let locator = SceneLocator {
            project_root: dir.path().to_path_buf(),
            extension: "tscn".to_string(),
            search_dirs: vec![PathBuf::from("scenes")],
        };

        assert_eq!(locator.locate(Path::new("level")).unwrap(), scenes.join("level.tscn"));
        assert_eq!(
            locator.locate(Path::new("res://scenes/level.tscn")).unwrap(),
            scenes.join("level.tscn")
        );
        let err = locator.locate(Path::new("nowhere")).unwrap_err();
        match err {
            SceneError::NotFound { tried, .. } => assert!(tried.0.len() >= 3),
            other => panic!("unexpected error: {other}"),
        }
    }
}
