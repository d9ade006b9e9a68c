//! Scene document text emission
//!
//! Writes a [`SceneDocument`] in a fixed order:
//!
//! ```text
//! [gd_scene load_steps=3 format=3]
//!
//! [ext_resource type="Script" path="res://main.gd" id="1_qwert"]
//!
//! [sub_resource type="CircleShape2D" id="sub_1"]
//! radius = 16.0
//!
//! [node name="Main" type="Node2D"]
//! script = ExtResource("1_qwert")
//!
//! [node name="Sprite" type="Sprite2D" parent="."]
//!
//! [connection signal="ready" from="." to="." method="on_ready"]
//! ```
//!
//! Names, types and values are written verbatim without escaping.

use std::fmt::Write;

use crate::model::{NodeRecord, SceneDocument, ROOT_PATH};

/// Render a document to its textual form.
pub fn write_scene(doc: &SceneDocument) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "[gd_scene load_steps={} format={}]", doc.load_steps(), doc.format);
    out.push('\n');

    for ext in &doc.ext_resources {
        let _ = writeln!(
            out,
            "[ext_resource type=\"{}\" path=\"{}\" id=\"{}\"]",
            ext.resource_type, ext.path, ext.id
        );
    }
    if !doc.ext_resources.is_empty() {
        out.push('\n');
    }

    for sub in &doc.sub_resources {
        let _ = writeln!(out, "[sub_resource type=\"{}\" id=\"{}\"]", sub.resource_type, sub.id);
        for (key, value) in &sub.properties {
            let _ = writeln!(out, "{} = {}", key, value);
        }
        out.push('\n');
    }

    if let Some(root) = doc.root() {
        let _ = writeln!(out, "[node name=\"{}\" type=\"{}\"]", root.name, root.node_type);
        write_script_line(&mut out, root);
        out.push('\n');
    }

    for node in doc.children() {
        let parent = node.parent.as_deref().unwrap_or(ROOT_PATH);
        let _ = writeln!(
            out,
            "[node name=\"{}\" type=\"{}\" parent=\"{}\"]",
            node.name, node.node_type, parent
        );
        write_script_line(&mut out, node);
        out.push('\n');
    }

    for conn in &doc.connections {
        let _ = writeln!(
            out,
            "[connection signal=\"{}\" from=\"{}\" to=\"{}\" method=\"{}\"]",
            conn.signal, conn.from, conn.to, conn.method
        );
    }

    out
}

fn write_script_line(out: &mut String, node: &NodeRecord) {
    if let Some(id) = &node.script {
        let _ = writeln!(out, "script = ExtResource(\"{}\")", id);
    }
}
