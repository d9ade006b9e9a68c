//! Scenesmith - Library for building and inspecting text scene documents
//!
//! This library provides functionality to:
//! - Build a scene document from flat node, script, resource and signal descriptors
//! - Parse a scene document back into a node tree and resource table
//! - Read and rewrite keys in an INI-style project settings file

pub mod builder;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod ids;
pub mod inspector;
pub mod model;
pub mod settings;
pub mod writer;

pub use builder::{BuildSummary, SceneBuilder};
pub use error::{SceneError, UnresolvedReference};
pub use inspector::{inspect_file, parse_scene, Inspection, SceneTree};
pub use model::SceneDocument;
