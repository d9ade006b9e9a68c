//! Configuration schema types for `scn.toml`
//!
//! Every section and key is optional; missing values fall back to defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ids::DEFAULT_SUFFIX_LEN;
use crate::model::{DEFAULT_FORMAT, DEFAULT_SCRIPT_TYPE};

/// Scene emission settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Value of `format=` in the document header
    #[serde(default = "default_format")]
    pub format: u32,
    /// External resource type used for script attachments
    #[serde(default = "default_script_type")]
    pub script_type: String,
    /// Number of random letters in external resource ids
    #[serde(default = "default_id_suffix_len")]
    pub id_suffix_len: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            script_type: default_script_type(),
            id_suffix_len: default_id_suffix_len(),
        }
    }
}

fn default_format() -> u32 {
    DEFAULT_FORMAT
}

fn default_script_type() -> String {
    DEFAULT_SCRIPT_TYPE.to_string()
}

fn default_id_suffix_len() -> usize {
    DEFAULT_SUFFIX_LEN
}

/// Scene lookup settings for `inspect`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectConfig {
    /// Fallback directories, relative to the project root
    #[serde(default = "default_search_dirs")]
    pub search_dirs: Vec<PathBuf>,
    /// Extension appended to inputs that have none
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self { search_dirs: default_search_dirs(), extension: default_extension() }
    }
}

fn default_search_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("scenes")]
}

fn default_extension() -> String {
    "tscn".to_string()
}

/// Project settings store location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    #[serde(default = "default_settings_file")]
    pub file: PathBuf,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self { file: default_settings_file() }
    }
}

fn default_settings_file() -> PathBuf {
    PathBuf::from("project.godot")
}

/// Root of `scn.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScnConfig {
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub inspect: InspectConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// A single config validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ScnConfig {
    /// Check value ranges. An empty list means the config is usable.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.scene.format == 0 {
            errors.push(ConfigValidationError {
                field: "scene.format".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        if !(1..=16).contains(&self.scene.id_suffix_len) {
            errors.push(ConfigValidationError {
                field: "scene.id_suffix_len".to_string(),
                message: "must be between 1 and 16".to_string(),
            });
        }

        if self.scene.script_type.is_empty() {
            errors.push(ConfigValidationError {
                field: "scene.script_type".to_string(),
                message: "must be a non-empty string".to_string(),
            });
        }

        if self.inspect.extension.is_empty() {
            errors.push(ConfigValidationError {
                field: "inspect.extension".to_string(),
                message: "must be a non-empty string".to_string(),
            });
        }

        errors
    }
}
