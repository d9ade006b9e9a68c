//! Configuration loading and discovery for `scn.toml`
//!
//! Provides functions to find and load configuration.

use super::schema::ScnConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the project configuration file
pub const CONFIG_FILE: &str = "scn.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse scn.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// A loaded configuration and the directory it applies to
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ScnConfig,
    /// Directory containing `scn.toml`, or the working directory
    pub project_root: PathBuf,
}

/// Find scn.toml by walking up from the current working directory.
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find scn.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration.
///
/// An explicit path must exist. Without one, scn.toml is discovered from
/// the working directory, and defaults are used when none is found.
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            log::debug!("using config {}", p.display());
            let config = load_config_file(&p)?;
            let project_root = match p.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => current_dir(),
            };
            Ok(LoadedConfig { config, project_root })
        }
        None => {
            log::debug!("no {} found, using defaults", CONFIG_FILE);
            Ok(LoadedConfig { config: ScnConfig::default(), project_root: current_dir() })
        }
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<ScnConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: ScnConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

fn current_dir() -> PathBuf {
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(b"[scene]\nformat = 3")
            .expect("should write config content");

        let subdir = temp.path().join("scenes").join("levels");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        assert_eq!(find_config_from(subdir), Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        assert_eq!(find_config_from(temp.path().to_path_buf()), None);
    }

    #[test]
    fn test_load_config_sets_project_root() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE);
        fs::write(&config_path, "[inspect]\nsearch_dirs = [\"levels\"]\n")
            .expect("should write config");

        let loaded = load_config(Some(&config_path)).expect("config should load");
        assert_eq!(loaded.project_root, temp.path());
        assert_eq!(loaded.config.inspect.search_dirs, vec![PathBuf::from("levels")]);
    }

    #[test]
    fn test_load_config_explicit_missing_file_errors() {
        let temp = TempDir::new().expect("should create temp dir");
        let result = load_config(Some(&temp.path().join("nonexistent.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE);
        fs::write(&config_path, "[scene\nformat = ").expect("should write config");
        assert!(matches!(load_config(Some(&config_path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE);
        fs::write(&config_path, "[scene]\nformat = 0\n").expect("should write config");
        let err = load_config(Some(&config_path)).unwrap_err();
        assert!(err.to_string().contains("scene.format"));
    }

    #[test]
    fn test_resolve_path() {
        let root = Path::new("/project");
        assert_eq!(resolve_path(root, Path::new("project.godot")), root.join("project.godot"));
        assert_eq!(resolve_path(root, Path::new("/abs/file")), PathBuf::from("/abs/file"));
    }
}
