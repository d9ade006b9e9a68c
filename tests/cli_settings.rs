//! CLI integration tests for `scn settings`.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

const PROJECT: &str = "; Engine configuration file.\n\
config_version=5\n\
\n\
[application]\n\
\n\
config/name=\"Demo\"\n\
\n\
[layer_names]\n\
\n\
2d_physics/layer_1=\"world\"\n";

/// Get the path to the scn binary.
fn scn_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_scn"))
}

/// Run scn settings in `dir` and return (stdout, stderr, exit code).
fn run_settings(dir: &Path, args: &[&str]) -> (String, String, Option<i32>) {
    let output = Command::new(scn_binary())
        .current_dir(dir)
        .arg("settings")
        .args(args)
        .output()
        .expect("Failed to execute scn");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.code())
}

fn project(temp: &TempDir) -> PathBuf {
    let path = temp.path().join("project.godot");
    std::fs::write(&path, PROJECT).unwrap();
    path
}

#[test]
fn test_get_default_file() {
    let temp = TempDir::new().unwrap();
    project(&temp);
    let (stdout, _, code) = run_settings(temp.path(), &["get", "application/config/name"]);
    assert_eq!(code, Some(0));
    assert_eq!(stdout.trim(), "\"Demo\"");
}

#[test]
fn test_get_json() {
    let temp = TempDir::new().unwrap();
    project(&temp);
    let (stdout, _, code) =
        run_settings(temp.path(), &["get", "layer_names/2d_physics/layer_1", "--json"]);
    assert_eq!(code, Some(0));
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["value"], "\"world\"");
}

#[test]
fn test_set_rewrites_in_place() {
    let temp = TempDir::new().unwrap();
    let path = project(&temp);
    let (stdout, _, code) =
        run_settings(temp.path(), &["set", "application/config/name", "\"Renamed\""]);
    assert_eq!(code, Some(0));
    assert!(stdout.contains("Updated application/config/name"));

    let text = std::fs::read_to_string(path).unwrap();
    assert_eq!(text, PROJECT.replace("\"Demo\"", "\"Renamed\""));
}

#[test]
fn test_set_unknown_key_leaves_file_untouched() {
    let temp = TempDir::new().unwrap();
    let path = project(&temp);
    let (_, stderr, code) = run_settings(temp.path(), &["set", "application/config/icon", "x"]);
    assert_eq!(code, Some(1));
    assert!(stderr.contains("key not found"));
    assert_eq!(std::fs::read_to_string(path).unwrap(), PROJECT);
}

#[test]
fn test_explicit_file_and_missing_file() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("game");
    std::fs::create_dir_all(&nested).unwrap();
    std::fs::write(nested.join("project.godot"), PROJECT).unwrap();

    let (stdout, _, code) =
        run_settings(temp.path(), &["get", "config_version", "--file", "game/project.godot"]);
    assert_eq!(code, Some(0));
    assert_eq!(stdout.trim(), "5");

    let (_, stderr, code) = run_settings(temp.path(), &["get", "config_version"]);
    assert_eq!(code, Some(1));
    assert!(stderr.contains("settings file not found"));
}
