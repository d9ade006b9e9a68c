//! CLI dispatch for the `scn settings` command.

use clap::Subcommand;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::loader::{resolve_path, LoadedConfig};
use crate::settings::{ProjectSettings, SettingsError};

use super::{EXIT_ERROR, EXIT_SUCCESS};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the raw value of a key
    ///
    /// Examples:
    ///   scn settings get application/config/name
    ///   scn settings get layer_names/2d_physics/layer_1 --file game/project.godot
    Get {
        /// Key as SECTION/PROPERTY
        key: String,

        /// Settings file (default: from scn.toml, else project.godot)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rewrite the value of an existing key
    ///
    /// Examples:
    ///   scn settings set application/config/name '"My Game"'
    Set {
        /// Key as SECTION/PROPERTY
        key: String,

        /// New raw value, written verbatim
        value: String,

        /// Settings file (default: from scn.toml, else project.godot)
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn settings_path(loaded: &LoadedConfig, file: Option<PathBuf>) -> PathBuf {
    match file {
        Some(f) => f,
        None => resolve_path(&loaded.project_root, &loaded.config.settings.file),
    }
}

fn report(e: SettingsError) -> ExitCode {
    eprintln!("Error: {}", e);
    ExitCode::from(EXIT_ERROR)
}

/// Execute a settings subcommand
pub fn run_settings(loaded: &LoadedConfig, action: SettingsAction) -> ExitCode {
    match action {
        SettingsAction::Get { key, file, json } => {
            let path = settings_path(loaded, file);
            let settings = match ProjectSettings::load(&path) {
                Ok(s) => s,
                Err(e) => return report(e),
            };
            match settings.get(&key) {
                Ok(value) if json => {
                    println!("{}", serde_json::json!({ "key": key, "value": value }));
                    ExitCode::from(EXIT_SUCCESS)
                }
                Ok(value) => {
                    println!("{}", value);
                    ExitCode::from(EXIT_SUCCESS)
                }
                Err(e) => report(e),
            }
        }

        SettingsAction::Set { key, value, file } => {
            let path = settings_path(loaded, file);
            let result = ProjectSettings::load(&path).and_then(|mut settings| {
                settings.set(&key, &value)?;
                settings.save(&path)
            });
            match result {
                Ok(()) => {
                    println!("Updated {}", key);
                    ExitCode::from(EXIT_SUCCESS)
                }
                Err(e) => report(e),
            }
        }
    }
}
