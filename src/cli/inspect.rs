//! Inspect command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::config::loader::LoadedConfig;
use crate::inspector::{inspect_file, SceneLocator};

use super::{exit_status, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the inspect command
pub fn run_inspect(
    loaded: &LoadedConfig,
    scene: &Path,
    strict: bool,
    all: bool,
    json: bool,
) -> ExitCode {
    let locator = SceneLocator {
        project_root: loaded.project_root.clone(),
        extension: loaded.config.inspect.extension.clone(),
        search_dirs: loaded.config.inspect.search_dirs.clone(),
    };

    let inspection = match locator.locate(scene).and_then(|path| inspect_file(&path)) {
        Ok(i) => i,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(exit_status(&e));
        }
    };

    for reference in &inspection.unresolved {
        log::debug!("unresolved: {}", reference);
    }

    if strict {
        if let Err(e) = inspection.check_strict() {
            eprintln!("Error: {}", e);
            return ExitCode::from(exit_status(&e));
        }
    }

    if json {
        return match serde_json::to_string_pretty(&inspection) {
            Ok(s) => {
                println!("{}", s);
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                eprintln!("Error serializing inspection: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        };
    }

    print!("{}", inspection.render_resources());
    println!();
    println!("Node tree:");
    if inspection.tree.is_empty() {
        println!("No nodes found.");
    } else {
        print!("{}", inspection.tree.render());
    }
    if all {
        println!();
        print!("{}", inspection.render_extras());
    }

    ExitCode::from(EXIT_SUCCESS)
}
