//! Build command implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::builder::{output_path, BuildSummary, SceneBuilder};
use crate::config::loader::LoadedConfig;
use crate::ids::IdGenerator;

use super::{exit_status, EXIT_SUCCESS};

/// Execute the build command
pub fn run_build(
    loaded: &LoadedConfig,
    output: &Path,
    root: &str,
    nodes: &[String],
    scripts: &[String],
    sub_resources: &[String],
    connections: &[String],
    dry_run: bool,
    seed: Option<u64>,
) -> ExitCode {
    let scene = &loaded.config.scene;

    // Every descriptor is parsed before anything is written
    let builder =
        match SceneBuilder::from_descriptors(root, nodes, scripts, sub_resources, connections) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(exit_status(&e));
            }
        };

    let ids = match seed {
        Some(seed) => IdGenerator::seeded(seed),
        None => IdGenerator::new(),
    };
    let builder = builder
        .with_format(scene.format)
        .with_script_type(&scene.script_type)
        .with_id_generator(ids.with_suffix_len(scene.id_suffix_len));

    if dry_run {
        let (text, _) = builder.render();
        print!("{}", text);
        return ExitCode::from(EXIT_SUCCESS);
    }

    let output = output_path(
        &resolve_output(&loaded.project_root, output),
        &loaded.config.inspect.extension,
    );
    match builder.write_to(&output) {
        Ok(summary) => {
            print_summary(&output, &summary);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(exit_status(&e))
        }
    }
}

/// Map a `res://` output path onto the project root.
fn resolve_output(project_root: &Path, output: &Path) -> PathBuf {
    match output.to_str().and_then(|s| s.strip_prefix("res://")) {
        Some(rel) => project_root.join(rel),
        None => output.to_path_buf(),
    }
}

fn print_summary(output: &Path, summary: &BuildSummary) {
    println!("Wrote: {}", output.display());
    println!("  Root: {}", summary.root);
    println!("  Nodes: {}", summary.nodes);
    println!("  Scripts: {}", summary.scripts);
    println!("  Connections: {}", summary.connections);
    println!("  Load steps: {}", summary.load_steps);
}
