//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod build;
mod inspect;
mod settings;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::loader::{load_config, LoadedConfig};
use crate::error::SceneError;

pub use settings::SettingsAction;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Scenesmith - build and inspect text scene documents
#[derive(Parser)]
#[command(name = "scn")]
#[command(about = "Scenesmith - build and inspect text scene documents (.tscn)")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to scn.toml (default: search upward from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a scene document from node, script, resource and signal descriptors
    ///
    /// Examples:
    ///   scn build -o main.tscn --root Main:Node2D --node Sprite:Sprite2D
    ///   scn build -o main.tscn --root Main:Node2D --script Main=res://main.gd
    ///   scn build -o game.tscn --root Game:Node --connect Game:ready:Game:on_ready
    Build {
        /// Output scene file (parent directories are created)
        #[arg(short, long)]
        output: PathBuf,

        /// Root node as NAME:TYPE
        #[arg(long, value_name = "NAME:TYPE")]
        root: String,

        /// Child node as NAME:TYPE or NAME:TYPE:PARENT (repeatable)
        #[arg(long, value_name = "NAME:TYPE[:PARENT]")]
        node: Vec<String>,

        /// Script attachment as NODE=RESOURCE_PATH (repeatable)
        #[arg(long, value_name = "NODE=PATH")]
        script: Vec<String>,

        /// Inline resource as TYPE or TYPE:KEY=VALUE,KEY=VALUE (repeatable)
        #[arg(long, value_name = "TYPE[:K=V,...]")]
        sub_resource: Vec<String>,

        /// Signal connection as FROM:SIGNAL:TO:METHOD (repeatable)
        #[arg(long, value_name = "FROM:SIGNAL:TO:METHOD")]
        connect: Vec<String>,

        /// Print the document instead of writing it
        #[arg(long)]
        dry_run: bool,

        /// Seed for resource id suffixes (reproducible output)
        #[arg(long, hide = true)]
        seed: Option<u64>,
    },

    /// Print the resource table and node tree of a scene document
    Inspect {
        /// Scene file; also tried with the configured extension and search dirs
        scene: PathBuf,

        /// Fail on unresolved script ids or parent paths
        #[arg(long)]
        strict: bool,

        /// Also list sub-resources and connections
        #[arg(long)]
        all: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read or rewrite keys in the project settings file
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

/// Install the env_logger backend. `--verbose` lowers the default filter.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env).format_timestamp(None).try_init();
}

/// Load scn.toml, reporting failures on stderr.
fn load_or_report(path: Option<&std::path::Path>) -> Result<LoadedConfig, ExitCode> {
    load_config(path).map_err(|e| {
        eprintln!("Error loading config: {}", e);
        ExitCode::from(EXIT_ERROR)
    })
}

/// Exit status for a fatal scene error.
pub(crate) fn exit_status(err: &SceneError) -> u8 {
    match err {
        SceneError::MalformedSpecification { .. } => EXIT_INVALID_ARGS,
        _ => EXIT_ERROR,
    }
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let loaded = match load_or_report(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    match cli.command {
        Commands::Build { output, root, node, script, sub_resource, connect, dry_run, seed } => {
            build::run_build(
                &loaded,
                &output,
                &root,
                &node,
                &script,
                &sub_resource,
                &connect,
                dry_run,
                seed,
            )
        }
        Commands::Inspect { scene, strict, all, json } => {
            inspect::run_inspect(&loaded, &scene, strict, all, json)
        }
        Commands::Settings { action } => settings::run_settings(&loaded, action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build_repeated_descriptors() {
        let cli = Cli::try_parse_from([
            "scn",
            "build",
            "-o",
            "main.tscn",
            "--root",
            "Main:Node2D",
            "--node",
            "A:Node",
            "--node",
            "B:Node:A",
            "--connect",
            "A:ready:Main:on_ready",
        ])
        .unwrap();

        match cli.command {
            Commands::Build { node, connect, root, .. } => {
                assert_eq!(root, "Main:Node2D");
                assert_eq!(node, vec!["A:Node", "B:Node:A"]);
                assert_eq!(connect.len(), 1);
            }
            _ => panic!("expected build command"),
        }
    }

    #[test]
    fn test_build_requires_root_and_output() {
        assert!(Cli::try_parse_from(["scn", "build", "-o", "main.tscn"]).is_err());
        assert!(Cli::try_parse_from(["scn", "build", "--root", "Main:Node"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        let malformed = SceneError::MalformedSpecification {
            kind: crate::error::DescriptorKind::Node,
            descriptor: "x".into(),
            reason: "r".into(),
        };
        assert_eq!(exit_status(&malformed), EXIT_INVALID_ARGS);

        let not_found = SceneError::NotFound {
            path: PathBuf::from("x"),
            tried: crate::error::TriedPaths::default(),
        };
        assert_eq!(exit_status(&not_found), EXIT_ERROR);
    }
}
