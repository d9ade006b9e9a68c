//! Scenesmith - Command-line tool for building and inspecting scene documents

use std::process::ExitCode;

use scenesmith::cli;

fn main() -> ExitCode {
    cli::run()
}
