//! Main entry point for scout CLI

use clap::Parser;
use scout::cli::Cli;
use scout::commands::execute_command;

fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging, verbose raises the default level to debug
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    // Execute the command
    if let Err(e) = execute_command(cli.command, cli.workspace.as_deref(), cli.verbose) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
