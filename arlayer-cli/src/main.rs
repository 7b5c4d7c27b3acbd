//! ARLayer CLI
//!
//! Drives the session bridge over JSON lines and manages its configuration.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use arlayer::config::config_file_path;
use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::serve::ServeArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "arlayer", version, about = "AR session bridge")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Answer JSON-line requests from stdin (or a script) on stdout
    Serve {
        /// Read requests from this file instead of stdin
        #[arg(long)]
        script: Option<PathBuf>,
    },

    /// List the supported methods on both channels
    Methods,

    /// View or change configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result: Result<(), CliError> = match cli.command {
        Commands::Serve { script } => commands::serve::run(ServeArgs {
            script,
            verbose: cli.verbose,
        }),
        Commands::Methods => commands::methods::run(),
        Commands::Config { command } => commands::config::run(command, &config_file_path()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
