//! docshelf CLI
//!
//! Command-line interface for docshelf - import, list, preview and remove
//! documents kept in a managed directory.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use docshelf_core::{Config, Shelf};

mod commands;
mod output;
mod prompt;

use output::{storage_hint, Output, OutputFormat};

#[derive(Parser)]
#[command(name = "docshelf")]
#[command(about = "docshelf - Keep imported documents in one ordered list")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use a specific config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr (or the configured log file)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy files into the documents directory and add them to the list
    Import {
        /// Files to import
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Open each imported copy with the default application
        #[arg(long)]
        open: bool,
    },
    /// List documents
    #[command(alias = "ls")]
    List,
    /// Show details of a document
    Show {
        /// Position in the list (starting at 1)
        position: usize,
    },
    /// Open a document with the default application
    Open {
        /// Position in the list (starting at 1)
        position: usize,
    },
    /// Remove a document from the list
    #[command(alias = "rm")]
    Remove {
        /// Position in the list (starting at 1)
        position: usize,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show storage locations and counts
    Status,
    /// Show or modify configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, documents_dir, reference_mode, suffix_style,
        /// max_collision_attempts, language, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let format = OutputFormat::from_flags(cli.json, cli.quiet);

    // Config commands work without opening the shelf
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &Output::new(format));
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    init_logging(&config, cli.verbose);

    let output = Output::new(format).with_language(config.language);
    let mut shelf = Shelf::open_with_config(config)?;

    let result = match cli.command {
        Commands::Import { files, open } => {
            commands::import::import(&mut shelf, files, open, &output).await
        }
        Commands::List => commands::document::list(&shelf, &output),
        Commands::Show { position } => commands::document::show(&shelf, position, &output),
        Commands::Open { position } => commands::document::open(&shelf, position, &output),
        Commands::Remove { position, yes } => {
            commands::document::remove(&mut shelf, position, yes, &output)
        }
        Commands::Status => commands::status::show(&shelf, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    };

    if let Err(e) = &result {
        if let Some(hint) = storage_hint(e) {
            eprintln!("Hint: {}", hint);
        }
    }

    result
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize logging
///
/// RUST_LOG wins when set. Otherwise `debug` with --verbose, else `warn`.
/// Logs go to `config.log_file` when set, otherwise to stderr.
fn init_logging(config: &Config, verbose: bool) {
    let log_level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "docshelf_core={},docshelf_cli={}",
            log_level, log_level
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    // Ignore error if already initialized
    match &config.log_file {
        Some(path) => match open_log_file(path) {
            Ok(file) => {
                let _ = builder
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .try_init();
            }
            Err(e) => {
                eprintln!("Warning: Could not open log file {:?}: {}", path, e);
                let _ = builder.with_writer(std::io::stderr).try_init();
            }
        },
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }

    debug!("logging initialized");
}

/// Open the log file, keeping what earlier runs wrote
fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
