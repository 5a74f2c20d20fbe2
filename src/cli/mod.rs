//! Command-line interface for layered-config
//!
//! Provides `show`, `get`, `check` and `migrate` subcommands over the
//! configuration resolved for one environment.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::{ConfigResolver, DEFAULT_ENVIRONMENT};
use crate::logging;

mod check;
mod get;
mod migrate;
mod show;

/// Resolve layered configuration with environment overrides
#[derive(Parser)]
#[command(name = "layered-config")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding config.{toml,yaml,yml} and the per-environment overrides
    #[arg(short = 'c', long, global = true, env = "CONFIG_DIR", default_value = "config", value_name = "DIR")]
    config_dir: PathBuf,

    /// Environment whose override is merged onto the base configuration
    #[arg(short = 'e', long = "env", global = true, env = "ENVIRONMENT_NAME", default_value = DEFAULT_ENVIRONMENT, value_name = "ENV")]
    environment: String,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration
    Show(show::ShowArgs),

    /// Print a single value by dotted key, e.g. database.pool_size
    Get(get::GetArgs),

    /// Validate the effective configuration and print a summary
    Check,

    /// Connect to the configured database and apply pending migrations
    Migrate,

    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "layered-config", &mut std::io::stdout());
        return Ok(());
    }

    let log = logging::init(cli.verbose);
    let resolver = ConfigResolver::new(&cli.config_dir, &cli.environment)?;

    match cli.command {
        Commands::Show(args) => show::run(&resolver, args),
        Commands::Get(args) => get::run(&resolver, args),
        Commands::Check => check::run(&resolver),
        Commands::Migrate => migrate::run(&resolver, &log),
        Commands::Completions { .. } => Ok(()),
    }
}
