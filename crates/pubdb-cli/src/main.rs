//! pubdb - move publication records between MongoDB, TSV and DuckDB
//!
//! `dump` streams the paper collection into a flat TSV; `icite` loads the
//! iCite CSV into an indexed table.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "pubdb")]
#[command(about = "Export and import tools for the publications database")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./pubdb.toml or the user config dir)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Dump the publications collection to a TSV file
    Dump(cmd::dump::DumpArgs),
    /// Import an iCite CSV file into an indexed DuckDB table
    Icite(cmd::icite::IciteArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = pubdb_core::ProgressContext::new();

    // Logging:
    //   TTY:     quiet (warn) unless --debug  — progress bars show activity
    //   non-TTY: info unless --debug          — logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = is_tty && !cli.debug;
    pubdb_core::init_logging(quiet, cli.debug, multi);

    let config = match cli.config {
        Some(path) => Config::from_file(&path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Dump(args) => cmd::dump::run(args, &config, &progress),
        Command::Icite(args) => cmd::icite::run(args, &config, &progress),
        Command::Config => {
            cmd::show_config(&config);
            Ok(())
        }
    }
}
