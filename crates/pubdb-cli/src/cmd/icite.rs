//! iCite subcommand - load the iCite CSV into an indexed table

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use pubdb_core::{ProgressContext, fmt_num};
use pubdb_icite::ImportConfig;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct IciteArgs {
    /// Full path to the iCite CSV file
    pub icite_csv: PathBuf,

    /// Full path to the output database
    pub sqlite_db: PathBuf,
}

pub fn run(args: IciteArgs, config: &Config, progress: &ProgressContext) -> Result<()> {
    let import = ImportConfig {
        table: config.import.table.clone(),
        chunk_size: config.import.chunk_size,
        ..ImportConfig::new(args.icite_csv, args.sqlite_db)
    };

    let pb = progress.stage_line("icite");
    let summary = pubdb_icite::run(&import, &pb)?;
    pb.finish_and_clear();

    eprintln!();
    eprintln!("=== iCite Import Summary ===");
    eprintln!("Rows: {}", fmt_num(summary.rows as usize));
    eprintln!("Chunks: {}", summary.chunks);
    eprintln!("Indexes: {}", summary.indexes);
    eprintln!("Database: {}", import.db_path.display());
    Ok(())
}
