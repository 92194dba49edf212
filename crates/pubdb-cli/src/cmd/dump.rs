//! Dump subcommand - stream the MongoDB collection to TSV

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;

use pubdb_core::{ProgressContext, RecordSource, RowSink, TransformRules, TsvSink, fmt_num};
use pubdb_mongo::MongoSource;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Output path for the TSV file
    pub path_out: PathBuf,
}

pub fn run(args: DumpArgs, config: &Config, progress: &ProgressContext) -> Result<()> {
    let target = config.mongo_target()?;
    let options = config.export_options();
    let start = Instant::now();

    let mut source = MongoSource::connect(&target).context("Failed to connect to MongoDB")?;
    let estimate = source.estimated_count();
    if let Some(n) = estimate {
        log::info!("Collection holds about {} documents", fmt_num(n as usize));
    }

    log::info!("Streaming documents in batches of {}", fmt_num(options.batch_size));
    log::info!("Saving to {}", args.path_out.display());
    let mut sink = TsvSink::create(&args.path_out)
        .with_context(|| format!("Failed to create {}", args.path_out.display()))?;

    let pb = progress.export_bar(estimate);
    let summary = pubdb_core::export(
        &mut source,
        &TransformRules::default(),
        &mut sink,
        &options,
        &pb,
    )
    .with_context(|| format!("Export to {} failed", args.path_out.display()))?;
    pb.finish_and_clear();
    sink.finish()
        .with_context(|| format!("Failed to flush {}", args.path_out.display()))?;

    eprintln!();
    eprintln!("=== Dump Summary ===");
    eprintln!(
        "Dumped {} papers to {}",
        fmt_num(summary.records_written),
        args.path_out.display()
    );
    eprintln!("Batches: {}", summary.batches);
    if let Some(schema) = &summary.schema {
        eprintln!("Columns: {}", schema.len());
    }
    eprintln!("Time: {:.1}s", start.elapsed().as_secs_f64());
    Ok(())
}
