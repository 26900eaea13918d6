use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use dcmingest::cli::Args;
use dcmingest::ingest::{IngestReport, Ingestor, StoredUpload, TagQuery};
use dcmingest::registry;
use dcmingest::store::UploadStore;
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.files.is_empty() && args.stored_upload().is_none() {
        let _ = Args::command().print_help();
        println!();
        return;
    }

    match run(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            println!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

/// Ingest every file, or process one stored upload; returns whether
/// everything succeeded
fn run(args: &Args) -> Result<bool> {
    let store = UploadStore::open(&args.uploads)
        .with_context(|| format!("cannot open upload directory {}", args.uploads.display()))?;

    if let Some(dir) = &args.output {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create output directory {}", dir.display()))?;
    }

    let ingestor = Ingestor::new(store, registry::global(), args.scope);
    let restored = ingestor.restore().context("cannot load registry snapshot")?;
    debug!(restored, dir = %ingestor.store().dir().display(), "seeded duplicate registry");

    if let Some(which) = args.stored_upload() {
        let report = process_stored(&which, &ingestor, args)?;
        dcmingest::print_report(&report, args.verbose);
        return Ok(!matches!(report.tag, TagQuery::NotFound(_)));
    }

    let results: Vec<Result<IngestReport>> = args
        .files
        .par_iter()
        .map(|path| process_file(path, &ingestor, args))
        .collect();

    let multiple_files = args.files.len() > 1;
    let mut any_failed = false;

    for (idx, (file_path, result)) in args.files.iter().zip(results).enumerate() {
        if multiple_files {
            println!("{}", file_path.display());
        }

        match result {
            Ok(report) => {
                dcmingest::print_report(&report, args.verbose);
                if let TagQuery::NotFound(_) = report.tag {
                    any_failed = true;
                }
            }
            Err(e) => {
                println!("Error: {e:#}");
                any_failed = true;
            }
        }

        if multiple_files && idx < args.files.len() - 1 {
            println!();
        }
    }

    Ok(!any_failed)
}

/// Process a single DICOM file
fn process_file(file_path: &Path, ingestor: &Ingestor<'_>, args: &Args) -> Result<IngestReport> {
    // Stage 1: Read upload
    let bytes =
        fs::read(file_path).with_context(|| format!("cannot read {}", file_path.display()))?;

    // Stage 2: Parse, deduplicate, store, extract tag and render
    let report = ingestor.ingest(&bytes, args.tag)?;

    // Stage 3: Write rendering
    write_png(&report, args)?;

    Ok(report)
}

/// Re-process an upload that is already in the store
fn process_stored(
    which: &StoredUpload,
    ingestor: &Ingestor<'_>,
    args: &Args,
) -> Result<IngestReport> {
    let report = ingestor.process_stored(which, args.tag)?;
    write_png(&report, args)?;
    Ok(report)
}

fn write_png(report: &IngestReport, args: &Args) -> Result<()> {
    if let (Some(dir), Ok(png)) = (&args.output, &report.png) {
        let dest = dir.join(format!("{}.png", report.file_id));
        fs::write(&dest, png).with_context(|| format!("cannot write {}", dest.display()))?;
    }
    Ok(())
}
