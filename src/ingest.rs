//! Folder ingestion orchestration.
//!
//! Coordinates the full sync flow: resolve customer → walk the local tree →
//! purge documents the walk did not touch. The purge only runs after a walk
//! that succeeded end to end; a failed or partial walk leaves stale documents
//! in place.

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use reqwest::StatusCode;
use std::path::Path;
use tracing::info;

use crate::client::expect_status;
use crate::config::Config;
use crate::progress::{IngestEvent, ProgressMode, ProgressReporter};
use crate::purge::{format_cutoff, purge_stale, Watermark};
use crate::remote::RemoteStore;
use crate::session::Session;
use crate::walker::{WalkReport, Walker};

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub root_marker: String,
    pub purge_margin: Duration,
}

impl IngestOptions {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            root_marker: config.root_marker.clone(),
            purge_margin: config.purge_margin()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct IngestReport {
    pub walk: WalkReport,
    pub watermark: Watermark,
    pub cutoff: String,
}

/// Mirror `root` into the store, then purge everything older than the walk.
pub fn ingest<S: RemoteStore + ?Sized>(
    store: &S,
    root: &Path,
    options: &IngestOptions,
    progress: &dyn ProgressReporter,
) -> Result<IngestReport> {
    if options.purge_margin <= Duration::zero() {
        bail!("purge margin must be positive");
    }
    if !root.is_dir() {
        bail!("ingest folder does not exist or is not a directory: {}", root.display());
    }

    let start = Utc::now();
    let walk = Walker::new(store, &options.root_marker)
        .with_progress(progress)
        .walk(None, root)
        .context("There was a fatal issue ingesting the docstore")?;
    let end = Utc::now();

    let watermark = Watermark::new(start, end);
    let cutoff = watermark.cutoff(options.purge_margin)?;
    info!(
        elapsed_ms = watermark.elapsed().num_milliseconds(),
        "walk finished"
    );

    purge_stale(store, cutoff)?;
    let cutoff = format_cutoff(cutoff);
    progress.report(IngestEvent::Purged {
        cutoff: cutoff.clone(),
    });

    Ok(IngestReport {
        walk,
        watermark,
        cutoff,
    })
}

/// CLI entry point for `ingest`.
pub fn run_ingest(config: &Config, folder: &Path, progress: ProgressMode) -> Result<()> {
    let session = Session::resolve(config)?;
    let reporter = progress.reporter();
    let report = ingest(
        &session,
        folder,
        &IngestOptions::from_config(config)?,
        reporter.as_ref(),
    )?;

    println!("ingest {}", folder.display());
    println!("  folders created: {}", report.walk.folders_created);
    println!("  folders existing: {}", report.walk.folders_existing);
    println!("  files uploaded: {}", report.walk.files_uploaded);
    println!("  files unchanged: {}", report.walk.files_unchanged);
    println!("  bytes uploaded: {}", report.walk.bytes_uploaded);
    println!("  purged before: {}", report.cutoff);
    println!("ok");
    Ok(())
}

/// Ask the service to vectorize every ingested document of the customer.
pub fn vectorize_documents(session: &Session) -> Result<()> {
    let response = session
        .client
        .put_empty(&session.customer_path("/vectorizeDocuments"))?;
    expect_status(response, "PUT", StatusCode::NO_CONTENT)
        .context("error sending the vectorization request")?;
    Ok(())
}

/// CLI entry point for `vec-dstore`.
pub fn run_vectorize_documents(config: &Config) -> Result<()> {
    let session = Session::resolve(config)?;
    vectorize_documents(&session).context("There was an issue vectorizing the datastore")?;
    println!("vectorization of documents requested");
    Ok(())
}
