//! One triage run: fetch, triage, render, publish.

use std::path::PathBuf;

use anyhow::Context;
use tracing::{info, warn};
use triage::{Pipeline, TriageOutcome};

use crate::config::ReportFormat;
use crate::report::render;
use crate::sink::ReportSink;
use crate::source::LogSource;

/// What a run produced.
#[derive(Debug)]
pub struct RunResult {
    pub build_id: String,
    pub outcome: TriageOutcome,
    /// File the report went to, `None` for stdout
    pub destination: Option<PathBuf>,
}

impl RunResult {
    /// Whether any error diagnostics were found.
    pub fn has_errors(&self) -> bool {
        !self.outcome.summary.errors.is_empty()
    }
}

pub async fn run(
    source: &dyn LogSource,
    sink: &dyn ReportSink,
    pipeline: &Pipeline,
    format: ReportFormat,
) -> anyhow::Result<RunResult> {
    info!(source = %source.describe(), "fetching console feed");
    let log = source
        .fetch()
        .await
        .with_context(|| format!("fetching console feed from {}", source.describe()))?;
    info!(build = %log.build_id, bytes = log.bytes.len(), "console feed fetched");

    let outcome = pipeline
        .run(log.bytes.as_slice())
        .with_context(|| format!("triaging build {}", log.build_id))?;
    if !outcome.stats.decode.is_complete() {
        warn!(build = %log.build_id, decode = %outcome.stats.decode, "console feed only partially decoded");
    }

    let report = render(format, &log.build_id, &outcome).context("rendering report")?;
    let destination = sink.publish(&log.build_id, format, &report)?;

    Ok(RunResult {
        build_id: log.build_id,
        outcome,
        destination,
    })
}
