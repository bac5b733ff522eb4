//! Where rendered reports go.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

use crate::config::ReportFormat;

/// Destination for a rendered report.
pub trait ReportSink: Send + Sync {
    /// Publish `report`. Returns the file written, if any.
    fn publish(
        &self,
        build_id: &str,
        format: ReportFormat,
        report: &str,
    ) -> anyhow::Result<Option<PathBuf>>;
}

/// Writes `appveyor-<build id>.<log|json>` into a directory.
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn report_path(&self, build_id: &str, format: ReportFormat) -> PathBuf {
        self.dir.join(format!(
            "appveyor-{}.{}",
            sanitize(build_id),
            format.extension()
        ))
    }
}

impl ReportSink for FileSink {
    fn publish(
        &self,
        build_id: &str,
        format: ReportFormat,
        report: &str,
    ) -> anyhow::Result<Option<PathBuf>> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let path = self.report_path(build_id, format);
        std::fs::write(&path, report).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), bytes = report.len(), "report written");
        Ok(Some(path))
    }
}

/// Writes the report to standard output.
pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn publish(
        &self,
        _build_id: &str,
        _format: ReportFormat,
        report: &str,
    ) -> anyhow::Result<Option<PathBuf>> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(report.as_bytes())?;
        stdout.flush()?;
        Ok(None)
    }
}

/// Keep build ids usable as a file name component.
fn sanitize(build_id: &str) -> String {
    let cleaned: String = build_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}
