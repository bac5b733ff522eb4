//! AppVeyor build-log triage
//!
//! Fetches the console feed of the latest build of an AppVeyor project (or
//! reads a saved feed from disk), runs it through the [`triage`] pipeline and
//! publishes the warning/error summary.
//!
//! # Usage
//!
//! ```bash
//! # Latest build of a project, report written to ./appveyor-<version>.log
//! APPVEYOR_TOKEN=... appveyor-triage --account brlcad --project brlcad
//!
//! # Saved console feed, JSON report on stdout
//! appveyor-triage console.json --format json --stdout
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod appveyor;
pub mod config;
pub mod report;
pub mod run;
pub mod sink;
pub mod source;

pub use config::{ConfigError, ReportFormat, TriageConfig};
pub use run::{run, RunResult};
