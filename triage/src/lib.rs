//! AppVeyor Console Log Triage
//!
//! This library turns the raw AppVeyor console feed into a compact summary of
//! MSVC compiler and linker diagnostics:
//! - Repair the unterminated record list the console endpoint returns
//! - Stream-decode the records into text fragments
//! - Reassemble fragments into logical lines, undoing the producer's chunking
//! - Classify warning/error lines, dedup by location, group by code
//! - Render a deterministic text report
//!
//! # Architecture
//!
//! ```text
//! bytes → EnvelopeReader → decode_fragments → LineReassembler → Classifier → report
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use triage::Pipeline;
//!
//! let raw = std::fs::read("console.json")?;
//! let outcome = Pipeline::default().run(raw.as_slice())?;
//! print!("{}", triage::render_report(&outcome.summary));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod diagnostics;
pub mod error;
pub mod pipeline;
pub mod stream;

pub use diagnostics::{
    render_report, write_report, Classifier, DiagnosticGroup, DiagnosticGroups,
    DiagnosticPattern, DiagnosticRecord, Dialect, Severity, Summary,
};
pub use error::{EnvelopeError, PatternError, TriageError, TriageResult};
pub use pipeline::{Pipeline, RunStats, TriageOutcome};
pub use stream::{
    decode_fragments, ChunkBoundary, ContinuationPolicy, DecodeOutcome, EnvelopeReader,
    Fragment, LineReassembler, ProducerChunking,
};
