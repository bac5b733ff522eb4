//! Diagnostic Classification Module
//!
//! Turns logical log lines into a deduplicated summary of compiler and
//! linker diagnostics:
//! - Match lines against a [`Dialect`] (MSVC by default)
//! - File warnings and errors into independent per-code groups
//! - Render the groups as a stable text report
//!
//! # Architecture
//!
//! ```text
//! line → Dialect (warning? error?) → Classifier → Summary → report
//! ```

pub mod classifier;
pub mod pattern;
pub mod report;

pub use classifier::{Classifier, DiagnosticGroup, DiagnosticGroups, Summary};
pub use pattern::{DiagnosticPattern, DiagnosticRecord, Dialect, Severity};
pub use report::{render_report, write_groups, write_report};
