//! Diagnostic line patterns
//!
//! Each pattern is a regex with named captures (`path`, `line`, `code`,
//! `message`). A [`Dialect`] pairs a warning pattern with an error pattern
//! and a cheap substring check that decides whether the dialect is worth
//! trying on a line at all.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::PatternError;

/// `path(line): ` / `path(line,col): ` / `path : `, with an optional MSBuild
/// node prefix such as `12>`.
const MSVC_LOCATION: &str = r"^\s*(?:\d+>)?(?P<path>.*?)(?:\((?P<line>\d+)(?:,\d+)?\)| ):\s*";

/// `C4244: message [project]`
const MSVC_TAIL: &str = r"\s+(?P<code>[A-Z]+\d+)\s*:\s*(?P<message>.*?)\s*\[[^\[\]]*\]\s*$";

static MSVC_WARNING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("{}warning{}", MSVC_LOCATION, MSVC_TAIL)).unwrap()
});

static MSVC_ERROR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("{}(?:fatal\\s+)?error{}", MSVC_LOCATION, MSVC_TAIL)).unwrap()
});

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One classified diagnostic line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    pub severity: Severity,
    /// Compiler/linker code (e.g., "C4244", "LNK2005")
    pub code: String,
    /// Lower-cased `path:line`, or just the path when no line was given
    pub location_key: String,
    /// Message text without the trailing project context
    pub message: String,
}

/// A compiled pattern for one severity
#[derive(Debug, Clone)]
pub struct DiagnosticPattern {
    severity: Severity,
    regex: Regex,
}

impl DiagnosticPattern {
    /// Compile a pattern. `path`, `code` and `message` groups are required;
    /// `line` is optional.
    pub fn new(severity: Severity, pattern: &str) -> Result<Self, PatternError> {
        Self::from_regex(severity, Regex::new(pattern)?)
    }

    fn from_regex(severity: Severity, regex: Regex) -> Result<Self, PatternError> {
        for group in ["path", "code", "message"] {
            if !regex.capture_names().flatten().any(|name| name == group) {
                return Err(PatternError::MissingGroup(group));
            }
        }
        Ok(Self { severity, regex })
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Match a logical line, extracting the record fields.
    pub fn capture(&self, line: &str) -> Option<DiagnosticRecord> {
        let caps = self.regex.captures(line)?;
        let path = caps.name("path")?.as_str().trim();
        let location_key = match caps.name("line") {
            Some(line_no) => format!("{}:{}", path, line_no.as_str()),
            None => path.to_string(),
        }
        .to_lowercase();

        Some(DiagnosticRecord {
            severity: self.severity,
            code: caps.name("code")?.as_str().to_string(),
            location_key,
            message: caps.name("message")?.as_str().trim().to_string(),
        })
    }
}

/// A family of diagnostic formats (one compiler/linker toolchain)
#[derive(Debug, Clone)]
pub struct Dialect {
    name: String,
    markers: Vec<String>,
    warning: DiagnosticPattern,
    error: DiagnosticPattern,
}

impl Dialect {
    /// Build a dialect. A line is only tried against the patterns when it
    /// contains at least one of `markers`.
    pub fn new(
        name: impl Into<String>,
        markers: Vec<String>,
        warning: DiagnosticPattern,
        error: DiagnosticPattern,
    ) -> Self {
        Self {
            name: name.into(),
            markers,
            warning,
            error,
        }
    }

    /// MSVC compiler (`cl.exe`) and linker (`link.exe`) output as relayed
    /// by MSBuild.
    pub fn msvc() -> Self {
        Self {
            name: "msvc".to_string(),
            markers: vec!["warning".to_string(), "error".to_string()],
            warning: DiagnosticPattern {
                severity: Severity::Warning,
                regex: MSVC_WARNING.clone(),
            },
            error: DiagnosticPattern {
                severity: Severity::Error,
                regex: MSVC_ERROR.clone(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cheap check for whether this dialect could match the line.
    pub fn recognizes(&self, line: &str) -> bool {
        self.markers.iter().any(|m| line.contains(m.as_str()))
    }

    /// Classify a line. The warning pattern wins if both would match.
    pub fn classify(&self, line: &str) -> Option<DiagnosticRecord> {
        self.warning
            .capture(line)
            .or_else(|| self.error.capture(line))
    }
}
