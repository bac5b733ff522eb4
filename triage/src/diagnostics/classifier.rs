//! Diagnostic classification and grouping
//!
//! Lines are matched against the configured dialects, and each hit lands in
//! the warning or error collection under its code. A code keeps the message
//! of its first occurrence; repeated locations are dropped.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::trace;

use super::pattern::{DiagnosticRecord, Dialect, Severity};

/// All occurrences of one diagnostic code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticGroup {
    /// Message of the first occurrence. Never overwritten.
    pub example_message: String,
    /// Unique location keys in first-seen order
    locations: Vec<String>,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl DiagnosticGroup {
    pub fn new(example_message: impl Into<String>) -> Self {
        Self {
            example_message: example_message.into(),
            ..Self::default()
        }
    }

    /// Add a location. Returns false if it was already recorded.
    pub fn insert(&mut self, location_key: &str) -> bool {
        if self.seen.contains(location_key) {
            return false;
        }
        self.seen.insert(location_key.to_string());
        self.locations.push(location_key.to_string());
        true
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// Groups keyed by code, iterated in ascending ordinal order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiagnosticGroups(BTreeMap<String, DiagnosticGroup>);

impl DiagnosticGroups {
    /// Add a record, creating its group on first sight of the code.
    /// Returns true if the location was new for that code.
    pub fn record(&mut self, record: &DiagnosticRecord) -> bool {
        self.0
            .entry(record.code.clone())
            .or_insert_with(|| DiagnosticGroup::new(record.message.as_str()))
            .insert(&record.location_key)
    }

    pub fn get(&self, code: &str) -> Option<&DiagnosticGroup> {
        self.0.get(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DiagnosticGroup)> {
        self.0.iter().map(|(code, group)| (code.as_str(), group))
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of distinct codes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of unique locations across all codes
    pub fn location_count(&self) -> usize {
        self.0.values().map(DiagnosticGroup::len).sum()
    }
}

/// Warning and error collections for one run. The two never share groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub warnings: DiagnosticGroups,
    pub errors: DiagnosticGroups,
}

impl Summary {
    pub fn groups(&self, severity: Severity) -> &DiagnosticGroups {
        match severity {
            Severity::Warning => &self.warnings,
            Severity::Error => &self.errors,
        }
    }

    fn groups_mut(&mut self, severity: Severity) -> &mut DiagnosticGroups {
        match severity {
            Severity::Warning => &mut self.warnings,
            Severity::Error => &mut self.errors,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }
}

/// Accumulates classified lines into a [`Summary`]
#[derive(Debug, Clone)]
pub struct Classifier {
    dialects: Vec<Dialect>,
    summary: Summary,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    /// Classifier for MSVC output.
    pub fn new() -> Self {
        Self::with_dialects(vec![Dialect::msvc()])
    }

    pub fn with_dialects(dialects: Vec<Dialect>) -> Self {
        Self {
            dialects,
            summary: Summary::default(),
        }
    }

    /// Classify one logical line. Returns the severity it was filed under,
    /// or `None` if it is not a diagnostic.
    pub fn observe(&mut self, line: &str) -> Option<Severity> {
        let record = self
            .dialects
            .iter()
            .filter(|d| d.recognizes(line))
            .find_map(|d| d.classify(line))?;

        let added = self.summary.groups_mut(record.severity).record(&record);
        trace!(
            severity = %record.severity,
            code = %record.code,
            location = %record.location_key,
            added,
            "diagnostic"
        );
        Some(record.severity)
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn into_summary(self) -> Summary {
        self.summary
    }
}
