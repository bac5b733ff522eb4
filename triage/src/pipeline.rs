//! End-to-end triage of one console feed.

use std::io::{Read, Write};

use serde::Serialize;
use tracing::{debug, info};

use crate::diagnostics::{write_report, Classifier, Dialect, Severity, Summary};
use crate::error::TriageResult;
use crate::stream::{
    decode_fragments, ContinuationPolicy, DecodeOutcome, EnvelopeReader, LineReassembler,
    ProducerChunking,
};

/// Counters for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Records decoded, including the envelope's dummy record
    pub fragments: usize,
    /// Logical lines produced by reassembly
    pub lines: usize,
    pub warning_lines: usize,
    pub error_lines: usize,
    /// How decoding ended
    #[serde(serialize_with = "serialize_outcome")]
    pub decode: DecodeOutcome,
}

fn serialize_outcome<S: serde::Serializer>(
    outcome: &DecodeOutcome,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(outcome)
}

/// Result of a pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct TriageOutcome {
    pub summary: Summary,
    pub stats: RunStats,
}

/// Envelope repair → decode → reassembly → classification
#[derive(Debug, Clone)]
pub struct Pipeline<P = ProducerChunking> {
    policy: P,
    dialects: Vec<Dialect>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(ProducerChunking::default(), vec![Dialect::msvc()])
    }
}

impl<P: ContinuationPolicy + Clone> Pipeline<P> {
    pub fn new(policy: P, dialects: Vec<Dialect>) -> Self {
        Self { policy, dialects }
    }

    /// Triage a raw console feed (the unrepaired record list).
    ///
    /// A malformed or truncated feed still yields everything decoded before
    /// the fault. Only a failure to close the envelope is an error.
    pub fn run<R: Read>(&self, source: R) -> TriageResult<TriageOutcome> {
        let mut reassembler = LineReassembler::with_policy(self.policy.clone());
        let mut classifier = Classifier::with_dialects(self.dialects.clone());
        let mut tally = Tally::default();

        let decode = decode_fragments(EnvelopeReader::new(source), |fragment| {
            tally.fragments += 1;
            for line in reassembler.push(&fragment) {
                tally.observe(&mut classifier, &line);
            }
        })?;

        if !decode.is_complete() {
            debug!(pending = reassembler.pending().len(), "flushing after partial decode");
        }
        for line in reassembler.finish() {
            tally.observe(&mut classifier, &line);
        }

        let summary = classifier.into_summary();
        let stats = RunStats {
            fragments: tally.fragments,
            lines: tally.lines,
            warning_lines: tally.warning_lines,
            error_lines: tally.error_lines,
            decode,
        };

        info!(
            fragments = stats.fragments,
            lines = stats.lines,
            warning_codes = summary.warnings.len(),
            error_codes = summary.errors.len(),
            decode = %stats.decode,
            "console feed triaged"
        );

        Ok(TriageOutcome { summary, stats })
    }

    /// Run and write the text report to `out`.
    pub fn run_to_writer<R: Read, W: Write>(
        &self,
        source: R,
        out: &mut W,
    ) -> TriageResult<TriageOutcome> {
        let outcome = self.run(source)?;
        write_report(out, &outcome.summary)?;
        Ok(outcome)
    }
}

#[derive(Default)]
struct Tally {
    fragments: usize,
    lines: usize,
    warning_lines: usize,
    error_lines: usize,
}

impl Tally {
    fn observe(&mut self, classifier: &mut Classifier, line: &str) {
        self.lines += 1;
        match classifier.observe(line) {
            Some(Severity::Warning) => self.warning_lines += 1,
            Some(Severity::Error) => self.error_lines += 1,
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{ChunkBoundary, Fragment};

    fn record(text: &str) -> String {
        serde_json::json!({"i": 0, "t": text, "dt": "00:00:01", "bg": 12, "fg": 15}).to_string()
            + ","
    }

    #[test]
    fn test_empty_feed() {
        let outcome = Pipeline::default().run(&b""[..]).unwrap();
        assert_eq!(outcome.stats.lines, 0);
        assert_eq!(outcome.stats.fragments, 1);
        assert!(outcome.stats.decode.is_complete());
        assert!(outcome.summary.is_empty());
    }

    #[test]
    fn test_feed_to_report() {
        let feed = [
            record("Build started.\r\n"),
            record("c:\\foo\\bar.cc(61): warning C4244: '=' : conversion from 'SIZE_T' to 'long' [C:\\build\\x.vcxproj]\r\n"),
            record("main.obj : error LNK2019: unresolved external symbol foo [C:\\build\\app.vcxproj]\r\n"),
        ]
        .concat();

        let mut out = Vec::new();
        let outcome = Pipeline::default()
            .run_to_writer(feed.as_bytes(), &mut out)
            .unwrap();

        assert_eq!(outcome.stats.lines, 3);
        assert_eq!(outcome.stats.warning_lines, 1);
        assert_eq!(outcome.stats.error_lines, 1);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "warning C4244 (i.e. \"'=' : conversion from 'SIZE_T' to 'long'\")\n  >> c:/foo/bar.cc:61\nerror LNK2019 (i.e. \"unresolved external symbol foo\")\n  >> main.obj\n"
        );
    }

    #[test]
    fn test_truncated_feed_flushes_pending_text() {
        // Last complete record has no line terminator; the one after is cut.
        let feed = record("c:/a.c(1): warning C4100: unused [p]")
            + r#"{"i":1,"t":"c:/b.c(2): warning"#;

        let outcome = Pipeline::default().run(feed.as_bytes()).unwrap();
        assert!(matches!(outcome.stats.decode, DecodeOutcome::Truncated(_)));
        assert_eq!(outcome.stats.lines, 1);
        assert_eq!(
            outcome.summary.warnings.get("C4100").unwrap().locations(),
            ["c:/a.c:1"]
        );
    }

    #[test]
    fn test_custom_policy_is_used() {
        let one_line = |f: &Fragment| {
            if f.text.is_empty() {
                ChunkBoundary::LineEnd
            } else {
                ChunkBoundary::BufferSplit
            }
        };
        let pipeline = Pipeline::new(one_line, vec![Dialect::msvc()]);
        let feed = record("c:/a.c(1): warning ") + &record("C4100: unused [p]\r\n");

        let outcome = pipeline.run(feed.as_bytes()).unwrap();
        assert_eq!(outcome.stats.lines, 1);
        assert!(outcome.summary.warnings.get("C4100").is_some());
    }
}
