//! Rendering a triage outcome for publication.

use chrono::{DateTime, Utc};
use serde::Serialize;
use triage::{render_report, DiagnosticGroups, RunStats, TriageOutcome};

use crate::config::ReportFormat;

/// JSON form of a report.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub build_id: &'a str,
    pub generated_at: DateTime<Utc>,
    pub stats: &'a RunStats,
    pub warnings: &'a DiagnosticGroups,
    pub errors: &'a DiagnosticGroups,
}

impl<'a> JsonReport<'a> {
    pub fn new(build_id: &'a str, outcome: &'a TriageOutcome) -> Self {
        Self {
            build_id,
            generated_at: Utc::now(),
            stats: &outcome.stats,
            warnings: &outcome.summary.warnings,
            errors: &outcome.summary.errors,
        }
    }
}

/// Render `outcome` in `format`.
pub fn render(
    format: ReportFormat,
    build_id: &str,
    outcome: &TriageOutcome,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(render_report(&outcome.summary)),
        ReportFormat::Json => {
            let mut json = serde_json::to_string_pretty(&JsonReport::new(build_id, outcome))?;
            json.push('\n');
            Ok(json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage::Pipeline;

    const FEED: &str = r#"{"i":0,"t":"c:\\src\\a.c(3): warning C4100: 'p': unreferenced formal parameter [c:\\a.vcxproj]\r\n"},"#;

    #[test]
    fn test_text_report() {
        let outcome = Pipeline::default().run(FEED.as_bytes()).unwrap();
        let text = render(ReportFormat::Text, "1.0.1", &outcome).unwrap();
        assert_eq!(
            text,
            "warning C4100 (i.e. \"'p': unreferenced formal parameter\")\n  >> c:/src/a.c:3\n"
        );
    }

    #[test]
    fn test_json_report() {
        let outcome = Pipeline::default().run(FEED.as_bytes()).unwrap();
        let json = render(ReportFormat::Json, "1.0.1", &outcome).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["build_id"], "1.0.1");
        assert_eq!(value["stats"]["warning_lines"], 1);
        assert_eq!(value["stats"]["decode"], "complete");
        assert_eq!(value["warnings"]["C4100"]["locations"][0], "c:/src/a.c:3");
        assert!(value["errors"].as_object().unwrap().is_empty());
        assert!(value["generated_at"].is_string());
    }
}
