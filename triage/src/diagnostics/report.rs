//! Text report rendering
//!
//! ```text
//! warning C4244 (i.e. "'=' : conversion from 'SIZE_T' to 'long'")
//!   >> c:/foo/bar.cc:61
//! ```

use std::io::{self, Write};

use super::classifier::{DiagnosticGroups, Summary};
use super::pattern::Severity;

/// Write one severity's groups, codes ascending, locations in first-seen
/// order. Blank locations are skipped.
pub fn write_groups<W: Write>(
    out: &mut W,
    severity: Severity,
    groups: &DiagnosticGroups,
) -> io::Result<()> {
    for (code, group) in groups.iter() {
        writeln!(
            out,
            "{} {} (i.e. \"{}\")",
            severity, code, group.example_message
        )?;
        for location in group.locations() {
            if location.trim().is_empty() {
                continue;
            }
            writeln!(out, "  >> {}", location)?;
        }
    }
    Ok(())
}

/// Write warnings, then errors, to the same destination.
pub fn write_report<W: Write>(out: &mut W, summary: &Summary) -> io::Result<()> {
    write_groups(out, Severity::Warning, &summary.warnings)?;
    write_groups(out, Severity::Error, &summary.errors)
}

/// Render the full report to a string.
pub fn render_report(summary: &Summary) -> String {
    let mut buf = Vec::new();
    write_report(&mut buf, summary).expect("writing to a Vec cannot fail");
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Classifier;

    fn summary_of(lines: &[&str]) -> Summary {
        let mut classifier = Classifier::new();
        for line in lines {
            classifier.observe(line);
        }
        classifier.into_summary()
    }

    #[test]
    fn test_single_warning() {
        let summary = summary_of(&[
            "c:/foo/bar.cc(61): warning C4244: '=' : conversion from 'SIZE_T' to 'long' [C:/build/x.vcxproj]",
        ]);

        assert_eq!(
            render_report(&summary),
            "warning C4244 (i.e. \"'=' : conversion from 'SIZE_T' to 'long'\")\n  >> c:/foo/bar.cc:61\n"
        );
    }

    #[test]
    fn test_warnings_before_errors_sorted_by_code() {
        let summary = summary_of(&[
            "main.obj : error LNK2019: unresolved external symbol foo [app]",
            "c:/b.c(2): warning C4996: 'strcpy': unsafe [p]",
            "c:/a.c(1): error C2065: 'x': undeclared identifier [p]",
            "c:/a.c(9): warning C4244: narrowing [p]",
            "c:/c.c(3): warning C4244: other text [p]",
        ]);

        let expected = "\
warning C4244 (i.e. \"narrowing\")
  >> c:/a.c:9
  >> c:/c.c:3
warning C4996 (i.e. \"'strcpy': unsafe\")
  >> c:/b.c:2
error C2065 (i.e. \"'x': undeclared identifier\")
  >> c:/a.c:1
error LNK2019 (i.e. \"unresolved external symbol foo\")
  >> main.obj
";
        assert_eq!(render_report(&summary), expected);
    }

    #[test]
    fn test_blank_location_skipped() {
        let summary = summary_of(&[" : error LNK1120: 1 unresolved externals [c:/b/app.vcxproj]"]);
        assert_eq!(summary.errors.get("LNK1120").unwrap().locations(), [""]);
        assert_eq!(
            render_report(&summary),
            "error LNK1120 (i.e. \"1 unresolved externals\")\n"
        );
    }

    #[test]
    fn test_empty_summary_renders_nothing() {
        assert_eq!(render_report(&Summary::default()), "");
    }

    #[test]
    fn test_output_is_stable_across_runs() {
        let lines = [
            "c:/z.c(1): warning C4701: a [p]",
            "c:/y.c(1): warning C4100: b [p]",
            "c:/x.c(1): warning C4456: c [p]",
        ];
        let first = render_report(&summary_of(&lines));
        for _ in 0..5 {
            assert_eq!(render_report(&summary_of(&lines)), first);
        }
    }
}
