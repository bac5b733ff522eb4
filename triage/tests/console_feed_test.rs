//! Integration tests for the triage pipeline
//!
//! These tests feed a captured-style AppVeyor console feed (MSBuild output of
//! a BRL-CAD build) through the full pipeline and check the rendered report.

use std::io::{self, Read};

use triage::stream::{EnvelopeState, ENVELOPE_SUFFIX};
use triage::{
    render_report, DecodeOutcome, EnvelopeError, EnvelopeReader, Pipeline, Severity, TriageError,
};

const FEED: &str = include_str!("fixtures/console_feed.json");

/// Test: the full fixture yields the expected report, exercising the wrapped
/// line, buffer split, duplicate location and fatal error paths together.
#[test]
fn test_fixture_report() {
    let _ = tracing_subscriber::fmt().with_env_filter("debug").with_test_writer().try_init();
    let outcome = Pipeline::default().run(FEED.as_bytes()).unwrap();

    assert_eq!(outcome.stats.decode, DecodeOutcome::Complete);
    assert_eq!(outcome.stats.fragments, 14);
    assert_eq!(outcome.stats.lines, 12);
    assert_eq!(outcome.stats.warning_lines, 4);
    assert_eq!(outcome.stats.error_lines, 2);

    let expected = "\
warning C4244 (i.e. \"'argument': conversion from 'double' to 'int', possible loss of data while evaluating the trimming curve bounding box\")
  >> c:/projects/brlcad/src/librt/primitives/brep/brep.cpp:1520
warning C4305 (i.e. \"'initializing': truncation from 'double' to 'fastf_t'\")
  >> c:/projects/brlcad/src/librt/primitives/tor/tor.c:88
warning C4996 (i.e. \"'strcpy': This function or variable may be unsafe.\")
  >> c:/projects/brlcad/src/libbu/str.c:44
error C1083 (i.e. \"Cannot open include file: 'GL/gl.h': No such file or directory\")
  >> c:/projects/brlcad/src/libdm/dm-ogl.c:12
error LNK2005 (i.e. \"bu_strdup already defined in libbu.lib(a.obj)\")
  >> libbu.lib(str.obj)
";
    assert_eq!(render_report(&outcome.summary), expected);
}

/// Test: same input, same bytes out.
#[test]
fn test_report_is_deterministic() {
    let first = render_report(&Pipeline::default().run(FEED.as_bytes()).unwrap().summary);
    let second = render_report(&Pipeline::default().run(FEED.as_bytes()).unwrap().summary);
    assert_eq!(first, second);
}

/// Test: a feed cut mid-record keeps everything decoded before the cut.
#[test]
fn test_cut_feed_keeps_prefix() {
    let _ = tracing_subscriber::fmt().with_env_filter("debug").with_test_writer().try_init();
    let cut = FEED.find("libbu.lib(str.obj)").unwrap();
    let outcome = Pipeline::default().run(FEED[..cut].as_bytes()).unwrap();

    assert!(matches!(outcome.stats.decode, DecodeOutcome::Truncated(_)));
    assert_eq!(outcome.summary.warnings.len(), 3);
    assert!(outcome.summary.errors.is_empty());
}

/// Test: the separation invariant holds over the whole fixture.
#[test]
fn test_no_code_is_both_warning_and_error() {
    let summary = Pipeline::default().run(FEED.as_bytes()).unwrap().summary;
    for code in summary.groups(Severity::Warning).codes() {
        assert!(summary.groups(Severity::Error).get(code).is_none());
    }
}

/// Test: a reader that can't hand the envelope a large enough buffer aborts
/// the run instead of silently dropping the closing tokens.
#[test]
fn test_unterminated_envelope_is_fatal() {
    /// Hands the decoder at most two bytes per call.
    struct Narrow<R>(R);

    impl<R: Read> Read for Narrow<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = buf.len().min(2);
            self.0.read(&mut buf[..len])
        }
    }

    let mut reader = Narrow(EnvelopeReader::new(&b""[..]));
    let mut buf = [0u8; 16];
    let err = loop {
        match reader.read(&mut buf) {
            Ok(0) => panic!("envelope ended without its suffix"),
            Ok(_) => continue,
            Err(e) => break e,
        }
    };
    let envelope = err
        .get_ref()
        .and_then(|e| e.downcast_ref::<EnvelopeError>())
        .unwrap();
    assert_eq!(
        envelope,
        &EnvelopeError::NoRoomToTerminate {
            needed: ENVELOPE_SUFFIX.len(),
            available: 2
        }
    );
    assert_eq!(reader.0.state(), EnvelopeState::Terminating);

    let fatal = TriageError::from(envelope.clone());
    assert!(fatal.to_string().contains("no room to terminate structure"));
}
