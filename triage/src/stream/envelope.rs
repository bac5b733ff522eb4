//! Envelope repair for the console feed.
//!
//! The feed is a list of records with a trailing comma and no enclosing
//! brackets. [`EnvelopeReader`] wraps the byte source so a JSON decoder sees
//!
//! ```text
//! {"lines":[ <source bytes> {}]}
//! ```
//!
//! The `{}` dummy record absorbs the trailing comma. Wrap the reader in a
//! `BufReader` before handing it to a decoder that reads byte by byte, since
//! the suffix must be written in a single call.

use std::io::{self, Read};

use crate::error::EnvelopeError;

/// Opens the envelope object and its record list.
pub const ENVELOPE_PREFIX: &[u8] = br#"{"lines":["#;

/// Dummy record plus the closers for the list and the object.
pub const ENVELOPE_SUFFIX: &[u8] = b"{}]}";

/// Position of an [`EnvelopeReader`] in its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    /// Nothing written yet (or the prefix is only partially written).
    NotStarted,
    /// Prefix written, source not read yet.
    PrefixEmitted,
    /// Forwarding source bytes.
    Passthrough,
    /// Source exhausted, suffix not written yet.
    Terminating,
    /// Suffix written. Permanent.
    Done,
}

/// `Read` adapter that turns the bare record list into a JSON document.
pub struct EnvelopeReader<R> {
    inner: R,
    state: EnvelopeState,
    prefix_written: usize,
}

impl<R: Read> EnvelopeReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            state: EnvelopeState::NotStarted,
            prefix_written: 0,
        }
    }

    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn emit_prefix(&mut self, buf: &mut [u8]) -> usize {
        let remaining = &ENVELOPE_PREFIX[self.prefix_written..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.prefix_written += n;
        if self.prefix_written == ENVELOPE_PREFIX.len() {
            self.state = EnvelopeState::PrefixEmitted;
        }
        n
    }

    fn terminate(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let needed = ENVELOPE_SUFFIX.len();
        if buf.len() < needed {
            return Err(io::Error::other(EnvelopeError::NoRoomToTerminate {
                needed,
                available: buf.len(),
            }));
        }
        buf[..needed].copy_from_slice(ENVELOPE_SUFFIX);
        self.state = EnvelopeState::Done;
        tracing::trace!("envelope terminated");
        Ok(needed)
    }
}

impl<R: Read> Read for EnvelopeReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            match self.state {
                EnvelopeState::NotStarted => return Ok(self.emit_prefix(buf)),
                EnvelopeState::PrefixEmitted | EnvelopeState::Passthrough => {
                    let n = match self.inner.read(buf) {
                        Ok(n) => n,
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => return Err(e),
                    };
                    if n > 0 {
                        self.state = EnvelopeState::Passthrough;
                        return Ok(n);
                    }
                    // Source exhausted: close the structure in this same call.
                    self.state = EnvelopeState::Terminating;
                }
                EnvelopeState::Terminating => return self.terminate(buf),
                EnvelopeState::Done => return Ok(0),
            }
        }
    }
}

/// Extract the envelope failure carried inside an `io::Error`, if any.
pub fn envelope_error(err: &io::Error) -> Option<&EnvelopeError> {
    err.get_ref()
        .and_then(|inner| inner.downcast_ref::<EnvelopeError>())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(source: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        EnvelopeReader::new(source).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_wraps_record_list() {
        let out = read_all(br#"{"i":0,"t":"a\r\n","dt":"00:00:01","bg":12,"fg":15},"#);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(r#"{"lines":[{"i":0"#));
        assert!(text.ends_with(r#"},{}]}"#));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["lines"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_source_is_still_valid() {
        let out = read_all(b"");
        assert_eq!(out, br#"{"lines":[{}]}"#);
    }

    #[test]
    fn test_state_transitions() {
        let mut reader = EnvelopeReader::new(&b"xy"[..]);
        let mut buf = [0u8; 64];
        assert_eq!(reader.state(), EnvelopeState::NotStarted);

        assert_eq!(reader.read(&mut buf).unwrap(), ENVELOPE_PREFIX.len());
        assert_eq!(reader.state(), EnvelopeState::PrefixEmitted);

        assert_eq!(reader.read(&mut buf).unwrap(), 2);
        assert_eq!(reader.state(), EnvelopeState::Passthrough);

        assert_eq!(reader.read(&mut buf).unwrap(), ENVELOPE_SUFFIX.len());
        assert_eq!(reader.state(), EnvelopeState::Done);

        assert_eq!(reader.read(&mut buf).unwrap(), 0);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
        assert_eq!(reader.state(), EnvelopeState::Done);
    }

    #[test]
    fn test_prefix_spans_small_buffers() {
        let mut reader = EnvelopeReader::new(&b""[..]);
        let mut buf = [0u8; 4];
        let mut prefix = Vec::new();
        while reader.state() == EnvelopeState::NotStarted {
            let n = reader.read(&mut buf).unwrap();
            prefix.extend_from_slice(&buf[..n]);
        }
        assert_eq!(prefix, ENVELOPE_PREFIX);
    }

    #[test]
    fn test_no_room_to_terminate() {
        let mut reader = EnvelopeReader::new(&b""[..]);
        let mut big = [0u8; 64];
        reader.read(&mut big).unwrap();

        let mut small = [0u8; 2];
        let err = reader.read(&mut small).unwrap_err();
        assert_eq!(
            envelope_error(&err),
            Some(&EnvelopeError::NoRoomToTerminate {
                needed: ENVELOPE_SUFFIX.len(),
                available: 2
            })
        );
        assert_eq!(reader.state(), EnvelopeState::Terminating);

        // A roomier buffer can still finish the job
        assert_eq!(reader.read(&mut big).unwrap(), ENVELOPE_SUFFIX.len());
        assert_eq!(reader.state(), EnvelopeState::Done);
    }

    #[test]
    fn test_interrupted_source_is_retried() {
        struct Flaky {
            interrupted: bool,
        }
        impl Read for Flaky {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if !self.interrupted {
                    self.interrupted = true;
                    return Err(io::Error::from(io::ErrorKind::Interrupted));
                }
                buf[0] = b'z';
                Ok(1)
            }
        }

        let mut reader = EnvelopeReader::new(Flaky { interrupted: false });
        let mut buf = [0u8; 64];
        reader.read(&mut buf).unwrap();
        assert_eq!(reader.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], b'z');
    }
}
