//! Streaming decoder for repaired console envelopes.
//!
//! Records are handed to the sink one at a time as they are parsed, so a
//! malformed record late in the feed never costs the records before it.

use std::fmt;
use std::io::{self, BufReader, Read};

use serde::de::{DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use tracing::{debug, warn};

use crate::error::{TriageError, TriageResult};
use crate::stream::envelope::envelope_error;

/// Key under which the envelope stores the record list.
const LINES_KEY: &str = "lines";

/// One console record as sent by the producer.
///
/// Every field defaults, so the `{}` dummy appended by the envelope decodes
/// to an empty fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fragment {
    /// Producer-side sequence number. Arrival order is authoritative.
    #[serde(rename = "i")]
    pub index: i64,
    /// Raw text chunk, including any line terminators.
    #[serde(rename = "t")]
    pub text: String,
    /// Elapsed time stamp (`hh:mm:ss`).
    #[serde(rename = "dt")]
    pub timestamp: String,
    #[serde(rename = "bg")]
    pub background: i32,
    #[serde(rename = "fg")]
    pub foreground: i32,
}

impl Fragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// How decoding of the envelope ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The whole envelope decoded.
    Complete,
    /// Input ended inside a record.
    Truncated(String),
    /// A record or the envelope itself was malformed.
    Malformed(String),
}

impl DecodeOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl fmt::Display for DecodeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::Truncated(reason) => write!(f, "truncated: {}", reason),
            Self::Malformed(reason) => write!(f, "malformed: {}", reason),
        }
    }
}

/// Decode a repaired envelope, passing each fragment to `sink` in order.
///
/// Decoding failures are reported through [`DecodeOutcome`]; only a failure
/// to close the envelope is returned as an error.
pub fn decode_fragments<R, F>(reader: R, mut sink: F) -> TriageResult<DecodeOutcome>
where
    R: Read,
    F: FnMut(Fragment),
{
    let mut de = serde_json::Deserializer::from_reader(BufReader::new(reader));
    let result = EnvelopeSeed { sink: &mut sink }
        .deserialize(&mut de)
        .and_then(|()| de.end());

    match result {
        Ok(()) => Ok(DecodeOutcome::Complete),
        Err(err) => classify_failure(err),
    }
}

fn classify_failure(err: serde_json::Error) -> TriageResult<DecodeOutcome> {
    match err.classify() {
        Category::Eof => {
            debug!(error = %err, "console feed ended inside a record");
            Ok(DecodeOutcome::Truncated(err.to_string()))
        }
        Category::Io => {
            let io_err = io::Error::from(err);
            if let Some(envelope) = envelope_error(&io_err) {
                return Err(TriageError::Envelope(envelope.clone()));
            }
            warn!(error = %io_err, "console feed read failed, keeping decoded prefix");
            Ok(DecodeOutcome::Malformed(io_err.to_string()))
        }
        _ => {
            warn!(error = %err, "malformed console record, keeping decoded prefix");
            Ok(DecodeOutcome::Malformed(err.to_string()))
        }
    }
}

/// Visits the envelope object, streaming its `lines` list.
struct EnvelopeSeed<'a, F> {
    sink: &'a mut F,
}

impl<'de, F: FnMut(Fragment)> DeserializeSeed<'de> for EnvelopeSeed<'_, F> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de, F: FnMut(Fragment)> Visitor<'de> for EnvelopeSeed<'_, F> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a console envelope object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<(), A::Error> {
        while let Some(key) = map.next_key::<String>()? {
            if key == LINES_KEY {
                map.next_value_seed(FragmentListSeed {
                    sink: &mut *self.sink,
                })?;
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(())
    }
}

struct FragmentListSeed<'a, F> {
    sink: &'a mut F,
}

impl<'de, F: FnMut(Fragment)> DeserializeSeed<'de> for FragmentListSeed<'_, F> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_seq(self)
    }
}

impl<'de, F: FnMut(Fragment)> Visitor<'de> for FragmentListSeed<'_, F> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a list of console records")
    }

    fn visit_seq<A: SeqAccess<'de>>(mut self, mut seq: A) -> Result<(), A::Error> {
        while let Some(fragment) = seq.next_element::<Fragment>()? {
            (self.sink)(fragment);
        }
        Ok(())
    }
}
