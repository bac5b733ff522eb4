//! Logical line reassembly.
//!
//! The console producer does not send one record per output line. Two
//! artifacts have been observed in AppVeyor feeds of CMake/MSBuild builds:
//!
//! - Output lines longer than 229 characters arrive as 231-byte records
//!   (229 characters plus an injected `\r\n`) followed by the remainder. The
//!   injected terminator is not a real line break.
//! - Records exactly 1024 bytes long are cuts of the producer's fixed buffer
//!   and continue in the next record.
//!
//! Both rules were reverse-engineered from one producer and match the two
//! lengths exactly. A different producer (or a different version of this
//! one) may chunk differently, in which case lines will be mis-joined. Swap
//! the [`ContinuationPolicy`] rather than editing [`LineReassembler`].

use super::fragments::Fragment;

/// Record length of a wrapped output line: 229 characters plus `\r\n`.
pub const WRAPPED_LINE_CHUNK_LEN: usize = 231;

/// Record length of a cut through the producer's output buffer.
pub const PRODUCER_BUFFER_CHUNK_LEN: usize = 1024;

/// What a fragment's end means for line reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkBoundary {
    /// The fragment ends where the producer meant it to end.
    LineEnd,
    /// The fragment ends in a synthetic `\r\n` that must be removed.
    WrappedLine,
    /// The fragment was cut mid-line; keep accumulating.
    BufferSplit,
}

/// Decides whether a fragment continues into the next one.
pub trait ContinuationPolicy {
    fn classify(&self, fragment: &Fragment) -> ChunkBoundary;
}

impl<F> ContinuationPolicy for F
where
    F: Fn(&Fragment) -> ChunkBoundary,
{
    fn classify(&self, fragment: &Fragment) -> ChunkBoundary {
        self(fragment)
    }
}

/// Length-based chunk detection for the AppVeyor console producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducerChunking {
    /// Byte length of records that carry a synthetic line break.
    pub wrapped_line_len: usize,
    /// Byte length of records cut by the producer's buffer.
    pub buffer_len: usize,
}

impl Default for ProducerChunking {
    fn default() -> Self {
        Self {
            wrapped_line_len: WRAPPED_LINE_CHUNK_LEN,
            buffer_len: PRODUCER_BUFFER_CHUNK_LEN,
        }
    }
}

impl ContinuationPolicy for ProducerChunking {
    fn classify(&self, fragment: &Fragment) -> ChunkBoundary {
        let len = fragment.text.len();
        if len == self.wrapped_line_len {
            ChunkBoundary::WrappedLine
        } else if len == self.buffer_len {
            ChunkBoundary::BufferSplit
        } else {
            ChunkBoundary::LineEnd
        }
    }
}

/// Joins fragments into logical lines.
///
/// Backslashes are rewritten to `/` on the way in, so every path seen
/// downstream uses a single separator.
#[derive(Debug, Default)]
pub struct LineReassembler<P = ProducerChunking> {
    policy: P,
    pending: String,
}

impl LineReassembler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: ContinuationPolicy> LineReassembler<P> {
    pub fn with_policy(policy: P) -> Self {
        Self {
            policy,
            pending: String::new(),
        }
    }

    /// Text received but not yet emitted as a line.
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Feed the next fragment, returning any lines it completes.
    pub fn push(&mut self, fragment: &Fragment) -> Vec<String> {
        let boundary = self.policy.classify(fragment);
        self.pending.push_str(&fragment.text.replace('\\', "/"));

        match boundary {
            ChunkBoundary::WrappedLine => {
                if self.pending.ends_with("\r\n") {
                    self.pending.truncate(self.pending.len() - 2);
                }
                Vec::new()
            }
            ChunkBoundary::BufferSplit => Vec::new(),
            ChunkBoundary::LineEnd => self.take_complete_lines(),
        }
    }

    /// Emit whatever is still pending. Consumes the reassembler.
    pub fn finish(mut self) -> Vec<String> {
        if self.pending.is_empty() {
            return Vec::new();
        }
        split_lines(&std::mem::take(&mut self.pending))
    }

    fn take_complete_lines(&mut self) -> Vec<String> {
        let Some(last_break) = self.pending.rfind('\n') else {
            return Vec::new();
        };
        let rest = self.pending.split_off(last_break + 1);
        let complete = std::mem::replace(&mut self.pending, rest);
        split_lines(&complete)
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_owned).collect()
}

/// Reassemble a complete fragment sequence with the default policy.
pub fn reassemble<I>(fragments: I) -> Vec<String>
where
    I: IntoIterator<Item = Fragment>,
{
    let mut reassembler = LineReassembler::new();
    let mut lines = Vec::new();
    for fragment in fragments {
        lines.extend(reassembler.push(&fragment));
    }
    lines.extend(reassembler.finish());
    lines
}
