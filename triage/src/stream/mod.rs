//! Console Stream Reconstruction
//!
//! The AppVeyor console endpoint returns its records as a bare,
//! comma-terminated list rather than a JSON document, and the producer splits
//! long output lines into fixed-size chunks. This module undoes both:
//!
//! ```text
//! raw bytes → EnvelopeReader → decode_fragments → LineReassembler → lines
//! ```

pub mod envelope;
pub mod fragments;
pub mod reassembly;

pub use envelope::{EnvelopeReader, EnvelopeState, ENVELOPE_PREFIX, ENVELOPE_SUFFIX};
pub use fragments::{decode_fragments, DecodeOutcome, Fragment};
pub use reassembly::{
    reassemble, ChunkBoundary, ContinuationPolicy, LineReassembler, ProducerChunking,
    PRODUCER_BUFFER_CHUNK_LEN, WRAPPED_LINE_CHUNK_LEN,
};
