//! Protocol errors
//!
//! Decoding is the only direction that can fail on content. Encoding a
//! [`Value`](bundlekit_core::Value) fails only when the underlying writer
//! fails, so encoders return plain [`std::io::Result`].

use bundlekit_core::RehydrationError;
use std::io;
use thiserror::Error;

/// Malformed, truncated or inconsistent input
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Byte is not a known tag
    #[error("unknown tag byte {0}")]
    UnknownTag(u8),

    /// A known tag appeared where it is not allowed
    #[error("unexpected {tag} tag while reading {context}")]
    UnexpectedTag {
        /// Name of the tag found
        tag: &'static str,
        /// What the decoder was reading
        context: &'static str,
    },

    /// FIELD_INDEX referenced an index this session never registered
    #[error("field index {0} is not registered in this session")]
    UnknownFieldIndex(u64),

    /// CUSTOM_INDEX referenced an index this session never registered
    #[error("custom type index {0} is not registered in this session")]
    UnknownClassIndex(u64),

    /// CUSTOM_CLASS announced an index other than the next expected one
    #[error("custom type index conflict for {name:?}: expected {expected}, got {actual}")]
    ClassIndexMismatch {
        /// Type name being registered
        name: String,
        /// Index this session would assign next
        expected: u64,
        /// Index found on the wire
        actual: u64,
    },

    /// Custom value could not be rebuilt
    #[error(transparent)]
    Rehydration(#[from] RehydrationError),

    /// Input ended inside a record or value
    #[error("input ended mid-record")]
    Truncated,

    /// Bytes left in a stream frame after its record ended
    #[error("{0} trailing bytes after record end")]
    TrailingBytes(usize),

    /// String payload is not UTF-8
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,

    /// Length or count above the configured limit
    #[error("length {length} exceeds limit {limit}")]
    LengthLimit {
        /// Length found on the wire
        length: u64,
        /// Configured maximum
        limit: u64,
    },

    /// Nesting deeper than the configured limit
    #[error("nesting deeper than {0}")]
    DepthLimit(usize),

    /// LONG payload above `i64::MAX`, or LONG_NEG magnitude above 2^63
    #[error("integer magnitude {0} does not fit in an i64")]
    MagnitudeOverflow(u64),

    /// Underlying reader failed
    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for ProtocolError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            ProtocolError::Truncated
        } else {
            ProtocolError::Io(e)
        }
    }
}

impl ProtocolError {
    /// Whether the input simply ran out
    pub fn is_truncated(&self) -> bool {
        matches!(self, ProtocolError::Truncated)
    }

    /// Whether the error reflects session dictionary state
    ///
    /// These usually mean the reader joined a stream mid-session or missed
    /// a reset.
    pub fn is_session_mismatch(&self) -> bool {
        matches!(
            self,
            ProtocolError::UnknownFieldIndex(_)
                | ProtocolError::UnknownClassIndex(_)
                | ProtocolError::ClassIndexMismatch { .. }
        )
    }
}

/// Result alias for decoding
pub type Result<T> = std::result::Result<T, ProtocolError>;
