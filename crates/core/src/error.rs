//! Error types for the bundle value model
//!
//! Two failure families live here:
//!
//! - [`TranslationError`]: a value cannot be viewed as the requested kind.
//!   Local and recoverable; callers doing speculative conversions handle it.
//! - [`RehydrationError`]: a custom value could not be rebuilt from its
//!   type name and map projection.

use crate::value::ValueKind;
use thiserror::Error;

/// A value could not be viewed as another kind
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TranslationError {
    /// The conversion is not defined between these kinds
    #[error("cannot view {from} as {to}")]
    Unsupported {
        /// Kind of the source value
        from: ValueKind,
        /// Requested kind
        to: ValueKind,
    },

    /// Text could not be parsed as a number
    #[error("cannot parse {input:?} as {to}: {reason}")]
    Parse {
        /// Offending text
        input: String,
        /// Requested kind
        to: ValueKind,
        /// Parser message
        reason: String,
    },

    /// A byte view needs an exact width
    #[error("cannot view {actual} bytes as {to}: expected exactly {expected}")]
    ByteWidth {
        /// Requested kind
        to: ValueKind,
        /// Required width
        expected: usize,
        /// Width found
        actual: usize,
    },

    /// Arithmetic needs an Integer or Float receiver
    #[error("{0} is not numeric")]
    NotNumeric(ValueKind),

    /// A custom value refused its own map projection
    #[error("custom value {type_name} rejected its map: {reason}")]
    CustomLoad {
        /// Fully-qualified custom type name
        type_name: String,
        /// Why the load failed
        reason: String,
    },
}

impl TranslationError {
    pub(crate) fn unsupported(from: ValueKind, to: ValueKind) -> Self {
        TranslationError::Unsupported { from, to }
    }

    pub(crate) fn parse(input: &str, to: ValueKind, reason: impl ToString) -> Self {
        TranslationError::Parse {
            input: input.to_string(),
            to,
            reason: reason.to_string(),
        }
    }
}

/// A custom value could not be reconstructed
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RehydrationError {
    /// No factory is registered for this type name
    #[error("no custom type registered as {0:?}")]
    UnknownType(String),

    /// The factory built an instance but loading the map failed
    #[error("failed to load custom type {type_name:?}: {source}")]
    Load {
        /// Fully-qualified custom type name
        type_name: String,
        /// Underlying translation failure
        #[source]
        source: TranslationError,
    },
}
