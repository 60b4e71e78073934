//! Unified error types for bundlekit.
//!
//! Each layer has its own error enum; this module wraps them so applications
//! can use one `Result` across value handling, decoding and configuration.

use thiserror::Error;

pub use bundlekit_core::{RehydrationError, TranslationError};
pub use bundlekit_wire::ProtocolError;

/// All bundlekit errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A value could not be viewed as the requested kind
    #[error(transparent)]
    Translation(#[from] TranslationError),

    /// A custom value could not be rebuilt
    #[error(transparent)]
    Rehydration(#[from] RehydrationError),

    /// Malformed or inconsistent wire input
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// I/O error while encoding
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for bundlekit operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a wire protocol error.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Error::Protocol(_))
    }

    /// Check if this is a value translation error.
    ///
    /// Translation errors are local: the value is fine, it just has no view
    /// as the requested kind.
    pub fn is_translation(&self) -> bool {
        matches!(self, Error::Translation(_))
    }

    /// Check if the stream ended mid-record.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Error::Protocol(e) if e.is_truncated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundlekit_core::{Value, ValueKind};

    #[test]
    fn test_from_translation() {
        let err: Error = Value::Bytes(vec![1]).as_string().unwrap_err().into();
        assert!(err.is_translation());
        assert!(!err.is_protocol());
    }

    #[test]
    fn test_from_protocol() {
        let err: Error = ProtocolError::Truncated.into();
        assert!(err.is_protocol());
        assert!(err.is_truncated());
    }

    #[test]
    fn test_from_config() {
        let err: Error = bundlekit_wire::CodecConfig::from_toml_str("max_depth = \"x\"")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_transparent_display() {
        let err: Error = TranslationError::NotNumeric(ValueKind::Map).into();
        assert_eq!(err.to_string(), "Map is not numeric");
    }
}
