//! Codec configuration
//!
//! Loaded from TOML, typically as one table of a larger application config:
//!
//! ```toml
//! stateless = false
//! max_length = 16777216
//! max_depth = 64
//! ```
//!
//! Every key is optional.

use serde::Deserialize;

/// Codec and stream settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodecConfig {
    /// Streams start stateless sessions: every record carries full names
    #[serde(default)]
    pub stateless: bool,
    /// Largest string/bytes payload or collection count accepted on decode
    #[serde(default = "default_max_length")]
    pub max_length: u64,
    /// Deepest Array/Map/Custom nesting accepted on decode
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_length() -> u64 {
    16 * 1024 * 1024
}
fn default_max_depth() -> usize {
    64
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            stateless: false,
            max_length: default_max_length(),
            max_depth: default_max_depth(),
        }
    }
}

impl CodecConfig {
    /// Parse from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Same settings with stateless sessions
    pub fn stateless(mut self) -> Self {
        self.stateless = true;
        self
    }

    /// Check a decoded length against `max_length`
    pub(crate) fn check_length(&self, length: u64) -> Result<usize, crate::ProtocolError> {
        if length > self.max_length {
            return Err(crate::ProtocolError::LengthLimit {
                length,
                limit: self.max_length,
            });
        }
        usize::try_from(length).map_err(|_| crate::ProtocolError::LengthLimit {
            length,
            limit: self.max_length,
        })
    }
}
