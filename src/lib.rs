//! # bundlekit
//!
//! Self-describing, schema-flexible records ("bundles") and a stateful binary
//! encoding for streaming them between producers and consumers whose field
//! sets may differ or evolve.
//!
//! ## Quick Start
//!
//! ```
//! use bundlekit::prelude::*;
//! use std::io::Cursor;
//! use std::sync::Arc;
//!
//! let codec = Codec::new(Arc::new(CustomRegistry::new()));
//!
//! // Producer
//! let format = Arc::new(ListFormat::new());
//! let mut writer = RecordWriter::new(codec.clone(), Vec::new());
//! for n in 0..3i64 {
//!     let mut record = ListRecord::new(Arc::clone(&format));
//!     record.set_named("n", Some(Value::Integer(n)));
//!     writer.write(&record)?;
//! }
//! let bytes = writer.into_inner();
//!
//! // Consumer, with its own format
//! let template = ListRecord::new(Arc::new(ListFormat::new()));
//! let reader = RecordReader::new(codec, Cursor::new(bytes), &template);
//! let records = reader.collect::<std::result::Result<Vec<_>, _>>()?;
//! assert_eq!(records[2].get_named("n"), Some(&Value::Integer(2)));
//! # Ok::<(), bundlekit::Error>(())
//! ```
//!
//! ## Layers
//!
//! - [`model`]: values, custom types, formats, records
//! - [`wire`]: tags, session dictionaries, codec, stream reader/writer

#![warn(missing_docs)]

mod error;

pub mod prelude;

pub use bundlekit_core as model;
pub use bundlekit_wire as wire;

pub use error::{Error, ProtocolError, RehydrationError, Result, TranslationError};

/// Load a [`wire::CodecConfig`] from TOML text
pub fn load_codec_config(text: &str) -> Result<wire::CodecConfig> {
    Ok(wire::CodecConfig::from_toml_str(text)?)
}
