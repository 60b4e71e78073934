//! Stateful binary wire encoding for bundles
//!
//! This crate streams [`Record`](bundlekit_core::Record)s between peers whose
//! field sets may differ or grow over time. Field names and custom type names
//! are sent once per session and by index afterwards.
//!
//! - [`Tag`]: the shared one-byte tag namespace
//! - [`length`]: prefix-length integer encoding
//! - [`Session`]: per-direction [`FieldDictionary`] + [`ClassDictionary`]
//! - [`Codec`]: value and record encode/decode
//! - [`RecordWriter`] / [`RecordReader`]: session-owning stream adapters
//!
//! ## Examples
//!
//! ```
//! use std::sync::Arc;
//! use bundlekit_core::{CustomRegistry, ListFormat, ListRecord, Record, Value};
//! use bundlekit_wire::{Codec, DecodeOutcome, Session};
//!
//! let codec = Codec::new(Arc::new(CustomRegistry::new()));
//!
//! let mut record = ListRecord::new(Arc::new(ListFormat::new()));
//! record.set_named("hits", Some(Value::Integer(3)));
//! let bytes = codec.encode_record_to_vec(&record, &mut Session::new()).unwrap();
//!
//! let mut decoded = ListRecord::new(Arc::new(ListFormat::new()));
//! let outcome = codec
//!     .decode_record_from_slice(&bytes, &mut decoded, &mut Session::new())
//!     .unwrap();
//! assert_eq!(outcome, DecodeOutcome::Record);
//! assert_eq!(decoded.get_named("hits"), Some(&Value::Integer(3)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod length;
pub mod stream;
pub mod tag;

pub use codec::{Codec, DecodeOutcome};
pub use config::CodecConfig;
pub use dictionary::{ClassDictionary, FieldDictionary, Session, SessionState};
pub use error::ProtocolError;
pub use stream::{RecordReader, RecordWriter};
pub use tag::{Tag, LONG_BIG_THRESHOLD};
