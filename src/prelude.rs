//! Convenient imports for bundlekit.
//!
//! ```
//! use bundlekit::prelude::*;
//! use std::sync::Arc;
//!
//! let codec = Codec::new(Arc::new(CustomRegistry::new()));
//! let mut record = ListRecord::new(Arc::new(ListFormat::new()));
//! record.set_named("k", Some(Value::from("v")));
//! let mut writer = RecordWriter::new(codec, Vec::new());
//! writer.write(&record).unwrap();
//! ```

// Error handling
pub use crate::error::{Error, Result};

// Value model
pub use bundlekit_core::{CustomRegistry, CustomValue, Value, ValueKind, ValueMap};

// Formats and records
pub use bundlekit_core::{Field, Format, KvFormat, KvRecord, ListFormat, ListRecord, Record};

// Wire
pub use bundlekit_wire::{Codec, CodecConfig, DecodeOutcome, RecordReader, RecordWriter, Session};
