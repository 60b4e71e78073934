//! Value model for bundles
//!
//! This crate defines everything a bundle is made of, independent of how it is
//! transmitted:
//!
//! - [`Value`]: the closed, polymorphic value type, with cross-kind views that
//!   either succeed or fail with a [`TranslationError`]
//! - [`CustomValue`] / [`CustomRegistry`]: application-defined values that
//!   project to a map and are rebuilt from (type name, map)
//! - [`Field`] / [`Format`]: append-only field registries ([`ListFormat`],
//!   [`KvFormat`])
//! - [`Record`]: sparse field-to-value projections ([`ListRecord`],
//!   [`KvRecord`]) plus copy/merge/compare helpers
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use bundlekit_core::{Format, ListFormat, ListRecord, Record, Value};
//!
//! let format = Arc::new(ListFormat::new());
//! let mut record = ListRecord::new(Arc::clone(&format));
//!
//! let hits = format.field("hits");
//! record.set(&hits, Some(Value::from(3i64)));
//! assert_eq!(record.get(&hits), Some(&Value::Integer(3)));
//! assert_eq!(record.count(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod custom;
pub mod error;
pub mod field;
pub mod format;
pub mod record;
pub mod value;

pub use custom::{CustomFactory, CustomRegistry, CustomValue};
pub use error::{RehydrationError, TranslationError};
pub use field::Field;
pub use format::{Format, FormatVersion, KvFormat, ListFormat};
pub use record::{
    add_all, add_all_with_suffix, deep_copy_into, records_equal, shallow_copy_into, to_string_map,
    KvRecord, ListRecord, Record, Slot,
};
pub use value::{is_empty, Value, ValueKind, ValueMap};
