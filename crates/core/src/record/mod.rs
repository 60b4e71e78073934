//! Records: sparse field-to-value projections over a format
//!
//! A [`Record`] holds at most one [`Value`] per field of its [`Format`].
//! Storing `None` is the same as removing; there is no stored null.
//!
//! Fields may come from a different format than the record's own. They are
//! then resolved by name, so a record built on one format can be filled from
//! another and keeps working while its format grows.
//!
//! The free functions at the bottom copy, merge and compare records
//! regardless of their concrete container.

mod kv;
mod list;

pub use kv::KvRecord;
pub use list::{ListRecord, Slot};

use crate::error::TranslationError;
use crate::field::Field;
use crate::format::Format;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;

/// Sparse mapping from fields to values
pub trait Record: Send + fmt::Debug {
    /// The format this record draws fields from
    fn format(&self) -> &dyn Format;

    /// Value stored for `field`
    fn get(&self, field: &Field) -> Option<&Value>;

    /// Store `value` for `field`, returning the previous value
    ///
    /// `None` removes the field.
    fn set(&mut self, field: &Field, value: Option<Value>) -> Option<Value>;

    /// Remove `field`, returning its value; absent fields are a no-op
    fn remove(&mut self, field: &Field) -> Option<Value> {
        self.set(field, None)
    }

    /// Number of present fields
    fn count(&self) -> usize;

    /// Remove every value
    fn clear(&mut self);

    /// Present fields and their values, in format order
    fn iter(&self) -> Box<dyn Iterator<Item = (Field, &Value)> + '_>;

    /// Present fields, in format order
    fn fields(&self) -> Vec<Field> {
        self.iter().map(|(field, _)| field).collect()
    }

    /// Empty record sharing this record's format
    fn create_sibling(&self) -> Box<dyn Record>;

    /// Value stored under `name`, without registering the name
    fn get_named(&self, name: &str) -> Option<&Value> {
        let field = self.format().lookup(name)?;
        self.get(&field)
    }

    /// Store `value` under `name`, registering the name if needed
    fn set_named(&mut self, name: &str, value: Option<Value>) -> Option<Value> {
        let field = self.format().field(name);
        self.set(&field, value)
    }
}

/// Copy every field of `from`'s format into `to`, deep-copying values
///
/// Fields absent in `from` are removed from `to`.
pub fn deep_copy_into(from: &dyn Record, to: &mut dyn Record) -> Result<(), TranslationError> {
    for field in from.format().fields() {
        let value = from.get(&field).map(Value::deep_copy).transpose()?;
        to.set_named(field.name(), value);
    }
    Ok(())
}

/// Copy every field of `from`'s format into `to`, cloning values
///
/// Fields absent in `from` are removed from `to`.
pub fn shallow_copy_into(from: &dyn Record, to: &mut dyn Record) {
    for field in from.format().fields() {
        to.set_named(field.name(), from.get(&field).cloned());
    }
}

/// Copy present fields of `from` into `to`
///
/// On a name conflict `to` keeps its own value unless `replace` is set.
pub fn add_all(from: &dyn Record, to: &mut dyn Record, replace: bool) {
    for (field, value) in from.iter() {
        if replace || to.get_named(field.name()).is_none() {
            to.set_named(field.name(), Some(value.clone()));
        }
    }
}

/// Copy present fields of `from` into `to`, appending `suffix` to the name
/// of any field `to` already holds
///
/// Repeated calls may overwrite previously suffixed fields.
pub fn add_all_with_suffix(from: &dyn Record, to: &mut dyn Record, suffix: &str) {
    for (field, value) in from.iter() {
        let name = if to.get_named(field.name()).is_some() {
            format!("{}{}", field.name(), suffix)
        } else {
            field.name().to_string()
        };
        to.set_named(&name, Some(value.clone()));
    }
}

/// Same present field names with equal values
pub fn records_equal(a: &dyn Record, b: &dyn Record) -> bool {
    a.count() == b.count()
        && a
            .iter()
            .all(|(field, value)| b.get_named(field.name()) == Some(value))
}

/// Render every present field as text
///
/// Values without a text view fall back to their display form.
pub fn to_string_map(record: &dyn Record) -> HashMap<String, String> {
    record
        .iter()
        .map(|(field, value)| {
            let text = value.as_string().unwrap_or_else(|_| value.to_string());
            (field.name().to_string(), text)
        })
        .collect()
}
