//! Positional format backed by copy-on-write snapshots
//!
//! Readers load the current snapshot without locking. Writers build a new
//! snapshot from the one they loaded and publish it with a compare-and-swap;
//! a writer that loses the race reloads and tries again. Since the loser
//! re-checks for its name after reloading, two threads creating the same name
//! concurrently end up with one field between them.

use super::{Format, FormatVersion};
use crate::field::Field;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
struct Snapshot {
    by_name: HashMap<Arc<str>, usize>,
    fields: Vec<Field>,
    version: u64,
}

impl Snapshot {
    fn get(&self, name: &str) -> Option<&Field> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    fn with_field(&self, name: &str) -> (Snapshot, Field) {
        let position = self.fields.len();
        let field = Field::positional(name, position);
        let mut by_name = self.by_name.clone();
        by_name.insert(Arc::clone(field.shared_name()), position);
        let mut fields = self.fields.clone();
        fields.push(field.clone());
        let next = Snapshot {
            by_name,
            fields,
            version: self.version + 1,
        };
        (next, field)
    }
}

/// Positional field registry
///
/// Fields are numbered 0, 1, 2, ... in creation order and that number is the
/// field's position in every [`ListRecord`](crate::record::ListRecord) built on
/// this format.
pub struct ListFormat {
    state: ArcSwap<Snapshot>,
}

impl ListFormat {
    /// Empty format
    pub fn new() -> Self {
        ListFormat {
            state: ArcSwap::from_pointee(Snapshot::default()),
        }
    }

    /// Format pre-populated with `names`, in order
    pub fn with_fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let format = ListFormat::new();
        for name in names {
            format.field(name.as_ref());
        }
        format
    }

    /// Atomically create a field whose name starts with `prefix` and has
    /// never been used in this format
    ///
    /// Names are tried as `prefix0`, `prefix1`, ... starting from the current
    /// field count.
    pub fn create_new_field(&self, prefix: &str) -> Field {
        loop {
            let current = self.state.load_full();
            let mut n = current.fields.len();
            let name = loop {
                let candidate = format!("{}{}", prefix, n);
                if current.get(&candidate).is_none() {
                    break candidate;
                }
                n += 1;
            };
            if let Some(field) = self.publish(&current, &name) {
                return field;
            }
        }
    }

    /// Get or create `name`, returning the field and its position
    pub(crate) fn resolve(&self, name: &str) -> (Field, usize) {
        loop {
            let current = self.state.load_full();
            if let Some(&i) = current.by_name.get(name) {
                return (current.fields[i].clone(), i);
            }
            if let Some(field) = self.publish(&current, name) {
                return (field, current.fields.len());
            }
        }
    }

    /// Try to publish `current` plus `name`; `None` if another writer won
    fn publish(&self, current: &Arc<Snapshot>, name: &str) -> Option<Field> {
        let (next, field) = current.with_field(name);
        let version = next.version;
        let previous = self.state.compare_and_swap(current, Arc::new(next));
        if Arc::ptr_eq(&previous, current) {
            debug!(field = %field, version, "created field");
            Some(field)
        } else {
            None
        }
    }
}

impl Default for ListFormat {
    fn default() -> Self {
        ListFormat::new()
    }
}

impl Format for ListFormat {
    fn field(&self, name: &str) -> Field {
        self.resolve(name).0
    }

    fn lookup(&self, name: &str) -> Option<Field> {
        self.state.load().get(name).cloned()
    }

    fn field_at(&self, index: usize) -> Option<Field> {
        self.state.load().fields.get(index).cloned()
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.state.load().by_name.get(name).copied()
    }

    fn field_count(&self) -> usize {
        self.state.load().fields.len()
    }

    fn version(&self) -> FormatVersion {
        FormatVersion(self.state.load().version)
    }

    fn fields(&self) -> Vec<Field> {
        self.state.load().fields.clone()
    }
}

impl fmt::Debug for ListFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.state.load();
        let names: Vec<&str> = snapshot.fields.iter().map(Field::name).collect();
        f.debug_struct("ListFormat")
            .field("fields", &names)
            .field("version", &snapshot.version)
            .finish()
    }
}
