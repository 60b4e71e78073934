//! Name-keyed format

use super::{Format, FormatVersion};
use crate::field::Field;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
struct Registry {
    by_name: HashMap<Arc<str>, usize>,
    fields: Vec<Field>,
    version: u64,
}

/// Field registry whose fields carry no position
///
/// Records on this format store values by name, so a field issued here is
/// interchangeable with any other field of the same name. Creation order is
/// still tracked for iteration.
#[derive(Default)]
pub struct KvFormat {
    inner: RwLock<Registry>,
}

impl KvFormat {
    /// Empty format
    pub fn new() -> Self {
        KvFormat::default()
    }
}

impl Format for KvFormat {
    fn field(&self, name: &str) -> Field {
        if let Some(field) = self.lookup(name) {
            return field;
        }
        let mut registry = self.inner.write();
        // Another writer may have created it between the two locks
        if let Some(&i) = registry.by_name.get(name) {
            return registry.fields[i].clone();
        }
        let field = Field::named(name);
        let index = registry.fields.len();
        registry.by_name.insert(Arc::clone(field.shared_name()), index);
        registry.fields.push(field.clone());
        registry.version += 1;
        debug!(field = %field, version = registry.version, "created field");
        field
    }

    fn lookup(&self, name: &str) -> Option<Field> {
        let registry = self.inner.read();
        registry.by_name.get(name).map(|&i| registry.fields[i].clone())
    }

    fn field_at(&self, index: usize) -> Option<Field> {
        self.inner.read().fields.get(index).cloned()
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.inner.read().by_name.get(name).copied()
    }

    fn field_count(&self) -> usize {
        self.inner.read().fields.len()
    }

    fn version(&self) -> FormatVersion {
        FormatVersion(self.inner.read().version)
    }

    fn fields(&self) -> Vec<Field> {
        self.inner.read().fields.clone()
    }
}

impl fmt::Debug for KvFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.inner.read();
        let names: Vec<&str> = registry.fields.iter().map(Field::name).collect();
        f.debug_struct("KvFormat")
            .field("fields", &names)
            .field("version", &registry.version)
            .finish()
    }
}
