//! Field handles
//!
//! A [`Field`] names one slot of a [`Format`](crate::format::Format). Handles
//! are cheap to clone (the name is shared) and compare by (name, position),
//! so two formats that happen to place the same name at the same position
//! produce equal fields.

use std::fmt;
use std::sync::Arc;

/// Named, optionally positioned slot in a format
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    name: Arc<str>,
    position: Option<usize>,
}

impl Field {
    /// Positional field, as issued by a list format
    pub fn positional(name: impl Into<Arc<str>>, position: usize) -> Self {
        Field {
            name: name.into(),
            position: Some(position),
        }
    }

    /// Name-only field, as issued by a key/value format
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Field {
            name: name.into(),
            position: None,
        }
    }

    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position within the issuing format, if it is positional
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub(crate) fn shared_name(&self) -> &Arc<str> {
        &self.name
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(p) => write!(f, "{}@{}", self.name, p),
            None => f.write_str(&self.name),
        }
    }
}
