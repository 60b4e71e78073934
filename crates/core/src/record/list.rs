//! Positional record over a [`ListFormat`]

use super::Record;
use crate::field::Field;
use crate::format::{Format, ListFormat};
use crate::value::Value;
use std::sync::Arc;

/// One position of a [`ListRecord`]
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Slot {
    /// Nothing stored
    #[default]
    Absent,
    /// A stored value
    Present(Value),
}

impl Slot {
    /// Borrow the stored value
    pub fn value(&self) -> Option<&Value> {
        match self {
            Slot::Present(v) => Some(v),
            Slot::Absent => None,
        }
    }

    fn take(&mut self) -> Option<Value> {
        match std::mem::take(self) {
            Slot::Present(v) => Some(v),
            Slot::Absent => None,
        }
    }
}

/// Dense record indexed by field position
///
/// The slot vector grows lazily to the highest position written, so a record
/// created before its format grew still accepts the new fields.
#[derive(Debug, Clone)]
pub struct ListRecord {
    format: Arc<ListFormat>,
    slots: Vec<Slot>,
    count: usize,
}

impl ListRecord {
    /// Empty record on `format`
    pub fn new(format: Arc<ListFormat>) -> Self {
        ListRecord {
            format,
            slots: Vec::new(),
            count: 0,
        }
    }

    /// Shared handle to the format
    pub fn list_format(&self) -> &Arc<ListFormat> {
        &self.format
    }

    /// Raw slots, indexed by position
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Position of `field` in this record's format, if registered
    fn position(&self, field: &Field) -> Option<usize> {
        if let Some(p) = field.position() {
            if self.format.field_at(p).as_ref() == Some(field) {
                return Some(p);
            }
        }
        self.format.position_of(field.name())
    }
}

impl Record for ListRecord {
    fn format(&self) -> &dyn Format {
        self.format.as_ref()
    }

    fn get(&self, field: &Field) -> Option<&Value> {
        let p = self.position(field)?;
        self.slots.get(p).and_then(Slot::value)
    }

    fn set(&mut self, field: &Field, value: Option<Value>) -> Option<Value> {
        let Some(value) = value else {
            let p = self.position(field)?;
            let previous = self.slots.get_mut(p).and_then(Slot::take);
            if previous.is_some() {
                self.count -= 1;
            }
            return previous;
        };

        let p = match self.position(field) {
            Some(p) => p,
            None => self.format.resolve(field.name()).1,
        };
        if p >= self.slots.len() {
            self.slots.resize(p + 1, Slot::Absent);
        }
        let previous = std::mem::replace(&mut self.slots[p], Slot::Present(value)).take();
        if previous.is_none() {
            self.count += 1;
        }
        previous
    }

    fn count(&self) -> usize {
        self.count
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.count = 0;
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (Field, &Value)> + '_> {
        Box::new(
            self.slots
                .iter()
                .enumerate()
                .filter_map(move |(i, slot)| {
                    let value = slot.value()?;
                    Some((self.format.field_at(i)?, value))
                }),
        )
    }

    fn create_sibling(&self) -> Box<dyn Record> {
        Box::new(ListRecord::new(Arc::clone(&self.format)))
    }
}
