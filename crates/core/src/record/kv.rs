//! Name-keyed record over a [`KvFormat`]

use super::Record;
use crate::field::Field;
use crate::format::{Format, KvFormat};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Record storing values by field name
#[derive(Debug, Clone)]
pub struct KvRecord {
    format: Arc<KvFormat>,
    values: HashMap<Arc<str>, Value>,
}

impl KvRecord {
    /// Empty record on `format`
    pub fn new(format: Arc<KvFormat>) -> Self {
        KvRecord {
            format,
            values: HashMap::new(),
        }
    }
}

impl Record for KvRecord {
    fn format(&self) -> &dyn Format {
        self.format.as_ref()
    }

    fn get(&self, field: &Field) -> Option<&Value> {
        self.values.get(field.name())
    }

    fn set(&mut self, field: &Field, value: Option<Value>) -> Option<Value> {
        match value {
            None => self.values.remove(field.name()),
            Some(value) => {
                let own = self.format.field(field.name());
                self.values.insert(Arc::clone(own.shared_name()), value)
            }
        }
    }

    fn count(&self) -> usize {
        self.values.len()
    }

    fn clear(&mut self) {
        self.values.clear();
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (Field, &Value)> + '_> {
        Box::new(self.format.fields().into_iter().filter_map(move |field| {
            let value = self.values.get(field.name())?;
            Some((field, value))
        }))
    }

    fn create_sibling(&self) -> Box<dyn Record> {
        Box::new(KvRecord::new(Arc::clone(&self.format)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::ListFormat;

    #[test]
    fn test_set_get_remove() {
        let mut r = KvRecord::new(Arc::new(KvFormat::new()));
        let f = r.format().field("k");
        r.set(&f, Some(Value::from("v")));
        assert_eq!(r.get(&f), Some(&Value::from("v")));
        assert_eq!(r.remove(&f), Some(Value::from("v")));
        assert_eq!(r.count(), 0);
        assert_eq!(r.remove(&f), None);
    }

    #[test]
    fn test_positional_field_accepted() {
        let list = ListFormat::with_fields(["p", "q"]);
        let mut r = KvRecord::new(Arc::new(KvFormat::new()));
        r.set(&list.field("q"), Some(Value::from(2i64)));
        assert_eq!(r.get_named("q"), Some(&Value::Integer(2)));
        assert!(r.format().has_field("q"));
    }

    #[test]
    fn test_iter_creation_order() {
        let mut r = KvRecord::new(Arc::new(KvFormat::new()));
        r.set_named("z", Some(Value::from(1i64)));
        r.set_named("a", Some(Value::from(2i64)));
        r.set_named("m", Some(Value::from(3i64)));
        r.set_named("a", None);
        let names: Vec<_> = r.fields().iter().map(|f| f.name().to_string()).collect();
        assert_eq!(names, vec!["z", "m"]);
    }
}
