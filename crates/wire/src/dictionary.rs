//! Per-session dictionaries
//!
//! Field names and custom type names are sent in full once per session and
//! by index afterwards. Each side of a connection keeps a [`FieldDictionary`]
//! and a [`ClassDictionary`]; together they form a [`Session`].
//!
//! Indices start at 1. A stateless dictionary always hands out 0 and never
//! remembers anything, which forces every record to carry full names. Any
//! dictionary accepts an announcement at index 0 without storing it, so
//! stateless records decode under a live session too.
//!
//! The two dictionaries validate differently on decode. A custom type
//! announcement must use exactly the next index the receiver would assign,
//! otherwise the session is out of sync and decoding fails. A field
//! announcement may use any index; re-announcing an index keeps the first
//! registration.

use crate::error::ProtocolError;
use bundlekit_core::Field;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Field name dictionary
#[derive(Debug, Clone)]
pub struct FieldDictionary {
    stateless: bool,
    by_index: HashMap<u64, Field>,
    by_name: HashMap<Arc<str>, u64>,
    next: u64,
}

impl FieldDictionary {
    /// Empty dictionary
    pub fn new() -> Self {
        FieldDictionary {
            stateless: false,
            by_index: HashMap::new(),
            by_name: HashMap::new(),
            next: 1,
        }
    }

    /// Dictionary that never remembers
    pub fn stateless() -> Self {
        FieldDictionary {
            stateless: true,
            ..FieldDictionary::new()
        }
    }

    /// Whether this dictionary never remembers
    pub fn is_stateless(&self) -> bool {
        self.stateless
    }

    /// Number of registered fields
    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    /// Forget everything
    pub fn reset(&mut self) {
        self.by_index.clear();
        self.by_name.clear();
        if !self.stateless {
            self.next = 1;
        }
    }

    /// Index already assigned to `name`
    pub fn index_of(&self, name: &str) -> Option<u64> {
        self.by_name.get(name).copied()
    }

    /// Field registered under `index`
    pub fn field(&self, index: u64) -> Option<&Field> {
        self.by_index.get(&index)
    }

    /// Assign the next index to `field` (encoder side)
    pub fn allocate(&mut self, field: &Field) -> u64 {
        if self.stateless {
            return 0;
        }
        let index = self.next;
        self.next += 1;
        self.insert(index, field.clone());
        index
    }

    /// Record that `index` names `field` (decoder side)
    ///
    /// An index that is already registered keeps its first field. Index 0
    /// comes from stateless encoders and is never stored.
    pub fn register(&mut self, index: u64, field: Field) {
        if self.stateless || index == 0 || self.by_index.contains_key(&index) {
            return;
        }
        self.next = self.next.max(index.saturating_add(1));
        self.insert(index, field);
    }

    fn insert(&mut self, index: u64, field: Field) {
        debug!("field {} registered at index {}", field.name(), index);
        self.by_name
            .entry(Arc::from(field.name()))
            .or_insert(index);
        self.by_index.insert(index, field);
    }
}

impl Default for FieldDictionary {
    fn default() -> Self {
        FieldDictionary::new()
    }
}

/// Custom type name dictionary
#[derive(Debug, Clone, Default)]
pub struct ClassDictionary {
    stateless: bool,
    by_index: HashMap<u64, Arc<str>>,
    by_name: HashMap<Arc<str>, u64>,
}

impl ClassDictionary {
    /// Empty dictionary
    pub fn new() -> Self {
        ClassDictionary::default()
    }

    /// Dictionary that never remembers
    pub fn stateless() -> Self {
        ClassDictionary {
            stateless: true,
            ..Default::default()
        }
    }

    /// Whether this dictionary never remembers
    pub fn is_stateless(&self) -> bool {
        self.stateless
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    /// Forget everything
    pub fn reset(&mut self) {
        self.by_index.clear();
        self.by_name.clear();
    }

    /// Index the next new type will receive
    pub fn next_index(&self) -> u64 {
        if self.stateless {
            0
        } else {
            self.by_index.len() as u64 + 1
        }
    }

    /// Index already assigned to `name`
    pub fn index_of(&self, name: &str) -> Option<u64> {
        self.by_name.get(name).copied()
    }

    /// Type name registered under `index`
    pub fn name(&self, index: u64) -> Option<&str> {
        self.by_index.get(&index).map(|n| n.as_ref())
    }

    /// Assign the next index to `name` (encoder side)
    pub fn allocate(&mut self, name: &str) -> u64 {
        let index = self.next_index();
        if !self.stateless {
            self.insert(index, name);
        }
        index
    }

    /// Record that `index` names `name` (decoder side)
    ///
    /// `index` must equal [`next_index`](Self::next_index), except for 0,
    /// which stateless encoders send for every type and which is never stored.
    pub fn register(&mut self, index: u64, name: &str) -> Result<(), ProtocolError> {
        if index == 0 {
            return Ok(());
        }
        let expected = self.next_index();
        if index != expected {
            return Err(ProtocolError::ClassIndexMismatch {
                name: name.to_string(),
                expected,
                actual: index,
            });
        }
        if !self.stateless {
            self.insert(index, name);
        }
        Ok(())
    }

    fn insert(&mut self, index: u64, name: &str) {
        debug!("custom type {} registered at index {}", name, index);
        let name: Arc<str> = Arc::from(name);
        self.by_name.insert(Arc::clone(&name), index);
        self.by_index.insert(index, name);
    }
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing registered; the next record is sent with BUNDLE_INIT
    Empty,
    /// Dictionaries populated; records are sent with BUNDLE_START
    Active,
}

/// Field and custom type dictionaries for one direction of one stream
#[derive(Debug, Clone)]
pub struct Session {
    /// Field names
    pub fields: FieldDictionary,
    /// Custom type names
    pub classes: ClassDictionary,
}

impl Session {
    /// Fresh session
    pub fn new() -> Self {
        Session {
            fields: FieldDictionary::new(),
            classes: ClassDictionary::new(),
        }
    }

    /// Session whose dictionaries never remember
    pub fn stateless() -> Self {
        Session {
            fields: FieldDictionary::stateless(),
            classes: ClassDictionary::stateless(),
        }
    }

    /// Whether both dictionaries never remember
    pub fn is_stateless(&self) -> bool {
        self.fields.is_stateless() && self.classes.is_stateless()
    }

    /// Whether both dictionaries are empty
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.classes.is_empty()
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        if self.is_empty() {
            SessionState::Empty
        } else {
            SessionState::Active
        }
    }

    /// Clear both dictionaries
    pub fn reset(&mut self) {
        debug!(
            "session reset ({} fields, {} custom types dropped)",
            self.fields.len(),
            self.classes.len()
        );
        self.fields.reset();
        self.classes.reset();
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod field_dictionary_tests {
        use super::*;

        #[test]
        fn test_indices_start_at_one() {
            let mut dict = FieldDictionary::new();
            assert_eq!(dict.allocate(&Field::named("a")), 1);
            assert_eq!(dict.allocate(&Field::named("b")), 2);
            assert_eq!(dict.index_of("a"), Some(1));
            assert_eq!(dict.field(2).map(Field::name), Some("b"));
        }

        #[test]
        fn test_stateless_allocates_zero() {
            let mut dict = FieldDictionary::stateless();
            assert_eq!(dict.allocate(&Field::named("a")), 0);
            assert_eq!(dict.allocate(&Field::named("a")), 0);
            assert!(dict.is_empty());
            assert_eq!(dict.index_of("a"), None);
        }

        #[test]
        fn test_register_keeps_first() {
            let mut dict = FieldDictionary::new();
            dict.register(4, Field::named("first"));
            dict.register(4, Field::named("second"));
            assert_eq!(dict.field(4).map(Field::name), Some("first"));
            assert_eq!(dict.len(), 1);
        }

        #[test]
        fn test_register_any_order() {
            let mut dict = FieldDictionary::new();
            dict.register(7, Field::named("x"));
            dict.register(2, Field::named("y"));
            assert!(dict.field(7).is_some());
            assert!(dict.field(2).is_some());
            assert_eq!(dict.allocate(&Field::named("z")), 8);
        }

        #[test]
        fn test_register_zero_not_stored() {
            let mut dict = FieldDictionary::new();
            dict.register(0, Field::named("a"));
            assert!(dict.is_empty());
            assert_eq!(dict.allocate(&Field::named("b")), 1);
        }

        #[test]
        fn test_reset() {
            let mut dict = FieldDictionary::new();
            dict.allocate(&Field::named("a"));
            dict.reset();
            assert!(dict.is_empty());
            assert_eq!(dict.allocate(&Field::named("b")), 1);
        }
    }

    mod class_dictionary_tests {
        use super::*;

        #[test]
        fn test_allocate_and_lookup() {
            let mut dict = ClassDictionary::new();
            assert_eq!(dict.next_index(), 1);
            assert_eq!(dict.allocate("t.A"), 1);
            assert_eq!(dict.index_of("t.A"), Some(1));
            assert_eq!(dict.name(1), Some("t.A"));
            assert_eq!(dict.next_index(), 2);
        }

        #[test]
        fn test_register_requires_next_index() {
            let mut dict = ClassDictionary::new();
            dict.register(1, "t.A").unwrap();
            let err = dict.register(3, "t.B").unwrap_err();
            assert!(matches!(
                err,
                ProtocolError::ClassIndexMismatch {
                    expected: 2,
                    actual: 3,
                    ..
                }
            ));
        }

        #[test]
        fn test_live_dictionary_accepts_zero() {
            let mut dict = ClassDictionary::new();
            dict.register(0, "t.A").unwrap();
            dict.register(0, "t.B").unwrap();
            assert!(dict.is_empty());
            assert_eq!(dict.next_index(), 1);
            dict.register(1, "t.C").unwrap();
            assert_eq!(dict.name(1), Some("t.C"));
        }

        #[test]
        fn test_stateless_uses_zero() {
            let mut dict = ClassDictionary::stateless();
            assert_eq!(dict.allocate("t.A"), 0);
            assert!(dict.register(0, "t.A").is_ok());
            assert!(dict.register(1, "t.A").is_err());
            assert_eq!(dict.name(0), None);
            assert!(dict.is_empty());
        }
    }

    mod session_tests {
        use super::*;

        #[test]
        fn test_state_transitions() {
            let mut session = Session::new();
            assert_eq!(session.state(), SessionState::Empty);
            session.fields.allocate(&Field::named("a"));
            assert_eq!(session.state(), SessionState::Active);
            session.reset();
            assert_eq!(session.state(), SessionState::Empty);
        }

        #[test]
        fn test_stateless_session_stays_empty() {
            let mut session = Session::stateless();
            session.fields.allocate(&Field::named("a"));
            session.classes.allocate("t.A");
            assert!(session.is_stateless());
            assert_eq!(session.state(), SessionState::Empty);
        }
    }
}
