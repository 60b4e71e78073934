//! Custom (application-defined) values
//!
//! A custom value is opaque to the rest of the system. It carries two
//! obligations:
//!
//! 1. Render itself as a [`ValueMap`] that captures its full state.
//! 2. Be rebuilt from (type name, map): construct an empty instance with no
//!    arguments, then hand it the map via [`CustomValue::load_map`].
//!
//! The codec never inspects the shape of a custom value. It transmits the type
//! name once per session and the map projection every time; the receiving side
//! looks the name up in a [`CustomRegistry`] populated at startup.
//!
//! ## Example
//!
//! ```
//! use bundlekit_core::{CustomRegistry, CustomValue, TranslationError, Value, ValueMap};
//!
//! #[derive(Debug, Clone, Default)]
//! struct Hits(i64);
//!
//! impl CustomValue for Hits {
//!     fn type_name(&self) -> &'static str {
//!         "demo.Hits"
//!     }
//!     fn to_map(&self) -> ValueMap {
//!         ValueMap::from([("n".to_string(), Value::Integer(self.0))])
//!     }
//!     fn load_map(&mut self, map: ValueMap) -> Result<(), TranslationError> {
//!         self.0 = map.get("n").map(Value::as_integer).transpose()?.unwrap_or(0);
//!         Ok(())
//!     }
//!     fn new_empty(&self) -> Box<dyn CustomValue> {
//!         Box::new(Hits::default())
//!     }
//! }
//!
//! let mut registry = CustomRegistry::new();
//! registry.register::<Hits>();
//! let rebuilt = registry.rehydrate("demo.Hits", Hits(7).to_map()).unwrap();
//! assert_eq!(rebuilt.to_map(), Hits(7).to_map());
//! ```

use crate::error::{RehydrationError, TranslationError};
use crate::value::{Value, ValueKind, ValueMap};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Application-defined value that can project to and from a map
pub trait CustomValue: fmt::Debug + Send + Sync + CustomClone + 'static {
    /// Stable, fully-qualified name identifying the concrete type on the wire
    fn type_name(&self) -> &'static str;

    /// Project the full state of this value into a map
    fn to_map(&self) -> ValueMap;

    /// Rehydration entry point: replace this value's state with `map`
    fn load_map(&mut self, map: ValueMap) -> Result<(), TranslationError>;

    /// Zero-argument construction of an empty instance of the same type
    fn new_empty(&self) -> Box<dyn CustomValue>;

    /// Integer view, if this type has one
    fn as_integer(&self) -> Result<i64, TranslationError> {
        Err(TranslationError::unsupported(ValueKind::Custom, ValueKind::Integer))
    }

    /// Float view, if this type has one
    fn as_float(&self) -> Result<f64, TranslationError> {
        Err(TranslationError::unsupported(ValueKind::Custom, ValueKind::Float))
    }

    /// String view, if this type has one
    fn as_string(&self) -> Result<String, TranslationError> {
        Err(TranslationError::unsupported(ValueKind::Custom, ValueKind::String))
    }

    /// Bytes view, if this type has one
    fn as_bytes(&self) -> Result<Vec<u8>, TranslationError> {
        Err(TranslationError::unsupported(ValueKind::Custom, ValueKind::Bytes))
    }

    /// Lossy scalar rendering for consumers that cannot carry custom types
    ///
    /// Tries the integer view, then float, then string, and finally falls
    /// back to the map projection.
    fn as_simple(&self) -> Value {
        if let Ok(i) = self.as_integer() {
            return Value::Integer(i);
        }
        if let Ok(f) = self.as_float() {
            return Value::Float(f);
        }
        if let Ok(s) = self.as_string() {
            return Value::String(s);
        }
        Value::Map(self.to_map())
    }
}

/// Object-safe cloning for boxed custom values
///
/// Blanket-implemented for every `CustomValue + Clone`; implementors never
/// write this by hand.
pub trait CustomClone {
    /// Clone into a new box
    fn clone_box(&self) -> Box<dyn CustomValue>;
}

impl<T> CustomClone for T
where
    T: CustomValue + Clone,
{
    fn clone_box(&self) -> Box<dyn CustomValue> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn CustomValue> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Copy a custom value through its map projection
///
/// Builds a fresh instance with [`CustomValue::new_empty`] and loads the
/// source's map into it, exactly as a decoder would.
pub fn duplicate(value: &dyn CustomValue) -> Result<Box<dyn CustomValue>, TranslationError> {
    let mut fresh = value.new_empty();
    fresh.load_map(value.to_map())?;
    Ok(fresh)
}

/// Zero-argument constructor for a custom type
pub type CustomFactory = fn() -> Box<dyn CustomValue>;

/// Maps custom type names to zero-argument factories
///
/// Built once at startup and passed by reference to decoders. There is no
/// process-wide table: two registries never see each other's types.
#[derive(Default, Clone)]
pub struct CustomRegistry {
    factories: HashMap<&'static str, CustomFactory>,
}

impl CustomRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type constructible through `Default`
    ///
    /// The wire name is taken from a default instance's `type_name()`.
    pub fn register<T>(&mut self) -> &mut Self
    where
        T: CustomValue + Default,
    {
        fn build<T: CustomValue + Default>() -> Box<dyn CustomValue> {
            Box::new(T::default())
        }
        let name = T::default().type_name();
        self.register_factory(name, build::<T>)
    }

    /// Register an explicit factory under `name`
    ///
    /// A later registration under the same name replaces the earlier one.
    pub fn register_factory(&mut self, name: &'static str, factory: CustomFactory) -> &mut Self {
        if self.factories.insert(name, factory).is_some() {
            debug!("replaced custom type factory for {}", name);
        }
        self
    }

    /// Whether a factory exists for `name`
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether no types are registered
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Build an empty instance of `name`
    pub fn instantiate(&self, name: &str) -> Result<Box<dyn CustomValue>, RehydrationError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RehydrationError::UnknownType(name.to_string()))?;
        Ok(factory())
    }

    /// Construct `name` with no arguments, then load `map` into it
    pub fn rehydrate(
        &self,
        name: &str,
        map: ValueMap,
    ) -> Result<Box<dyn CustomValue>, RehydrationError> {
        let mut value = self.instantiate(name)?;
        value.load_map(map).map_err(|source| RehydrationError::Load {
            type_name: name.to_string(),
            source,
        })?;
        Ok(value)
    }
}

impl fmt::Debug for CustomRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("CustomRegistry").field("types", &names).finish()
    }
}
