//! Value types for bundles
//!
//! This module defines the polymorphic [`Value`] carried by every record field.
//! The enum is closed: seven kinds, one of which ([`Value::Custom`]) opens the
//! door to application-defined types through the [`CustomValue`] trait.
//!
//! ## Contract
//!
//! - Null is not a value. Absence is `Option<Value>::None` at every API surface.
//! - Different kinds are never equal (`Integer(1) != Float(1.0)`).
//! - Float uses IEEE-754 equality: `NaN != NaN`, `-0.0 == 0.0`.
//! - Every cross-kind view (`as_integer`, `as_string`, ...) either returns a
//!   correctly-typed result or a [`TranslationError`]. Nothing silently
//!   truncates across kinds except the documented Float to Integer case.

use crate::custom::{self, CustomValue};
use crate::error::TranslationError;
use std::collections::HashMap;
use std::fmt;

/// String-keyed map of values
pub type ValueMap = HashMap<String, Value>;

/// Polymorphic field value
///
/// ## The Seven Kinds
///
/// 1. `String` - UTF-8 text
/// 2. `Bytes` - arbitrary binary data (distinct from String)
/// 3. `Integer` - 64-bit signed integer
/// 4. `Float` - 64-bit IEEE-754 floating point
/// 5. `Array` - ordered sequence of values
/// 6. `Map` - string-keyed map of values
/// 7. `Custom` - application-defined value with a map projection
#[derive(Debug, Clone)]
pub enum Value {
    /// UTF-8 encoded string
    String(String),

    /// Arbitrary binary data
    Bytes(Vec<u8>),

    /// 64-bit signed integer
    Integer(i64),

    /// 64-bit IEEE-754 floating point
    /// Supports: NaN, +Inf, -Inf, -0.0, subnormals
    Float(f64),

    /// Ordered sequence of values
    Array(Vec<Value>),

    /// String-keyed map of values
    Map(ValueMap),

    /// Application-defined value
    Custom(Box<dyn CustomValue>),
}

/// Discriminant of a [`Value`], used for conversion targets and errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`Value::String`]
    String,
    /// [`Value::Bytes`]
    Bytes,
    /// [`Value::Integer`]
    Integer,
    /// [`Value::Float`]
    Float,
    /// [`Value::Array`]
    Array,
    /// [`Value::Map`]
    Map,
    /// [`Value::Custom`]
    Custom,
}

impl ValueKind {
    /// Name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "String",
            ValueKind::Bytes => "Bytes",
            ValueKind::Integer => "Integer",
            ValueKind::Float => "Float",
            ValueKind::Array => "Array",
            ValueKind::Map => "Map",
            ValueKind::Custom => "Custom",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    /// The kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::Array(_) => ValueKind::Array,
            Value::Map(_) => ValueKind::Map,
            Value::Custom(_) => ValueKind::Custom,
        }
    }

    /// Returns the type name as a string (for error messages)
    ///
    /// Custom values report their own fully-qualified type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Custom(c) => c.type_name(),
            other => other.kind().as_str(),
        }
    }

    /// Borrow the text of a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is a custom value
    pub fn is_custom(&self) -> bool {
        matches!(self, Value::Custom(_))
    }

    // ------------------------------------------------------------------------
    // Cross-kind views
    // ------------------------------------------------------------------------

    /// View as text
    ///
    /// Integer renders base-10. Float always carries a fractional part or an
    /// exponent. Bytes, Array and Map have no text view.
    pub fn as_string(&self) -> Result<String, TranslationError> {
        match self {
            Value::String(s) => Ok(s.clone()),
            Value::Integer(i) => Ok(i.to_string()),
            Value::Float(f) => Ok(format_float(*f)),
            Value::Custom(c) => c.as_string(),
            other => Err(TranslationError::unsupported(
                other.kind(),
                ValueKind::String,
            )),
        }
    }

    /// View as a 64-bit integer
    ///
    /// Float truncates toward zero (saturating at the i64 range, NaN is 0).
    /// Bytes must be exactly eight bytes, read big-endian.
    pub fn as_integer(&self) -> Result<i64, TranslationError> {
        match self {
            Value::Integer(i) => Ok(*i),
            Value::Float(f) => Ok(*f as i64),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|e| TranslationError::parse(s, ValueKind::Integer, e)),
            Value::Bytes(b) => Ok(i64::from_be_bytes(eight_bytes(b, ValueKind::Integer)?)),
            Value::Custom(c) => c.as_integer(),
            other => Err(TranslationError::unsupported(
                other.kind(),
                ValueKind::Integer,
            )),
        }
    }

    /// View as a 64-bit float
    ///
    /// Bytes must be exactly eight bytes holding a big-endian IEEE-754 pattern.
    pub fn as_float(&self) -> Result<f64, TranslationError> {
        match self {
            Value::Float(f) => Ok(*f),
            Value::Integer(i) => Ok(*i as f64),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| TranslationError::parse(s, ValueKind::Float, e)),
            Value::Bytes(b) => Ok(f64::from_bits(u64::from_be_bytes(eight_bytes(
                b,
                ValueKind::Float,
            )?))),
            Value::Custom(c) => c.as_float(),
            other => Err(TranslationError::unsupported(
                other.kind(),
                ValueKind::Float,
            )),
        }
    }

    /// View as raw bytes
    ///
    /// String yields its UTF-8 encoding; Integer and Float yield eight
    /// big-endian bytes.
    pub fn as_bytes(&self) -> Result<Vec<u8>, TranslationError> {
        match self {
            Value::Bytes(b) => Ok(b.clone()),
            Value::String(s) => Ok(s.as_bytes().to_vec()),
            Value::Integer(i) => Ok(i.to_be_bytes().to_vec()),
            Value::Float(f) => Ok(f.to_bits().to_be_bytes().to_vec()),
            Value::Custom(c) => c.as_bytes(),
            other => Err(TranslationError::unsupported(
                other.kind(),
                ValueKind::Bytes,
            )),
        }
    }

    /// View as an array
    ///
    /// A scalar becomes a one-element array holding itself.
    pub fn as_array(&self) -> Result<Vec<Value>, TranslationError> {
        match self {
            Value::Array(items) => Ok(items.clone()),
            Value::String(_) | Value::Bytes(_) | Value::Integer(_) | Value::Float(_) => {
                Ok(vec![self.clone()])
            }
            other => Err(TranslationError::unsupported(
                other.kind(),
                ValueKind::Array,
            )),
        }
    }

    /// View as a map; a custom value yields its projection
    pub fn as_map(&self) -> Result<ValueMap, TranslationError> {
        match self {
            Value::Map(map) => Ok(map.clone()),
            Value::Custom(c) => Ok(c.to_map()),
            other => Err(TranslationError::unsupported(other.kind(), ValueKind::Map)),
        }
    }

    /// Borrow the custom value
    pub fn as_custom(&self) -> Result<&dyn CustomValue, TranslationError> {
        match self {
            Value::Custom(c) => Ok(c.as_ref()),
            other => Err(TranslationError::unsupported(
                other.kind(),
                ValueKind::Custom,
            )),
        }
    }

    /// Convert into a value of `kind`
    pub fn convert(&self, kind: ValueKind) -> Result<Value, TranslationError> {
        Ok(match kind {
            ValueKind::String => Value::String(self.as_string()?),
            ValueKind::Bytes => Value::Bytes(self.as_bytes()?),
            ValueKind::Integer => Value::Integer(self.as_integer()?),
            ValueKind::Float => Value::Float(self.as_float()?),
            ValueKind::Array => Value::Array(self.as_array()?),
            ValueKind::Map => Value::Map(self.as_map()?),
            ValueKind::Custom => Value::Custom(self.as_custom()?.clone_box()),
        })
    }

    /// Numeric view: Integer and Float pass through, text is parsed
    ///
    /// Text containing a decimal point or exponent parses as Float, anything
    /// else as Integer.
    pub fn as_number(&self) -> Result<Value, TranslationError> {
        match self {
            Value::Integer(_) | Value::Float(_) => Ok(self.clone()),
            Value::String(s) if s.contains(['.', 'e', 'E']) => Ok(Value::Float(self.as_float()?)),
            Value::String(_) => Ok(Value::Integer(self.as_integer()?)),
            Value::Custom(c) => match c.as_simple() {
                v @ (Value::Integer(_) | Value::Float(_)) => Ok(v),
                _ => Err(TranslationError::NotNumeric(ValueKind::Custom)),
            },
            other => Err(TranslationError::NotNumeric(other.kind())),
        }
    }

    /// Collapse a custom value to its simplest scalar; other values unchanged
    pub fn as_simple(&self) -> Value {
        match self {
            Value::Custom(c) => c.as_simple(),
            other => other.clone(),
        }
    }

    /// Recursive copy
    ///
    /// Custom values are copied through their map projection into a fresh
    /// instance, so the copy shares no state with the original.
    pub fn deep_copy(&self) -> Result<Value, TranslationError> {
        Ok(match self {
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(Value::deep_copy)
                    .collect::<Result<Vec<_>, TranslationError>>()?,
            ),
            Value::Map(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| Ok((k.clone(), v.deep_copy()?)))
                    .collect::<Result<_, TranslationError>>()?,
            ),
            Value::Custom(c) => Value::Custom(custom::duplicate(c.as_ref())?),
            scalar => scalar.clone(),
        })
    }

    // ------------------------------------------------------------------------
    // Numeric helpers
    //
    // The receiver decides the result kind; the argument is viewed through
    // as_integer / as_float. Integer arithmetic wraps.
    // ------------------------------------------------------------------------

    /// `self + other`
    pub fn sum(&self, other: &Value) -> Result<Value, TranslationError> {
        match self {
            Value::Integer(a) => Ok(Value::Integer(a.wrapping_add(other.as_integer()?))),
            Value::Float(a) => Ok(Value::Float(a + other.as_float()?)),
            v => Err(TranslationError::NotNumeric(v.kind())),
        }
    }

    /// `self - other`
    pub fn diff(&self, other: &Value) -> Result<Value, TranslationError> {
        match self {
            Value::Integer(a) => Ok(Value::Integer(a.wrapping_sub(other.as_integer()?))),
            Value::Float(a) => Ok(Value::Float(a - other.as_float()?)),
            v => Err(TranslationError::NotNumeric(v.kind())),
        }
    }

    /// Smaller of `self` and `other`
    pub fn min(&self, other: &Value) -> Result<Value, TranslationError> {
        match self {
            Value::Integer(a) => Ok(Value::Integer((*a).min(other.as_integer()?))),
            Value::Float(a) => Ok(Value::Float(a.min(other.as_float()?))),
            v => Err(TranslationError::NotNumeric(v.kind())),
        }
    }

    /// Larger of `self` and `other`
    pub fn max(&self, other: &Value) -> Result<Value, TranslationError> {
        match self {
            Value::Integer(a) => Ok(Value::Integer((*a).max(other.as_integer()?))),
            Value::Float(a) => Ok(Value::Float(a.max(other.as_float()?))),
            v => Err(TranslationError::NotNumeric(v.kind())),
        }
    }

    /// Treat `self` as a running total over `count` samples; a zero count
    /// divides by one
    pub fn avg(&self, count: usize) -> Result<Value, TranslationError> {
        let count = count.max(1);
        match self {
            Value::Integer(a) => Ok(Value::Integer(a / count as i64)),
            Value::Float(a) => Ok(Value::Float(a / count as f64)),
            v => Err(TranslationError::NotNumeric(v.kind())),
        }
    }
}

/// Absent, or an empty string
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn eight_bytes(bytes: &[u8], to: ValueKind) -> Result<[u8; 8], TranslationError> {
    bytes
        .try_into()
        .map_err(|_| TranslationError::ByteWidth {
            to,
            expected: 8,
            actual: bytes.len(),
        })
}

/// Decimal text for a float that always reads back as a float
fn format_float(f: f64) -> String {
    let text = f.to_string();
    if f.is_finite() && !text.contains(['.', 'e', 'E']) {
        format!("{}.0", text)
    } else {
        text
    }
}

// ============================================================================
// Custom PartialEq Implementation (IEEE-754 semantics, no type coercion)
// ============================================================================

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            // NaN != NaN, -0.0 == 0.0
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => {
                a.type_name() == b.type_name() && a.to_map() == b.to_map()
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Bytes(b) => write!(f, "bytes[{}]", b.len()),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => f.write_str(&format_float(*v)),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => write_map(f, map),
            Value::Custom(c) => {
                f.write_str(c.type_name())?;
                write_map(f, &c.to_map())
            }
        }
    }
}

fn write_map(f: &mut fmt::Formatter<'_>, map: &ValueMap) -> fmt::Result {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by_key(|(k, _)| *k);
    f.write_str("{")?;
    for (i, (k, v)) in entries.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}={}", k, v)?;
    }
    f.write_str("}")
}

// ============================================================================
// From conversions
// ============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<ValueMap> for Value {
    fn from(map: ValueMap) -> Self {
        Value::Map(map)
    }
}

impl From<Box<dyn CustomValue>> for Value {
    fn from(c: Box<dyn CustomValue>) -> Self {
        Value::Custom(c)
    }
}

// ============================================================================
// Tests
// ============================================================================
