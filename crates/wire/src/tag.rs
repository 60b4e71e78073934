//! One-byte tags
//!
//! Values and record framing share a single tag namespace. The byte values
//! are fixed; peers built by other implementations depend on them.

use crate::error::ProtocolError;
use std::fmt;

/// Integers at or above this go out as eight raw bytes
pub const LONG_BIG_THRESHOLD: u64 = 1 << 48;

/// Wire tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    /// Absent value
    Null = 0,
    /// Length-prefixed UTF-8
    String = 1,
    /// Length-prefixed bytes
    Bytes = 2,
    /// Non-negative integer below 2^48, length-encoded
    Long = 3,
    /// Negative integer, magnitude length-encoded
    LongNeg = 4,
    /// Integer as eight big-endian bytes
    LongBig = 5,
    /// IEEE-754 double as eight big-endian bytes
    Double = 6,
    /// Count then elements
    Array = 7,
    /// Count then key/value pairs
    Map = 8,
    /// Custom value whose type index is already known
    CustomIndex = 9,
    /// Custom value introducing a new type index and name
    CustomClass = 10,
    /// Record start that resets both session dictionaries
    BundleInit = 11,
    /// Record start continuing the session
    BundleStart = 12,
    /// Field given by an already-registered index
    BundleFieldIndex = 13,
    /// Field introducing a new index and name
    BundleFieldName = 14,
    /// Record end
    BundleEnd = 15,
}

impl Tag {
    /// Tag for a byte, if it is one
    pub fn from_byte(b: u8) -> Option<Tag> {
        Some(match b {
            0 => Tag::Null,
            1 => Tag::String,
            2 => Tag::Bytes,
            3 => Tag::Long,
            4 => Tag::LongNeg,
            5 => Tag::LongBig,
            6 => Tag::Double,
            7 => Tag::Array,
            8 => Tag::Map,
            9 => Tag::CustomIndex,
            10 => Tag::CustomClass,
            11 => Tag::BundleInit,
            12 => Tag::BundleStart,
            13 => Tag::BundleFieldIndex,
            14 => Tag::BundleFieldName,
            15 => Tag::BundleEnd,
            _ => return None,
        })
    }

    /// Byte value
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Upper-case wire name
    pub fn name(self) -> &'static str {
        match self {
            Tag::Null => "NULL",
            Tag::String => "STRING",
            Tag::Bytes => "BYTES",
            Tag::Long => "LONG",
            Tag::LongNeg => "LONG_NEG",
            Tag::LongBig => "LONG_BIG",
            Tag::Double => "DOUBLE",
            Tag::Array => "ARRAY",
            Tag::Map => "MAP",
            Tag::CustomIndex => "CUSTOM_INDEX",
            Tag::CustomClass => "CUSTOM_CLASS",
            Tag::BundleInit => "BUNDLE_INIT",
            Tag::BundleStart => "BUNDLE_START",
            Tag::BundleFieldIndex => "BUNDLE_FIELD_INDEX",
            Tag::BundleFieldName => "BUNDLE_FIELD_NAME",
            Tag::BundleEnd => "BUNDLE_END",
        }
    }

    /// Whether this tag begins a value
    pub fn is_value(self) -> bool {
        self.as_byte() <= Tag::CustomClass.as_byte()
    }
}

impl TryFrom<u8> for Tag {
    type Error = ProtocolError;

    fn try_from(b: u8) -> Result<Self, Self::Error> {
        Tag::from_byte(b).ok_or(ProtocolError::UnknownTag(b))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
