//! Binary value and record codec
//!
//! ## Values
//!
//! | Value | Bytes |
//! |-------|-------|
//! | absent | `NULL` |
//! | String | `STRING` len utf8 |
//! | Bytes | `BYTES` len bytes |
//! | Integer `0 <= v < 2^48` | `LONG` len(v) |
//! | Integer `v >= 2^48` | `LONG_BIG` i64 BE |
//! | Integer `v < 0` | `LONG_NEG` len(\|v\|) |
//! | Float | `DOUBLE` bits BE |
//! | Array | `ARRAY` len values... |
//! | Map | `MAP` len (`STRING` key, value)... in key order |
//! | Custom, new type | `CUSTOM_CLASS` len(index) len name, then its map as a `MAP` |
//! | Custom, known type | `CUSTOM_INDEX` len(index), then its map as a `MAP` |
//!
//! `len(..)` is the prefix-length form from [`crate::length`].
//!
//! ## Records
//!
//! ```text
//! (BUNDLE_INIT | BUNDLE_START)
//!   (BUNDLE_FIELD_NAME len(index) len name value | BUNDLE_FIELD_INDEX len(index) value)*
//! BUNDLE_END
//! ```
//!
//! BUNDLE_INIT is sent iff the sender's session is empty, and tells the
//! receiver to reset its own.

use crate::config::CodecConfig;
use crate::dictionary::{ClassDictionary, Session};
use crate::error::{ProtocolError, Result};
use crate::length::{read_length, write_length};
use crate::tag::{Tag, LONG_BIG_THRESHOLD};
use bundlekit_core::{CustomRegistry, Field, Format, Record, Value, ValueMap};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Cursor, Read, Write};
use std::sync::Arc;
use tracing::trace;

/// What [`Codec::decode_record`] found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// A complete record was decoded into the target
    Record,
    /// Input ended cleanly before a record started
    EndOfStream,
}

/// Encoder/decoder for values and records
///
/// Holds no per-stream state; dictionaries live in the [`Session`] passed to
/// each call. One codec can serve any number of streams.
#[derive(Debug, Clone)]
pub struct Codec {
    registry: Arc<CustomRegistry>,
    config: CodecConfig,
}

impl Codec {
    /// Codec with default limits
    pub fn new(registry: Arc<CustomRegistry>) -> Self {
        Codec::with_config(registry, CodecConfig::default())
    }

    /// Codec with explicit limits
    pub fn with_config(registry: Arc<CustomRegistry>, config: CodecConfig) -> Self {
        Codec { registry, config }
    }

    /// Registry used to rebuild custom values
    pub fn registry(&self) -> &Arc<CustomRegistry> {
        &self.registry
    }

    /// Active limits
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    // ========================================================================
    // Values
    // ========================================================================

    /// Write one value, or NULL for `None`
    pub fn encode_value<W: Write + ?Sized>(
        &self,
        value: Option<&Value>,
        out: &mut W,
        classes: &mut ClassDictionary,
    ) -> io::Result<()> {
        match value {
            None => out.write_u8(Tag::Null.as_byte()),
            Some(v) => write_value(v, out, classes),
        }
    }

    /// Read one value; NULL yields `None`
    pub fn decode_value<R: Read + ?Sized>(
        &self,
        input: &mut R,
        classes: &mut ClassDictionary,
    ) -> Result<Option<Value>> {
        self.read_value(input, classes, 0)
    }

    // ========================================================================
    // Records
    // ========================================================================

    /// Write every present field of `record`
    ///
    /// If the writer fails partway, `session` may hold registrations the peer
    /// never saw; reset it before writing again.
    pub fn encode_record<W: Write + ?Sized>(
        &self,
        record: &dyn Record,
        out: &mut W,
        session: &mut Session,
    ) -> io::Result<()> {
        let start = if session.is_empty() {
            Tag::BundleInit
        } else {
            Tag::BundleStart
        };
        out.write_u8(start.as_byte())?;
        for (field, value) in record.iter() {
            match session.fields.index_of(field.name()) {
                Some(index) => {
                    out.write_u8(Tag::BundleFieldIndex.as_byte())?;
                    write_length(out, index)?;
                }
                None => {
                    let index = session.fields.allocate(&field);
                    out.write_u8(Tag::BundleFieldName.as_byte())?;
                    write_length(out, index)?;
                    write_str(out, field.name())?;
                }
            }
            write_value(value, out, &mut session.classes)?;
        }
        out.write_u8(Tag::BundleEnd.as_byte())?;
        trace!("encoded {} record with {} fields", start, record.count());
        Ok(())
    }

    /// Read one record into `record`
    ///
    /// Fields are resolved by name against `record`'s own format. Nothing is
    /// written to `record` until BUNDLE_END has been read, so on error it is
    /// left as it was. Decoded fields are laid over whatever `record` already
    /// holds; pass an empty record to get exactly what was sent.
    pub fn decode_record<R: Read + ?Sized>(
        &self,
        input: &mut R,
        record: &mut dyn Record,
        session: &mut Session,
    ) -> Result<DecodeOutcome> {
        let Some(staged) = self.read_record(input, record.format(), session)? else {
            return Ok(DecodeOutcome::EndOfStream);
        };
        apply(staged, record);
        Ok(DecodeOutcome::Record)
    }

    /// Decode exactly one record that fills all of `frame`
    ///
    /// An empty frame is [`ProtocolError::Truncated`]; bytes left after
    /// BUNDLE_END are [`ProtocolError::TrailingBytes`]. Either way `record`
    /// is left as it was.
    pub fn decode_frame(
        &self,
        frame: &[u8],
        record: &mut dyn Record,
        session: &mut Session,
    ) -> Result<()> {
        let mut cursor = Cursor::new(frame);
        let staged = self
            .read_record(&mut cursor, record.format(), session)?
            .ok_or(ProtocolError::Truncated)?;
        let trailing = frame.len() - cursor.position() as usize;
        if trailing > 0 {
            return Err(ProtocolError::TrailingBytes(trailing));
        }
        apply(staged, record);
        Ok(())
    }

    /// Encode `record` into a new buffer
    pub fn encode_record_to_vec(
        &self,
        record: &dyn Record,
        session: &mut Session,
    ) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode_record(record, &mut buf, session)?;
        Ok(buf)
    }

    /// Decode one record from the start of `bytes`
    pub fn decode_record_from_slice(
        &self,
        bytes: &[u8],
        record: &mut dyn Record,
        session: &mut Session,
    ) -> Result<DecodeOutcome> {
        self.decode_record(&mut Cursor::new(bytes), record, session)
    }

    /// Encode `record` so it decodes with no prior session state
    pub fn encode_stateless(&self, record: &dyn Record) -> io::Result<Vec<u8>> {
        self.encode_record_to_vec(record, &mut Session::stateless())
    }

    /// Decode bytes produced by [`encode_stateless`](Self::encode_stateless)
    pub fn decode_stateless(&self, bytes: &[u8], record: &mut dyn Record) -> Result<DecodeOutcome> {
        self.decode_record_from_slice(bytes, record, &mut Session::stateless())
    }

    // ========================================================================
    // Decoding internals
    // ========================================================================

    /// Fields of the next record, or `None` at a clean end of input
    fn read_record<R: Read + ?Sized>(
        &self,
        input: &mut R,
        format: &dyn Format,
        session: &mut Session,
    ) -> Result<Option<Vec<(Field, Option<Value>)>>> {
        let Some(first) = read_start(input)? else {
            return Ok(None);
        };
        match Tag::try_from(first)? {
            Tag::BundleInit => session.reset(),
            Tag::BundleStart => {}
            other => {
                return Err(ProtocolError::UnexpectedTag {
                    tag: other.name(),
                    context: "record start",
                })
            }
        }

        let mut staged = Vec::new();
        loop {
            match read_tag(input)? {
                Tag::BundleFieldIndex => {
                    let index = read_length(input)?;
                    let field = session
                        .fields
                        .field(index)
                        .cloned()
                        .ok_or(ProtocolError::UnknownFieldIndex(index))?;
                    let value = self.read_value(input, &mut session.classes, 0)?;
                    staged.push((field, value));
                }
                Tag::BundleFieldName => {
                    let index = read_length(input)?;
                    let name = self.read_string(input)?;
                    let field = format.field(&name);
                    session.fields.register(index, field.clone());
                    let value = self.read_value(input, &mut session.classes, 0)?;
                    staged.push((field, value));
                }
                Tag::BundleEnd => break,
                other => {
                    return Err(ProtocolError::UnexpectedTag {
                        tag: other.name(),
                        context: "record body",
                    })
                }
            }
        }

        trace!("decoded record with {} field entries", staged.len());
        Ok(Some(staged))
    }

    fn read_value<R: Read + ?Sized>(
        &self,
        input: &mut R,
        classes: &mut ClassDictionary,
        depth: usize,
    ) -> Result<Option<Value>> {
        let tag = read_tag(input)?;
        let value = match tag {
            Tag::Null => return Ok(None),
            Tag::String => Value::String(self.read_string(input)?),
            Tag::Bytes => Value::Bytes(self.read_bytes(input)?),
            Tag::Long => {
                let magnitude = read_length(input)?;
                let v = i64::try_from(magnitude)
                    .map_err(|_| ProtocolError::MagnitudeOverflow(magnitude))?;
                Value::Integer(v)
            }
            Tag::LongNeg => {
                let magnitude = read_length(input)?;
                if magnitude > i64::MIN.unsigned_abs() {
                    return Err(ProtocolError::MagnitudeOverflow(magnitude));
                }
                Value::Integer((magnitude as i64).wrapping_neg())
            }
            Tag::LongBig => Value::Integer(input.read_i64::<BigEndian>()?),
            Tag::Double => Value::Float(f64::from_bits(input.read_u64::<BigEndian>()?)),
            Tag::Array => {
                self.enter(depth)?;
                let count = self.config.check_length(read_length(input)?)?;
                let mut items = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    // the model has no null element
                    if let Some(item) = self.read_value(input, classes, depth + 1)? {
                        items.push(item);
                    }
                }
                Value::Array(items)
            }
            Tag::Map => {
                self.enter(depth)?;
                Value::Map(self.read_map_body(input, classes, depth + 1)?)
            }
            Tag::CustomIndex => {
                let index = read_length(input)?;
                let name = classes
                    .name(index)
                    .ok_or(ProtocolError::UnknownClassIndex(index))?
                    .to_string();
                self.read_custom_body(input, classes, &name, depth)?
            }
            Tag::CustomClass => {
                let index = read_length(input)?;
                let name = self.read_string(input)?;
                classes.register(index, &name)?;
                self.read_custom_body(input, classes, &name, depth)?
            }
            other => {
                return Err(ProtocolError::UnexpectedTag {
                    tag: other.name(),
                    context: "value",
                })
            }
        };
        Ok(Some(value))
    }

    fn read_map_body<R: Read + ?Sized>(
        &self,
        input: &mut R,
        classes: &mut ClassDictionary,
        depth: usize,
    ) -> Result<ValueMap> {
        let count = self.config.check_length(read_length(input)?)?;
        let mut map = ValueMap::with_capacity(count.min(1024));
        for _ in 0..count {
            let key = self
                .read_value(input, classes, depth)?
                .ok_or(ProtocolError::UnexpectedTag {
                    tag: Tag::Null.name(),
                    context: "map key",
                })?;
            let key = key.as_string().unwrap_or_else(|_| key.to_string());
            if let Some(value) = self.read_value(input, classes, depth)? {
                map.insert(key, value);
            }
        }
        Ok(map)
    }

    fn read_custom_body<R: Read + ?Sized>(
        &self,
        input: &mut R,
        classes: &mut ClassDictionary,
        name: &str,
        depth: usize,
    ) -> Result<Value> {
        self.enter(depth)?;
        match read_tag(input)? {
            Tag::Map => {}
            other => {
                return Err(ProtocolError::UnexpectedTag {
                    tag: other.name(),
                    context: "custom value body",
                })
            }
        }
        let map = self.read_map_body(input, classes, depth + 1)?;
        Ok(Value::Custom(self.registry.rehydrate(name, map)?))
    }

    fn read_string<R: Read + ?Sized>(&self, input: &mut R) -> Result<String> {
        String::from_utf8(self.read_bytes(input)?).map_err(|_| ProtocolError::InvalidUtf8)
    }

    fn read_bytes<R: Read + ?Sized>(&self, input: &mut R) -> Result<Vec<u8>> {
        let len = self.config.check_length(read_length(input)?)?;
        let mut buf = vec![0u8; len];
        input.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn enter(&self, depth: usize) -> Result<()> {
        if depth >= self.config.max_depth {
            return Err(ProtocolError::DepthLimit(self.config.max_depth));
        }
        Ok(())
    }
}

// ============================================================================
// Encoding internals
// ============================================================================

fn write_value<W: Write + ?Sized>(
    value: &Value,
    out: &mut W,
    classes: &mut ClassDictionary,
) -> io::Result<()> {
    match value {
        Value::String(s) => {
            out.write_u8(Tag::String.as_byte())?;
            write_str(out, s)
        }
        Value::Bytes(b) => {
            out.write_u8(Tag::Bytes.as_byte())?;
            write_length(out, b.len() as u64)?;
            out.write_all(b)
        }
        Value::Integer(v) => write_integer(out, *v),
        Value::Float(f) => {
            out.write_u8(Tag::Double.as_byte())?;
            out.write_u64::<BigEndian>(f.to_bits())
        }
        Value::Array(items) => {
            out.write_u8(Tag::Array.as_byte())?;
            write_length(out, items.len() as u64)?;
            for item in items {
                write_value(item, out, classes)?;
            }
            Ok(())
        }
        Value::Map(map) => write_map(out, map, classes),
        Value::Custom(custom) => {
            let name = custom.type_name();
            match classes.index_of(name) {
                Some(index) => {
                    out.write_u8(Tag::CustomIndex.as_byte())?;
                    write_length(out, index)?;
                }
                None => {
                    let index = classes.allocate(name);
                    out.write_u8(Tag::CustomClass.as_byte())?;
                    write_length(out, index)?;
                    write_str(out, name)?;
                }
            }
            write_map(out, &custom.to_map(), classes)
        }
    }
}

fn write_integer<W: Write + ?Sized>(out: &mut W, v: i64) -> io::Result<()> {
    if v < 0 {
        out.write_u8(Tag::LongNeg.as_byte())?;
        write_length(out, v.unsigned_abs())
    } else if v as u64 >= LONG_BIG_THRESHOLD {
        out.write_u8(Tag::LongBig.as_byte())?;
        out.write_i64::<BigEndian>(v)
    } else {
        out.write_u8(Tag::Long.as_byte())?;
        write_length(out, v as u64)
    }
}

/// Entries go out in key order so equal maps encode to equal bytes
fn write_map<W: Write + ?Sized>(
    out: &mut W,
    map: &ValueMap,
    classes: &mut ClassDictionary,
) -> io::Result<()> {
    out.write_u8(Tag::Map.as_byte())?;
    write_length(out, map.len() as u64)?;
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by_key(|(k, _)| *k);
    for (key, value) in entries {
        out.write_u8(Tag::String.as_byte())?;
        write_str(out, key)?;
        write_value(value, out, classes)?;
    }
    Ok(())
}

fn write_str<W: Write + ?Sized>(out: &mut W, s: &str) -> io::Result<()> {
    write_length(out, s.len() as u64)?;
    out.write_all(s.as_bytes())
}

fn apply(staged: Vec<(Field, Option<Value>)>, record: &mut dyn Record) {
    for (field, value) in staged {
        record.set(&field, value);
    }
}

fn read_tag<R: Read + ?Sized>(input: &mut R) -> Result<Tag> {
    Tag::try_from(input.read_u8()?)
}

/// First byte of a record, or `None` at a clean end of input
fn read_start<R: Read + ?Sized>(input: &mut R) -> Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match input.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ProtocolError::Io(e)),
        }
    }
}
