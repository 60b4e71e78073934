//! Codec Scenario Tests
//!
//! End-to-end encode/decode of whole records through the public facade:
//! exact byte layouts, every value kind, custom values, cross-container
//! transfer and malformed input.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test codec_scenarios
//!
//! # Malformed input only
//! cargo test --test codec_scenarios malformed::
//! ```

mod common;

use std::io::Cursor;
use std::sync::Arc;

use bundlekit::model::records_equal;
use bundlekit::prelude::*;
use bundlekit::wire::{Tag, LONG_BIG_THRESHOLD};
use bundlekit::{ProtocolError, RehydrationError};
use common::*;

fn encode_one(record: &dyn Record) -> Vec<u8> {
    codec()
        .encode_record_to_vec(record, &mut Session::new())
        .unwrap()
}

fn decode_one(bytes: &[u8], record: &mut dyn Record) -> std::result::Result<DecodeOutcome, ProtocolError> {
    codec().decode_record_from_slice(bytes, record, &mut Session::new())
}

fn round_trip_field(value: Value) -> Option<Value> {
    let source = list_record_with(&[("v", value)]);
    let bytes = encode_one(&source);
    let mut target = list_record();
    assert_eq!(decode_one(&bytes, &mut target).unwrap(), DecodeOutcome::Record);
    target.get_named("v").cloned()
}

// =============================================================================
// RECORD LAYOUT
// =============================================================================

mod layout {
    use super::*;

    #[test]
    fn test_three_string_fields() {
        let source = list_record_with(&[
            ("abc", Value::from("def")),
            ("ghi", Value::from("jkl")),
            ("mno", Value::from("pqr")),
        ]);
        let bytes = encode_one(&source);

        let mut target = list_record();
        decode_one(&bytes, &mut target).unwrap();
        assert_eq!(target.count(), 3);
        assert_eq!(target.get_named("abc"), Some(&Value::from("def")));
        assert_eq!(target.get_named("ghi"), Some(&Value::from("jkl")));
        assert_eq!(target.get_named("mno"), Some(&Value::from("pqr")));

        let again = encode_one(&target);
        assert_eq!(bytes, again);
    }

    #[test]
    fn test_exact_bytes() {
        let source = list_record_with(&[("abc", Value::from("def")), ("n", Value::from(7i64))]);
        let expected = vec![
            11, // BUNDLE_INIT
            14, 1, 3, b'a', b'b', b'c', // BUNDLE_FIELD_NAME 1 "abc"
            1, 3, b'd', b'e', b'f', // STRING "def"
            14, 2, 1, b'n', // BUNDLE_FIELD_NAME 2 "n"
            3, 7, // LONG 7
            15, // BUNDLE_END
        ];
        assert_eq!(encode_one(&source), expected);
    }

    #[test]
    fn test_empty_record() {
        let bytes = encode_one(&list_record());
        assert_eq!(bytes, vec![Tag::BundleInit.as_byte(), Tag::BundleEnd.as_byte()]);
        let mut target = list_record();
        assert_eq!(decode_one(&bytes, &mut target).unwrap(), DecodeOutcome::Record);
        assert_eq!(target.count(), 0);
    }

    #[test]
    fn test_empty_input_is_end_of_stream() {
        let mut target = list_record();
        assert_eq!(decode_one(&[], &mut target).unwrap(), DecodeOutcome::EndOfStream);
    }

    #[test]
    fn test_decoded_null_field_removes() {
        // FIELD_NAME 1 "gone" NULL
        let bytes = [11, 14, 1, 4, b'g', b'o', b'n', b'e', 0, 15];
        let mut target = list_record_with(&[("gone", Value::from(1i64)), ("kept", Value::from(2i64))]);
        decode_one(&bytes, &mut target).unwrap();
        assert_eq!(target.get_named("gone"), None);
        assert_eq!(target.get_named("kept"), Some(&Value::Integer(2)));
        assert_eq!(target.count(), 1);
    }
}

// =============================================================================
// VALUE KINDS
// =============================================================================

mod value_kinds {
    use super::*;

    #[test]
    fn test_scalars() {
        for value in [
            Value::from("text"),
            Value::from(""),
            Value::Bytes(vec![0, 1, 254, 255]),
            Value::Integer(0),
            Value::Integer(-1),
            Value::Integer(i64::MAX),
            Value::Integer(i64::MIN),
            Value::Float(3.5),
            Value::Float(-0.0),
        ] {
            assert_eq!(round_trip_field(value.clone()), Some(value));
        }
    }

    #[test]
    fn test_nested_collections() {
        let mut inner = ValueMap::new();
        inner.insert("k".into(), Value::Array(vec![Value::from(1i64), Value::from("two")]));
        let mut outer = ValueMap::new();
        outer.insert("inner".into(), Value::Map(inner));
        outer.insert("flag".into(), Value::from(1i64));
        let value = Value::Array(vec![Value::Map(outer), Value::Float(0.25)]);
        assert_eq!(round_trip_field(value.clone()), Some(value));
    }

    #[test]
    fn test_custom_values() {
        let value = Value::Array(vec![point(52.5, 13.4), hits(12), point(-1.0, 2.0)]);
        let decoded = round_trip_field(value.clone()).unwrap();
        assert_eq!(decoded, value);

        let items = decoded.as_array().unwrap();
        assert_eq!(items[0].type_name(), "geo.Point");
        assert_eq!(items[1].as_integer().unwrap(), 12);
        assert_eq!(items[0].as_string().unwrap(), "52.5,13.4");
    }

    #[test]
    fn test_custom_inside_custom_map_field() {
        let mut map = ValueMap::new();
        map.insert("where".into(), point(1.0, 2.0));
        let value = Value::Map(map);
        assert_eq!(round_trip_field(value.clone()), Some(value));
    }
}

// =============================================================================
// NUMERIC BOUNDARIES
// =============================================================================

mod numeric_boundaries {
    use super::*;

    fn value_tag(v: i64) -> u8 {
        let bytes = encode_one(&list_record_with(&[("v", Value::Integer(v))]));
        // BUNDLE_INIT, FIELD_NAME, index, name length, name
        bytes[5]
    }

    #[test]
    fn test_threshold_tags() {
        let threshold = LONG_BIG_THRESHOLD as i64;
        assert_eq!(value_tag(threshold - 1), Tag::Long.as_byte());
        assert_eq!(value_tag(threshold), Tag::LongBig.as_byte());
        assert_eq!(value_tag(threshold + 1), Tag::LongBig.as_byte());
        assert_eq!(value_tag(-5), Tag::LongNeg.as_byte());
        assert_eq!(value_tag(0), Tag::Long.as_byte());
    }

    #[test]
    fn test_threshold_values_survive() {
        let threshold = LONG_BIG_THRESHOLD as i64;
        for v in [threshold - 1, threshold, threshold + 1, -threshold, -5] {
            assert_eq!(round_trip_field(Value::Integer(v)), Some(Value::Integer(v)));
        }
    }
}

// =============================================================================
// CROSS-CONTAINER TRANSFER
// =============================================================================

mod cross_container {
    use super::*;

    #[test]
    fn test_list_to_kv_to_list() {
        let source = list_record_with(&[
            ("name", Value::from("sensor-1")),
            ("at", point(10.0, 20.0)),
            ("reads", Value::Array(vec![Value::from(1i64), Value::from(2i64)])),
        ]);

        let mut kv = kv_record();
        decode_one(&encode_one(&source), &mut kv).unwrap();
        assert!(records_equal(&source, &kv));

        let mut back = list_record();
        decode_one(&encode_one(&kv), &mut back).unwrap();
        assert!(records_equal(&source, &back));
        assert_eq!(encode_one(&back), encode_one(&source));
    }

    #[test]
    fn test_decode_into_populated_format() {
        let format = Arc::new(ListFormat::with_fields(["z", "y", "x"]));
        let mut target = ListRecord::new(Arc::clone(&format));
        let source = list_record_with(&[("x", Value::from(1i64)), ("w", Value::from(2i64))]);

        decode_one(&encode_one(&source), &mut target).unwrap();
        assert_eq!(format.position_of("x"), Some(2));
        assert_eq!(format.position_of("w"), Some(3));
        assert_eq!(target.count(), 2);
    }
}

// =============================================================================
// MALFORMED INPUT
// =============================================================================

mod malformed {
    use super::*;

    #[test]
    fn test_truncated_every_prefix() {
        let source = list_record_with(&[("abc", Value::from("def")), ("p", point(1.0, 2.0))]);
        let bytes = encode_one(&source);
        for cut in 1..bytes.len() {
            let mut target = list_record();
            let err = decode_one(&bytes[..cut], &mut target).unwrap_err();
            assert!(err.is_truncated(), "cut at {} gave {}", cut, err);
            assert_eq!(target.count(), 0);
        }
    }

    #[test]
    fn test_unknown_tag() {
        let mut target = list_record();
        let err = decode_one(&[11, 14, 1, 1, b'a', 200, 15], &mut target).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownTag(200)));
    }

    #[test]
    fn test_value_tag_at_record_start() {
        let mut target = list_record();
        let err = decode_one(&[Tag::String.as_byte(), 0], &mut target).unwrap_err();
        assert!(matches!(err, ProtocolError::UnexpectedTag { .. }));
    }

    #[test]
    fn test_unknown_field_index() {
        let mut target = list_record();
        let err = decode_one(&[12, 13, 5, 3, 1, 15], &mut target).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownFieldIndex(5)));
        assert!(err.is_session_mismatch());
    }

    #[test]
    fn test_unknown_class_index() {
        let mut target = list_record();
        let err = decode_one(&[11, 14, 1, 1, b'a', 9, 7, 8, 0, 15], &mut target).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownClassIndex(7)));
    }

    #[test]
    fn test_unregistered_custom_type() {
        let source = list_record_with(&[("p", point(1.0, 2.0))]);
        let bytes = encode_one(&source);
        let bare = Codec::new(Arc::new(CustomRegistry::new()));
        let mut target = list_record();
        let err = bare
            .decode_record_from_slice(&bytes, &mut target, &mut Session::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Rehydration(RehydrationError::UnknownType(ref name)) if name == "geo.Point"
        ));
    }

    #[test]
    fn test_limits_from_config() {
        let config = bundlekit::load_codec_config("max_length = 4\nmax_depth = 3").unwrap();
        let strict = Codec::with_config(registry(), config);

        let long = encode_one(&list_record_with(&[("s", Value::from("0123456789"))]));
        let err = strict
            .decode_record_from_slice(&long, &mut list_record(), &mut Session::new())
            .unwrap_err();
        assert!(matches!(err, ProtocolError::LengthLimit { length: 10, limit: 4 }));

        let mut nested = Value::Integer(1);
        for _ in 0..5 {
            nested = Value::Array(vec![nested]);
        }
        let deep = encode_one(&list_record_with(&[("d", nested)]));
        let err = strict
            .decode_record_from_slice(&deep, &mut list_record(), &mut Session::new())
            .unwrap_err();
        assert!(matches!(err, ProtocolError::DepthLimit(3)));
    }

    #[test]
    fn test_reader_over_garbage() {
        let mut reader = RecordReader::new(codec(), Cursor::new(vec![11, 14, 1]), &list_record());
        let err = reader.read().unwrap_err();
        assert!(err.is_truncated());
        assert_eq!(reader.records_read(), 0);
    }
}
