//! Prefix-length integer encoding
//!
//! Non-negative magnitudes (string and byte lengths, collection counts,
//! LONG / LONG_NEG payloads, dictionary indices, stream frame lengths) use a
//! compact form where the number of leading one-bits in the first byte is the
//! number of bytes that follow:
//!
//! | First byte  | Extra bytes | Payload bits |
//! |-------------|-------------|--------------|
//! | `0xxxxxxx`  | 0           | 7            |
//! | `10xxxxxx`  | 1           | 14           |
//! | `110xxxxx`  | 2           | 21           |
//! | ...         | ...         | ...          |
//! | `11111110`  | 7           | 56           |
//! | `11111111`  | 8           | 64           |
//!
//! Bits after the terminating zero are the high bits of the value; the extra
//! bytes carry the rest, big-endian. Encoders always pick the shortest form.

use crate::error::ProtocolError;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// Extra bytes needed after the first byte for `v`
fn extra_bytes(v: u64) -> u32 {
    (0..8).find(|&n| v >> (7 * n + 7) == 0).unwrap_or(8)
}

/// Encoded size of `v` in bytes
pub fn encoded_len(v: u64) -> usize {
    extra_bytes(v) as usize + 1
}

/// Write `v` in prefix-length form
pub fn write_length<W: Write + ?Sized>(out: &mut W, v: u64) -> io::Result<()> {
    let n = extra_bytes(v);
    if n == 8 {
        out.write_u8(0xFF)?;
        return out.write_u64::<BigEndian>(v);
    }
    let prefix = !(0xFFu32 >> n) as u8;
    let shift = 8 * n;
    out.write_u8(prefix | (v >> shift) as u8)?;
    if n > 0 {
        out.write_uint::<BigEndian>(v & ((1u64 << shift) - 1), n as usize)?;
    }
    Ok(())
}

/// Read a prefix-length value
pub fn read_length<R: Read + ?Sized>(input: &mut R) -> Result<u64, ProtocolError> {
    let first = input.read_u8()?;
    read_length_after(first, input)
}

/// Read a prefix-length value, or `None` if input ends before its first byte
pub fn read_length_or_eof<R: Read + ?Sized>(
    input: &mut R,
) -> Result<Option<u64>, ProtocolError> {
    let mut first = [0u8; 1];
    loop {
        match input.read(&mut first) {
            Ok(0) => return Ok(None),
            Ok(_) => return read_length_after(first[0], input).map(Some),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

fn read_length_after<R: Read + ?Sized>(first: u8, input: &mut R) -> Result<u64, ProtocolError> {
    let n = first.leading_ones();
    if n == 8 {
        return Ok(input.read_u64::<BigEndian>()?);
    }
    let high = u64::from(first) & (0xFFu64 >> (n + 1));
    if n == 0 {
        return Ok(high);
    }
    let low = input.read_uint::<BigEndian>(n as usize)?;
    Ok((high << (8 * n)) | low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn encode(v: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        write_length(&mut buf, v).unwrap();
        buf
    }

    fn decode(bytes: &[u8]) -> Result<u64, ProtocolError> {
        read_length(&mut Cursor::new(bytes))
    }

    #[test]
    fn test_single_byte() {
        assert_eq!(encode(0), vec![0x00]);
        assert_eq!(encode(5), vec![0x05]);
        assert_eq!(encode(127), vec![0x7F]);
    }

    #[test]
    fn test_two_bytes() {
        assert_eq!(encode(128), vec![0x80, 0x80]);
        assert_eq!(encode(0x3FFF), vec![0xBF, 0xFF]);
        assert_eq!(encode(0x4000).len(), 3);
    }

    #[test]
    fn test_boundaries_sizes() {
        assert_eq!(encoded_len((1 << 49) - 1), 7);
        assert_eq!(encoded_len(1 << 49), 8);
        assert_eq!(encoded_len((1 << 56) - 1), 8);
        assert_eq!(encoded_len(1 << 56), 9);
        assert_eq!(encoded_len(u64::MAX), 9);
    }

    #[test]
    fn test_seven_extra_bytes_prefix() {
        let bytes = encode((1 << 56) - 1);
        assert_eq!(bytes[0], 0xFE);
        assert_eq!(&bytes[1..], &[0xFF; 7]);
    }

    #[test]
    fn test_max_value() {
        let bytes = encode(u64::MAX);
        assert_eq!(bytes[0], 0xFF);
        assert_eq!(decode(&bytes).unwrap(), u64::MAX);
    }

    #[test]
    fn test_truncated() {
        assert!(decode(&[]).unwrap_err().is_truncated());
        assert!(decode(&[0xC0, 0x01]).unwrap_err().is_truncated());
    }

    #[test]
    fn test_or_eof() {
        assert_eq!(read_length_or_eof(&mut Cursor::new(&[] as &[u8])).unwrap(), None);
        assert_eq!(read_length_or_eof(&mut Cursor::new(&[0x80u8, 0x80])).unwrap(), Some(128));
        let err = read_length_or_eof(&mut Cursor::new(&[0x80u8])).unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn test_accepts_non_minimal_form() {
        // 5 spelled with one extra byte
        assert_eq!(decode(&[0x80, 0x05]).unwrap(), 5);
    }

    proptest! {
        #[test]
        fn prop_round_trip(v in any::<u64>()) {
            let bytes = encode(v);
            prop_assert_eq!(bytes.len(), encoded_len(v));
            prop_assert_eq!(decode(&bytes).unwrap(), v);
        }
    }
}
