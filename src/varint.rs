//! Variable-length integers for distances and lengths.
//!
//! Values are split into 7-bit groups, most significant group first. Every
//! group except the last has its high bit set. Values up to 127 take one byte
//! and values up to 16383 take two, where the first byte carries the top 7
//! bits with the high bit set and the second carries the low 7 bits. Larger
//! values simply continue the same pattern, up to 5 bytes for a `u32`.

use crate::bits::{BitReader, BitWriter};
use crate::error::{Error, Result};
use std::io::{Read, Write};

/// Longest encoding of a `u32`
pub const MAX_VARINT_BYTES: usize = 5;

const GROUP_BITS: u32 = 7;
const GROUP_MASK: u32 = 0x7F;
const CONTINUE: u8 = 0x80;

/// Number of bytes `value` occupies on the wire
pub fn encoded_len(value: u32) -> usize {
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        0x20_0000..=0xFFF_FFFF => 4,
        _ => 5,
    }
}

/// Write `value` through the bit writer
pub fn write_varint<W: Write>(bits: &mut BitWriter<W>, value: u32) -> Result<()> {
    let groups = encoded_len(value) as u32;
    for group in (0..groups).rev() {
        let mut byte = ((value >> (group * GROUP_BITS)) & GROUP_MASK) as u8;
        if group > 0 {
            byte |= CONTINUE;
        }
        bits.write_byte(byte)?;
    }
    Ok(())
}

/// Read a value written by [`write_varint`]
pub fn read_varint<R: Read>(bits: &mut BitReader<R>) -> Result<u32> {
    let mut value: u64 = 0;
    for _ in 0..MAX_VARINT_BYTES {
        let byte = bits.read_byte()?;
        value = (value << GROUP_BITS) | u64::from(byte & GROUP_MASK as u8);
        if byte & CONTINUE == 0 {
            return u32::try_from(value).map_err(|_| Error::VarintOverflow);
        }
    }
    Err(Error::VarintOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: u32) -> Vec<u8> {
        let mut writer = BitWriter::new(Vec::new());
        write_varint(&mut writer, value).unwrap();
        writer.finish().unwrap()
    }

    fn decode(bytes: &[u8]) -> Result<u32> {
        let mut reader = BitReader::new(bytes);
        read_varint(&mut reader)
    }

    #[test]
    fn test_one_byte_boundary() {
        assert_eq!(encode(0), vec![0x00]);
        assert_eq!(encode(127), vec![0x7F]);
        assert_eq!(decode(&[0x7F]).unwrap(), 127);
    }

    #[test]
    fn test_two_byte_boundary() {
        assert_eq!(encode(128), vec![0x81, 0x00]);
        assert_eq!(decode(&[0x81, 0x00]).unwrap(), 128);
        assert_eq!(encode(16383), vec![0xFF, 0x7F]);
        assert_eq!(decode(&[0xFF, 0x7F]).unwrap(), 16383);
    }

    #[test]
    fn test_values_past_two_bytes() {
        assert_eq!(encode(16384), vec![0x81, 0x80, 0x00]);
        assert_eq!(decode(&[0x81, 0x80, 0x00]).unwrap(), 16384);

        let bytes = encode(u32::MAX);
        assert_eq!(bytes, vec![0x8F, 0xFF, 0xFF, 0xFF, 0x7F]);
        assert_eq!(decode(&bytes).unwrap(), u32::MAX);
    }

    #[test]
    fn test_encoded_len_matches_output() {
        for value in [0, 1, 127, 128, 300, 16383, 16384, 2_097_151, 2_097_152, u32::MAX] {
            assert_eq!(encode(value).len(), encoded_len(value), "value {}", value);
        }
    }

    #[test]
    fn test_unaligned_varint() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bit(true).unwrap();
        write_varint(&mut writer, 300).unwrap();
        let bytes = writer.finish().unwrap();

        let mut reader = BitReader::new(bytes.as_slice());
        assert!(reader.read_bit().unwrap());
        assert_eq!(read_varint(&mut reader).unwrap(), 300);
    }

    #[test]
    fn test_overflow_rejected() {
        // Six groups
        assert!(matches!(
            decode(&[0x81, 0x80, 0x80, 0x80, 0x80, 0x00]),
            Err(Error::VarintOverflow)
        ));
        // Five groups but wider than 32 bits
        assert!(matches!(decode(&[0x9F, 0xFF, 0xFF, 0xFF, 0x7F]), Err(Error::VarintOverflow)));
    }

    #[test]
    fn test_truncated_varint() {
        assert!(matches!(decode(&[0x81]), Err(Error::UnexpectedEof)));
    }
}
