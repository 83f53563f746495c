use crate::error::{Error, Result};
use std::io::Read;

/// Bit-level reader for LZ77 frames
///
/// Bits are read MSB-first within each byte, mirroring [`super::BitWriter`].
/// Bytes are pulled from the source one at a time, so after
/// [`BitReader::into_inner`] the source sits right after the last byte that
/// contributed a bit. Wrap unbuffered sources in a `BufReader`.
pub struct BitReader<R: Read> {
    reader: R,
    /// Byte currently being consumed
    current_byte: u8,
    /// Unread bits left in `current_byte` (0-8)
    bits_available: u8,
    /// Total bytes read (for error reporting)
    bytes_read: u64,
}

impl<R: Read> BitReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, current_byte: 0, bits_available: 0, bytes_read: 0 }
    }

    /// Pull the next whole byte from the source
    fn fetch_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        match self.reader.read_exact(&mut byte) {
            Ok(()) => {
                self.bytes_read += 1;
                Ok(byte[0])
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(Error::UnexpectedEof),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Read a single bit
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.bits_available == 0 {
            self.current_byte = self.fetch_byte()?;
            self.bits_available = 8;
        }
        self.bits_available -= 1;
        Ok((self.current_byte >> self.bits_available) & 1 != 0)
    }

    /// Read `n` bits (0-32), most significant first
    pub fn read_bits(&mut self, n: u8) -> Result<u32> {
        debug_assert!(n <= 32, "Cannot read more than 32 bits at once");

        let mut value = 0u32;
        for _ in 0..n {
            value = (value << 1) | self.read_bit()? as u32;
        }
        Ok(value)
    }

    /// Read 8 bits, straight from the source when aligned
    pub fn read_byte(&mut self) -> Result<u8> {
        if self.bits_available == 0 {
            self.fetch_byte()
        } else {
            self.read_bits(8).map(|v| v as u8)
        }
    }

    /// Read a 32-bit big-endian value
    pub fn read_u32_be(&mut self) -> Result<u32> {
        let mut bytes = [0u8; 4];
        for b in bytes.iter_mut() {
            *b = self.read_byte()?;
        }
        Ok(u32::from_be_bytes(bytes))
    }

    /// Read a 64-bit big-endian value
    pub fn read_u64_be(&mut self) -> Result<u64> {
        let mut bytes = [0u8; 8];
        for b in bytes.iter_mut() {
            *b = self.read_byte()?;
        }
        Ok(u64::from_be_bytes(bytes))
    }

    /// Discard remaining bits in current byte
    pub fn align_to_byte(&mut self) {
        self.bits_available = 0;
    }

    /// Get position in bytes (for error reporting)
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Unread bits left in the current byte
    pub fn bits_available(&self) -> u8 {
        self.bits_available
    }

    /// Get the inner reader (consumes self)
    pub fn into_inner(self) -> R {
        self.reader
    }
}
