use crate::error::{Error, Result};
use std::io::Write;

/// Staged bytes are handed to the sink once this many accumulate
const FLUSH_THRESHOLD: usize = 8192;

/// Bit-level writer for LZ77 frames
///
/// Writes bits MSB-first: the first bit written lands in bit 7 of the first
/// output byte. A partially filled byte is zero-padded in its low bits when
/// the writer is finished, or dropped without being finished.
pub struct BitWriter<W: Write> {
    /// Destination sink (`None` once finished)
    writer: Option<W>,
    /// Whole bytes waiting to be written to the sink
    staged: Vec<u8>,
    /// Current byte being built
    current_byte: u8,
    /// Bits written to current byte (0-7)
    bits_in_byte: u8,
    /// Bytes already handed to the sink
    flushed: u64,
}

impl<W: Write> BitWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Some(writer),
            staged: Vec::with_capacity(FLUSH_THRESHOLD),
            current_byte: 0,
            bits_in_byte: 0,
            flushed: 0,
        }
    }

    /// Write a single bit
    #[inline]
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.current_byte |= (bit as u8) << (7 - self.bits_in_byte);
        self.bits_in_byte += 1;

        if self.bits_in_byte == 8 {
            let byte = self.current_byte;
            self.current_byte = 0;
            self.bits_in_byte = 0;
            self.push_byte(byte)?;
        }
        Ok(())
    }

    /// Write the low `n` bits (0-32) of `value`, most significant first
    pub fn write_bits(&mut self, value: u32, n: u8) -> Result<()> {
        debug_assert!(n <= 32);

        for shift in (0..n).rev() {
            self.write_bit((value >> shift) & 1 != 0)?;
        }
        Ok(())
    }

    /// Write a full byte, bypassing the bit accumulator when aligned
    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        if self.bits_in_byte == 0 {
            self.push_byte(byte)
        } else {
            self.write_bits(byte as u32, 8)
        }
    }

    /// Write a 32-bit value in big-endian
    pub fn write_u32_be(&mut self, value: u32) -> Result<()> {
        for byte in value.to_be_bytes() {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Write a 64-bit value in big-endian
    pub fn write_u64_be(&mut self, value: u64) -> Result<()> {
        for byte in value.to_be_bytes() {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Pad to byte boundary with zero bits
    pub fn align_to_byte(&mut self) -> Result<()> {
        if self.bits_in_byte > 0 {
            let byte = self.current_byte;
            self.current_byte = 0;
            self.bits_in_byte = 0;
            self.push_byte(byte)?;
        }
        Ok(())
    }

    /// Whole bytes emitted so far; a partial byte counts once it is completed
    pub fn bytes_written(&self) -> u64 {
        self.flushed + self.staged.len() as u64
    }

    /// Get current output length in bytes (including partial byte)
    pub fn len(&self) -> u64 {
        self.flushed + self.staged.len() as u64 + u64::from(self.bits_in_byte > 0)
    }

    /// Check if nothing has been written yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pad the last byte, flush everything and hand back the sink
    pub fn finish(mut self) -> Result<W> {
        self.align_to_byte()?;
        self.flush_staged()?;

        let mut writer = self
            .writer
            .take()
            .ok_or_else(|| Error::Internal("bit writer sink already taken".to_string()))?;
        writer.flush()?;
        Ok(writer)
    }

    fn push_byte(&mut self, byte: u8) -> Result<()> {
        self.staged.push(byte);
        if self.staged.len() >= FLUSH_THRESHOLD {
            self.flush_staged()?;
        }
        Ok(())
    }

    fn flush_staged(&mut self) -> Result<()> {
        if self.staged.is_empty() {
            return Ok(());
        }
        if let Some(writer) = self.writer.as_mut() {
            writer.write_all(&self.staged)?;
            self.flushed += self.staged.len() as u64;
            self.staged.clear();
        }
        Ok(())
    }
}

impl<W: Write> Drop for BitWriter<W> {
    fn drop(&mut self) {
        if self.writer.is_none() {
            return;
        }
        // Errors cannot be reported from drop; callers that care use `finish`.
        let _ = self.align_to_byte();
        let _ = self.flush_staged();
        if let Some(writer) = self.writer.as_mut() {
            let _ = writer.flush();
        }
    }
}
