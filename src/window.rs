//! Bounded-memory token replay.
//!
//! [`StreamingDecoder`] writes decoded bytes straight to a sink and keeps only
//! the trailing `window_size` bytes for back-references, instead of the whole
//! output like [`crate::decode`].

use std::io::Write;

use crate::error::{Error, Result};
use crate::token::Token;

/// Decoded bytes are handed to the sink in chunks of this size
const OUTPUT_CHUNK: usize = 64 * 1024;

/// Circular buffer holding the most recent `capacity` output bytes
///
/// The buffer grows on demand up to `capacity`, so a large configured window
/// costs nothing until that much output exists.
pub struct SlidingWindow {
    buffer: Vec<u8>,
    capacity: usize,
    /// Next write position (0..capacity)
    write_pos: usize,
    /// Total bytes ever written
    total_written: u64,
}

impl SlidingWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Vec::with_capacity(capacity.min(OUTPUT_CHUNK)),
            capacity,
            write_pos: 0,
            total_written: 0,
        }
    }

    /// Add a single byte to the window
    #[inline]
    pub fn push_byte(&mut self, byte: u8) {
        if self.buffer.len() < self.capacity {
            self.buffer.push(byte);
        } else {
            self.buffer[self.write_pos] = byte;
        }
        self.write_pos = (self.write_pos + 1) % self.capacity;
        self.total_written += 1;
    }

    /// Byte `distance` positions back; 1 is the most recently written byte
    #[inline]
    fn byte_back(&self, distance: usize) -> u8 {
        debug_assert!((1..=self.available()).contains(&distance));
        self.buffer[(self.write_pos + self.capacity - distance) % self.capacity]
    }

    /// Copy `length` bytes from `distance` bytes back onto the window,
    /// passing each to `f`.
    ///
    /// Length can exceed distance: every byte is read after the previous one
    /// was pushed, so the run repeats itself.
    pub fn copy_match<F: FnMut(u8)>(&mut self, distance: u32, length: u32, mut f: F) -> Result<()> {
        let back = distance as usize;
        if back == 0 || back > self.available() {
            return Err(Error::InvalidBackReference { distance, available: self.available() });
        }
        for _ in 0..length {
            let byte = self.byte_back(back);
            self.push_byte(byte);
            f(byte);
        }
        Ok(())
    }

    /// Get available window size
    pub fn available(&self) -> usize {
        self.buffer.len()
    }

    /// Get total bytes written
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Replays tokens into a `Write` sink with a bounded window
pub struct StreamingDecoder<W: Write> {
    window: SlidingWindow,
    writer: W,
    /// Decoded bytes not yet handed to the sink
    pending: Vec<u8>,
}

impl<W: Write> StreamingDecoder<W> {
    /// `window_size` must be at least the largest distance in the stream
    pub fn new(writer: W, window_size: u32) -> Self {
        Self {
            window: SlidingWindow::new(window_size as usize),
            writer,
            pending: Vec::with_capacity(OUTPUT_CHUNK),
        }
    }

    /// Decode one token
    pub fn push_token(&mut self, token: &Token) -> Result<()> {
        token.check_shape()?;

        // A long match is copied in pieces that fit the staging chunk, so
        // `pending` never grows past OUTPUT_CHUNK.
        let mut remaining = token.length;
        while remaining > 0 {
            let room = (OUTPUT_CHUNK - self.pending.len()) as u32;
            let step = remaining.min(room);
            let pending = &mut self.pending;
            self.window.copy_match(token.distance, step, |byte| pending.push(byte))?;
            remaining -= step;
            self.flush_if_full()?;
        }
        if let Some(byte) = token.literal {
            self.window.push_byte(byte);
            self.pending.push(byte);
            self.flush_if_full()?;
        }
        Ok(())
    }

    /// Bytes decoded so far
    pub fn total_output(&self) -> u64 {
        self.window.total_written()
    }

    /// Flush remaining output and return the sink with the total byte count
    pub fn finish(mut self) -> Result<(W, u64)> {
        self.flush_pending()?;
        self.writer.flush()?;
        let total = self.window.total_written();
        Ok((self.writer, total))
    }

    fn flush_if_full(&mut self) -> Result<()> {
        if self.pending.len() >= OUTPUT_CHUNK {
            self.flush_pending()?;
        }
        Ok(())
    }

    fn flush_pending(&mut self) -> Result<()> {
        self.writer.write_all(&self.pending)?;
        self.pending.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_match(window: &mut SlidingWindow, distance: u32, length: u32) -> Vec<u8> {
        let mut out = Vec::new();
        window.copy_match(distance, length, |b| out.push(b)).unwrap();
        out
    }

    #[test]
    fn test_copy_recent_bytes() {
        let mut window = SlidingWindow::new(16);
        for b in b"xyz" {
            window.push_byte(*b);
        }

        assert_eq!(collect_match(&mut window, 3, 3), b"xyz");
        assert_eq!(collect_match(&mut window, 1, 1), b"z");
        assert_eq!(window.total_written(), 7);
    }

    #[test]
    fn test_copy_repeats_single_byte() {
        let mut window = SlidingWindow::new(16);
        window.push_byte(b'q');
        assert_eq!(collect_match(&mut window, 1, 6), b"qqqqqq");
    }

    #[test]
    fn test_copy_repeats_pair() {
        let mut window = SlidingWindow::new(16);
        window.push_byte(b'0');
        window.push_byte(b'1');
        assert_eq!(collect_match(&mut window, 2, 5), b"01010");
    }

    #[test]
    fn test_ring_keeps_only_capacity() {
        let mut window = SlidingWindow::new(1000);
        for i in 0..25_000u32 {
            window.push_byte((i % 251) as u8);
        }

        assert_eq!(window.available(), 1000);
        assert_eq!(window.capacity(), 1000);
        assert_eq!(collect_match(&mut window, 1, 1), vec![(24_999 % 251) as u8]);
        // 25_001 bytes written; distance 1000 lands on byte 24_001
        assert_eq!(collect_match(&mut window, 1000, 1), vec![(24_001 % 251) as u8]);
    }

    #[test]
    fn test_window_rejects_distance_beyond_capacity() {
        let mut window = SlidingWindow::new(4);
        for b in b"abcdef" {
            window.push_byte(*b);
        }
        let result = window.copy_match(5, 1, |_| {});
        assert!(matches!(result, Err(Error::InvalidBackReference { distance: 5, available: 4 })));
    }

    #[test]
    fn test_streaming_matches_in_memory() {
        let tokens = [
            Token::literal(b'a'),
            Token::literal(b'b'),
            Token::reference(2, 7, Some(b'c')),
            Token::reference(3, 3, None),
        ];
        let mut decoder = StreamingDecoder::new(Vec::new(), 8);
        for token in &tokens {
            decoder.push_token(token).unwrap();
        }
        let (output, total) = decoder.finish().unwrap();

        assert_eq!(output, crate::decode(&tokens).unwrap());
        assert_eq!(total, output.len() as u64);
    }

    #[test]
    fn test_streaming_large_output_flushes_in_chunks() {
        let mut decoder = StreamingDecoder::new(Vec::new(), 4);
        decoder.push_token(&Token::literal(b'z')).unwrap();
        for _ in 0..100 {
            decoder.push_token(&Token::reference(1, 4000, None)).unwrap();
        }
        let (output, total) = decoder.finish().unwrap();
        assert_eq!(total, 400_001);
        assert!(output.iter().all(|&b| b == b'z'));
    }

    #[test]
    fn test_streaming_long_match_keeps_staging_bounded() {
        let mut decoder = StreamingDecoder::new(Vec::new(), 4);
        decoder.push_token(&Token::literal(b'z')).unwrap();
        decoder.push_token(&Token::reference(1, 5_000_000, None)).unwrap();
        assert!(decoder.pending.capacity() <= 2 * OUTPUT_CHUNK);
        assert!(decoder.pending.len() < OUTPUT_CHUNK);

        let (output, total) = decoder.finish().unwrap();
        assert_eq!(total, 5_000_001);
        assert_eq!(output.len(), 5_000_001);
        assert!(output.iter().all(|&b| b == b'z'));
    }

    #[test]
    fn test_streaming_match_split_across_chunks_keeps_pattern() {
        let mut decoder = StreamingDecoder::new(Vec::new(), 8);
        for b in b"abc" {
            decoder.push_token(&Token::literal(*b)).unwrap();
        }
        let length = (OUTPUT_CHUNK * 2 + 7) as u32;
        decoder.push_token(&Token::reference(3, length, Some(b'!'))).unwrap();
        let (output, _) = decoder.finish().unwrap();

        let mut expected: Vec<u8> = b"abc".iter().cycle().take(3 + length as usize).copied().collect();
        expected.push(b'!');
        assert_eq!(output, expected);
    }

    #[test]
    fn test_streaming_rejects_invalid_token() {
        let mut decoder = StreamingDecoder::new(Vec::new(), 8);
        assert!(decoder.push_token(&Token::reference(0, 2, None)).is_err());
    }
}
