//! Self-describing archive around a frame.
//!
//! ```text
//! magic "LZ77" | version:u8 | window:u32be | lookahead:u32be | min_match:u32be
//! frame
//! crc32(original):u32be | original_len:u64be
//! ```
//!
//! The stored window size bounds every distance in the frame, which lets the
//! reader decode with a [`StreamingDecoder`] of that size.

use std::io::{self, Read, Write};

use crate::bits::{BitReader, BitWriter};
use crate::encoder::Encoder;
use crate::error::{Error, Result};
use crate::frame::{FrameReader, FrameWriter};
use crate::window::StreamingDecoder;
use crate::CodecConfig;

pub const MAGIC: [u8; 4] = *b"LZ77";
pub const VERSION: u8 = 1;
/// Magic, version and three u32 parameters
pub const HEADER_SIZE: u64 = 4 + 1 + 4 * 3;
/// CRC32 and original length
pub const TRAILER_SIZE: u64 = 4 + 8;

/// Sizes and parameters of one archive
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    pub original_size: u64,
    pub compressed_size: u64,
    pub token_count: u32,
    pub window_size: u32,
    pub lookahead_size: u32,
    pub min_match: u32,
}

/// Compress `input` into an archive written to `sink`
pub fn write_archive<W: Write>(input: &[u8], config: &CodecConfig, mut sink: W) -> Result<ArchiveStats> {
    let encoder = Encoder::new(config.clone())?;
    let tokens = encoder.encode(input);
    let token_count =
        u32::try_from(tokens.len()).map_err(|_| Error::TooManyTokens(tokens.len()))?;

    let mut header = BitWriter::new(&mut sink);
    for byte in MAGIC {
        header.write_byte(byte)?;
    }
    header.write_byte(VERSION)?;
    header.write_u32_be(config.window_size)?;
    header.write_u32_be(config.lookahead_size)?;
    header.write_u32_be(config.min_match)?;
    header.finish()?;

    let mut frame = FrameWriter::new(&mut sink);
    frame.write_header(token_count)?;
    for token in &tokens {
        frame.write_token(token)?;
    }
    let (_, frame_size) = frame.finish()?;

    let mut trailer = BitWriter::new(&mut sink);
    trailer.write_u32_be(crc32fast::hash(input))?;
    trailer.write_u64_be(input.len() as u64)?;
    trailer.finish()?;

    let stats = ArchiveStats {
        original_size: input.len() as u64,
        compressed_size: HEADER_SIZE + frame_size + TRAILER_SIZE,
        token_count,
        window_size: config.window_size,
        lookahead_size: config.lookahead_size,
        min_match: config.min_match,
    };
    log::debug!("archive: {:?}", stats);
    Ok(stats)
}

/// Passes writes through while hashing them
struct HashingWriter<W: Write> {
    inner: W,
    hasher: crc32fast::Hasher,
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Decompress an archive from `source` into `sink`, verifying its trailer
pub fn read_archive<R: Read, W: Write>(source: R, sink: W) -> Result<ArchiveStats> {
    let mut bits = BitReader::new(source);

    let mut magic = [0u8; 4];
    for b in magic.iter_mut() {
        *b = bits.read_byte()?;
    }
    if magic != MAGIC {
        return Err(Error::InvalidMagic(magic));
    }
    let version = bits.read_byte()?;
    if version != VERSION {
        return Err(Error::UnsupportedVersion(version));
    }

    let config = CodecConfig::new(bits.read_u32_be()?, bits.read_u32_be()?)
        .with_min_match(bits.read_u32_be()?);
    config.validate()?;

    let mut frame = FrameReader::new(bits.into_inner())?;
    let token_count = frame.token_count();
    let sink = HashingWriter { inner: sink, hasher: crc32fast::Hasher::new() };
    let mut decoder = StreamingDecoder::new(sink, config.window_size);

    while let Some(token) = frame.read_token()? {
        decoder.push_token(&token)?;
    }
    let (sink, original_size) = decoder.finish()?;
    let frame_size = frame.bytes_read();

    let mut trailer = BitReader::new(frame.into_inner());
    let expected_crc = trailer.read_u32_be()?;
    let expected_size = trailer.read_u64_be()?;

    let found_crc = sink.hasher.finalize();
    if found_crc != expected_crc {
        return Err(Error::Crc32Mismatch { expected: expected_crc, found: found_crc });
    }
    if original_size != expected_size {
        return Err(Error::SizeMismatch { expected: expected_size, found: original_size });
    }

    Ok(ArchiveStats {
        original_size,
        compressed_size: HEADER_SIZE + frame_size + TRAILER_SIZE,
        token_count,
        window_size: config.window_size,
        lookahead_size: config.lookahead_size,
        min_match: config.min_match,
    })
}
