//! Bit-level wire format for token sequences.
//!
//! ```text
//! frame   := count:u32be token{count} padding
//! token   := 0 literal:8
//!          | 1 distance:varint length:varint present:1 [literal:8]
//! ```
//!
//! Fields are packed MSB-first with no alignment between tokens. The last
//! byte is zero-padded. The frame carries no end marker: its extent comes
//! from the token count alone.

use std::io::{Read, Write};

use crate::bits::{BitReader, BitWriter};
use crate::error::{Error, Result};
use crate::token::Token;
use crate::varint::{read_varint, write_varint};

/// Upper bound on tokens preallocated from an untrusted header
const MAX_PREALLOCATED_TOKENS: usize = 1 << 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WriterState {
    Start,
    /// Header written, this many tokens still expected
    Tokens { remaining: u32 },
}

/// Writes one frame: header first, then exactly the declared number of tokens
pub struct FrameWriter<W: Write> {
    bits: BitWriter<W>,
    state: WriterState,
    declared: u32,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { bits: BitWriter::new(writer), state: WriterState::Start, declared: 0 }
    }

    /// Write the token count header
    pub fn write_header(&mut self, token_count: u32) -> Result<()> {
        if self.state != WriterState::Start {
            return Err(Error::FrameState("header written twice"));
        }
        self.bits.write_u32_be(token_count)?;
        self.declared = token_count;
        self.state = WriterState::Tokens { remaining: token_count };
        Ok(())
    }

    /// Write one token
    pub fn write_token(&mut self, token: &Token) -> Result<()> {
        let remaining = match self.state {
            WriterState::Start => return Err(Error::FrameState("token written before header")),
            WriterState::Tokens { remaining: 0 } => {
                return Err(Error::TokenCountMismatch {
                    declared: self.declared,
                    found: u64::from(self.declared) + 1,
                })
            }
            WriterState::Tokens { remaining } => remaining,
        };
        token.check_shape()?;

        if token.is_match() {
            self.bits.write_bit(true)?;
            write_varint(&mut self.bits, token.distance)?;
            write_varint(&mut self.bits, token.length)?;
            self.bits.write_bit(token.literal.is_some())?;
            if let Some(byte) = token.literal {
                self.bits.write_byte(byte)?;
            }
        } else if let Some(byte) = token.literal {
            self.bits.write_bit(false)?;
            self.bits.write_byte(byte)?;
        }
        log::trace!("frame token {}", token);

        self.state = WriterState::Tokens { remaining: remaining - 1 };
        Ok(())
    }

    /// Bytes produced so far, counting a partially filled byte
    pub fn len(&self) -> u64 {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Pad and flush the frame and return the sink with the frame size
    pub fn finish(self) -> Result<(W, u64)> {
        match self.state {
            WriterState::Start => return Err(Error::FrameState("frame finished without header")),
            WriterState::Tokens { remaining: 0 } => {}
            WriterState::Tokens { remaining } => {
                return Err(Error::TokenCountMismatch {
                    declared: self.declared,
                    found: u64::from(self.declared - remaining),
                })
            }
        }
        let size = self.bits.len();
        let writer = self.bits.finish()?;
        Ok((writer, size))
    }
}

/// Serialize `tokens` as one frame into `sink`, returning the bytes written
pub fn write_frame<W: Write>(tokens: &[Token], sink: W) -> Result<u64> {
    let count = u32::try_from(tokens.len()).map_err(|_| Error::TooManyTokens(tokens.len()))?;

    let mut frame = FrameWriter::new(sink);
    frame.write_header(count)?;
    for token in tokens {
        frame.write_token(token)?;
    }
    let (_, size) = frame.finish()?;

    log::debug!("wrote frame of {} tokens in {} bytes", count, size);
    Ok(size)
}

/// Reads the tokens of one frame
pub struct FrameReader<R: Read> {
    bits: BitReader<R>,
    declared: u32,
    read: u32,
}

impl<R: Read> FrameReader<R> {
    /// Read the frame header from `reader`
    pub fn new(reader: R) -> Result<Self> {
        let mut bits = BitReader::new(reader);
        let declared = bits.read_u32_be()?;
        Ok(Self { bits, declared, read: 0 })
    }

    /// Token count declared by the header
    pub fn token_count(&self) -> u32 {
        self.declared
    }

    /// Tokens not yet read
    pub fn remaining(&self) -> u32 {
        self.declared - self.read
    }

    /// Bytes consumed so far, header included
    pub fn bytes_read(&self) -> u64 {
        self.bits.bytes_read()
    }

    /// Read the next token, or `None` once the declared count is reached
    pub fn read_token(&mut self) -> Result<Option<Token>> {
        if self.read == self.declared {
            return Ok(None);
        }

        let token = if self.bits.read_bit()? {
            let distance = read_varint(&mut self.bits)?;
            let length = read_varint(&mut self.bits)?;
            let literal = if self.bits.read_bit()? { Some(self.bits.read_byte()?) } else { None };
            Token::reference(distance, length, literal)
        } else {
            Token::literal(self.bits.read_byte()?)
        };
        token.check_shape()?;

        self.read += 1;
        Ok(Some(token))
    }

    /// Drop the padding bits and return the reader positioned after the frame
    pub fn into_inner(mut self) -> R {
        self.bits.align_to_byte();
        self.bits.into_inner()
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_token().transpose()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining() as usize))
    }
}

/// Deserialize one frame from `source`
pub fn read_frame<R: Read>(source: R) -> Result<Vec<Token>> {
    let mut frame = FrameReader::new(source)?;
    let declared = frame.token_count();
    let mut tokens = Vec::with_capacity((declared as usize).min(MAX_PREALLOCATED_TOKENS));

    while let Some(token) = frame.read_token()? {
        tokens.push(token);
    }

    log::debug!("read frame of {} tokens", declared);
    Ok(tokens)
}
