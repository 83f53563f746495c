use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Invalid configuration: {field} must be at least 1, got {value}")]
    InvalidConfig { field: &'static str, value: u32 },

    // Frame errors
    #[error("Unexpected end of frame")]
    UnexpectedEof,

    #[error("Variable-length integer does not fit in 32 bits")]
    VarintOverflow,

    #[error("Frame declares {declared} tokens but {found} were present")]
    TokenCountMismatch { declared: u32, found: u64 },

    #[error("Too many tokens for a single frame: {0}")]
    TooManyTokens(usize),

    #[error("Frame writer misuse: {0}")]
    FrameState(&'static str),

    // Token errors
    #[error("Invalid token shape: distance={distance}, length={length}, literal present={has_literal}")]
    InvalidToken { distance: u32, length: u32, has_literal: bool },

    #[error("Back-reference distance {distance} exceeds available window {available}")]
    InvalidBackReference { distance: u32, available: usize },

    // Archive errors
    #[error("Invalid archive magic bytes: expected \"LZ77\", got {0:02x?}")]
    InvalidMagic([u8; 4]),

    #[error("Unsupported archive version: {0}")]
    UnsupportedVersion(u8),

    #[error("CRC32 mismatch: expected 0x{expected:08x}, got 0x{found:08x}")]
    Crc32Mismatch { expected: u32, found: u32 },

    #[error("Size mismatch: expected {expected} bytes, got {found}")]
    SizeMismatch { expected: u64, found: u64 },

    // Verification errors
    #[error("Round trip mismatch: decoded output first differs from the input at byte {offset}")]
    RoundTripMismatch { offset: u64 },

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
