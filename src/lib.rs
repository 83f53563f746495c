pub mod bits;
pub mod container;
pub mod corpus;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod matcher;
pub mod metrics;
pub mod token;
pub mod trace;
pub mod varint;
pub mod window;

pub use container::{read_archive, write_archive, ArchiveStats};
pub use decoder::{decode, decode_into};
pub use encoder::{EncodeStep, Encoder};
pub use error::{Error, Result};
pub use frame::{read_frame, write_frame, FrameReader, FrameWriter};
pub use metrics::CompressionStats;
pub use token::Token;
pub use window::StreamingDecoder;

/// How the encoder searches the window for the longest match
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MatchSearch {
    /// Compare against every window position
    Exhaustive,
    /// Only visit positions that share a hashed prefix with the look-ahead
    #[default]
    HashChain,
}

impl MatchSearch {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exhaustive => "exhaustive",
            Self::HashChain => "hash-chain",
        }
    }
}

/// Parameters of the encoder
///
/// The decoder needs none of these: a token stream is self-contained. The
/// archive container records them so a reader can bound its window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecConfig {
    /// Furthest distance a back-reference may reach (default: 4096)
    pub window_size: u32,
    /// Longest run a single match may cover (default: 40)
    pub lookahead_size: u32,
    /// Shortest run emitted as a match; shorter ones become literals (default: 3)
    pub min_match: u32,
    /// Match search strategy; affects speed only, never the tokens
    pub search: MatchSearch,
}

impl CodecConfig {
    pub fn new(window_size: u32, lookahead_size: u32) -> Self {
        Self { window_size, lookahead_size, ..Self::default() }
    }

    pub fn with_min_match(mut self, min_match: u32) -> Self {
        self.min_match = min_match;
        self
    }

    pub fn with_search(mut self, search: MatchSearch) -> Self {
        self.search = search;
        self
    }

    /// Reject zero sizes
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("window_size", self.window_size),
            ("lookahead_size", self.lookahead_size),
            ("min_match", self.min_match),
        ];
        for (field, value) in fields {
            if value == 0 {
                return Err(Error::InvalidConfig { field, value });
            }
        }
        Ok(())
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self { window_size: 4096, lookahead_size: 40, min_match: 3, search: MatchSearch::HashChain }
    }
}

/// Encode `input` with the given window and look-ahead sizes and the default
/// minimum match of 3.
pub fn encode(input: &[u8], window_size: u32, lookahead_size: u32) -> Result<Vec<Token>> {
    let encoder = Encoder::new(CodecConfig::new(window_size, lookahead_size))?;
    Ok(encoder.encode(input))
}
