//! Greedy LZ77 parser.

use crate::error::Result;
use crate::matcher::{ExhaustiveMatcher, HashChainMatcher, Match, MatchFinder};
use crate::token::Token;
use crate::{CodecConfig, MatchSearch};

/// Everything the encoder saw and decided for one token
#[derive(Clone, Debug)]
pub struct EncodeStep<'a> {
    /// Scan position the token starts at
    pub position: usize,
    /// Bytes eligible as back-reference sources
    pub window: &'a [u8],
    /// Bytes the match was measured against
    pub lookahead: &'a [u8],
    /// Best run found, including runs too short to emit
    pub found: Match,
    /// Token emitted for this step
    pub token: Token,
}

/// Greedy sliding-window encoder
///
/// At every scan position the longest run in the window is taken (nearest
/// distance on ties) when it reaches `min_match`; otherwise a single literal
/// is emitted. A match is followed by the next input byte, if any.
pub struct Encoder {
    config: CodecConfig,
}

impl Encoder {
    pub fn new(config: CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode the whole input
    pub fn encode(&self, input: &[u8]) -> Vec<Token> {
        self.encode_with(input, |_| {})
    }

    /// Encode the whole input, reporting every step to `observer`
    pub fn encode_with<F>(&self, input: &[u8], observer: F) -> Vec<Token>
    where
        F: FnMut(&EncodeStep<'_>),
    {
        let mut finder: Box<dyn MatchFinder + '_> = match self.config.search {
            MatchSearch::Exhaustive => Box::new(ExhaustiveMatcher::new(input)),
            MatchSearch::HashChain => {
                Box::new(HashChainMatcher::new(input, self.config.min_match as usize))
            }
        };
        self.parse(input, finder.as_mut(), observer)
    }

    fn parse<M, F>(&self, input: &[u8], finder: &mut M, mut observer: F) -> Vec<Token>
    where
        M: MatchFinder + ?Sized,
        F: FnMut(&EncodeStep<'_>),
    {
        let window_size = self.config.window_size as usize;
        let lookahead_size = self.config.lookahead_size as usize;
        let min_match = self.config.min_match as usize;

        let mut tokens = Vec::new();
        let mut pos = 0;

        while pos < input.len() {
            let window = pos.min(window_size);
            let lookahead = lookahead_size.min(input.len() - pos);
            debug_assert!(lookahead > 0);

            let found = finder.longest_match(pos, window, lookahead);

            let (token, advance) = if found.length < min_match {
                (Token::literal(input[pos]), 1)
            } else {
                let literal = input.get(pos + found.length).copied();
                // Both fit: distance <= window_size and length <= lookahead_size.
                let token = Token::reference(found.distance as u32, found.length as u32, literal);
                (token, found.length + 1)
            };

            observer(&EncodeStep {
                position: pos,
                window: &input[pos - window..pos],
                lookahead: &input[pos..pos + lookahead],
                found,
                token,
            });

            tokens.push(token);
            pos += advance;
        }

        log::debug!(
            "encoded {} bytes into {} tokens (window={}, lookahead={}, search={:?})",
            input.len(),
            tokens.len(),
            window_size,
            lookahead_size,
            self.config.search
        );
        tokens
    }
}
