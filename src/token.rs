use std::fmt;

use crate::error::{Error, Result};

/// One step of the LZ77 parse: an optional back-reference followed by an
/// optional literal.
///
/// A pure literal has `distance == 0` and `length == 0`. A match copies
/// `length` bytes starting `distance` bytes behind the current output end;
/// `distance < length` is legal and makes the copy repeat itself. The
/// trailing literal is absent only when the match runs to the end of input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    pub distance: u32,
    pub length: u32,
    pub literal: Option<u8>,
}

impl Token {
    /// A token carrying a single literal byte and no match
    pub fn literal(byte: u8) -> Self {
        Self { distance: 0, length: 0, literal: Some(byte) }
    }

    /// A back-reference, optionally followed by a literal
    pub fn reference(distance: u32, length: u32, literal: Option<u8>) -> Self {
        Self { distance, length, literal }
    }

    /// Whether this token carries a back-reference
    pub fn is_match(&self) -> bool {
        self.length > 0
    }

    /// Returns the uncompressed size this token represents
    pub fn uncompressed_size(&self) -> usize {
        self.length as usize + usize::from(self.literal.is_some())
    }

    /// Reject tokens that break the `distance == 0 <=> length == 0` rule or
    /// carry nothing at all.
    pub fn check_shape(&self) -> Result<()> {
        let valid = match (self.distance, self.length) {
            (0, 0) => self.literal.is_some(),
            (0, _) | (_, 0) => false,
            _ => true,
        };
        if valid {
            Ok(())
        } else {
            Err(Error::InvalidToken {
                distance: self.distance,
                length: self.length,
                has_literal: self.literal.is_some(),
            })
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{},{},", self.distance, self.length)?;
        match self.literal {
            Some(byte) => write!(f, "{}>", byte.escape_ascii()),
            None => write!(f, "EOF>"),
        }
    }
}
