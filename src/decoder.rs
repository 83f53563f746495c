//! In-memory token replay.

use crate::error::{Error, Result};
use crate::token::Token;

/// Replay `tokens` into a fresh buffer
pub fn decode(tokens: &[Token]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    decode_into(tokens, &mut output)?;
    Ok(output)
}

/// Replay `tokens`, appending to `output`. Back-references may reach into
/// bytes already present in `output`.
pub fn decode_into(tokens: &[Token], output: &mut Vec<u8>) -> Result<()> {
    for token in tokens {
        apply_token(token, output)?;
    }
    log::debug!("decoded {} tokens into {} bytes", tokens.len(), output.len());
    Ok(())
}

/// Append the bytes of a single token
pub fn apply_token(token: &Token, output: &mut Vec<u8>) -> Result<()> {
    token.check_shape()?;

    if token.is_match() {
        let distance = token.distance as usize;
        let length = token.length as usize;
        if distance > output.len() {
            return Err(Error::InvalidBackReference {
                distance: token.distance,
                available: output.len(),
            });
        }

        let start = output.len() - distance;
        if distance >= length {
            output.extend_from_within(start..start + length);
        } else {
            // The run overlaps bytes it is producing: copy one at a time so
            // each read sees the bytes appended before it.
            output.reserve(length);
            for i in 0..length {
                let byte = output[start + i];
                output.push(byte);
            }
        }
    }

    if let Some(byte) = token.literal {
        output.push(byte);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tokens() {
        assert!(decode(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_literals_and_match() {
        let tokens = [
            Token::literal(b'a'),
            Token::literal(b'b'),
            Token::literal(b'c'),
            Token::reference(3, 3, Some(b'd')),
        ];
        assert_eq!(decode(&tokens).unwrap(), b"abcabcd");
    }

    #[test]
    fn test_overlapping_run() {
        let tokens = [Token::literal(b'a'), Token::reference(1, 9, None)];
        assert_eq!(decode(&tokens).unwrap(), b"aaaaaaaaaa");
    }

    #[test]
    fn test_overlapping_pattern() {
        let tokens = [Token::literal(b'A'), Token::literal(b'B'), Token::reference(2, 6, Some(b'C'))];
        assert_eq!(decode(&tokens).unwrap(), b"ABABABABC");
    }

    #[test]
    fn test_distance_beyond_output() {
        let tokens = [Token::literal(b'a'), Token::reference(2, 1, None)];
        assert!(matches!(
            decode(&tokens),
            Err(Error::InvalidBackReference { distance: 2, available: 1 })
        ));
    }

    #[test]
    fn test_zero_distance_with_length() {
        let tokens = [Token::literal(b'a'), Token::reference(0, 3, None)];
        assert!(matches!(decode(&tokens), Err(Error::InvalidToken { distance: 0, length: 3, .. })));
    }

    #[test]
    fn test_decode_into_extends_existing_output() {
        let mut output = b"xyz".to_vec();
        decode_into(&[Token::reference(3, 3, None)], &mut output).unwrap();
        assert_eq!(output, b"xyzxyz");
    }
}
