//! Human-readable, step-by-step rendering of encoding and decoding.

use std::io::Write;

use crate::decoder::apply_token;
use crate::encoder::Encoder;
use crate::error::Result;
use crate::token::Token;
use crate::CodecConfig;

/// Render bytes as an escaped, quoted string
fn quoted(bytes: &[u8]) -> String {
    format!("\"{}\"", bytes.escape_ascii())
}

fn token_list(tokens: &[Token]) -> String {
    tokens.iter().map(Token::to_string).collect::<Vec<_>>().join(" ")
}

/// Encode `input`, writing every step of the parse to `out`
pub fn trace_encoding<W: Write>(input: &[u8], config: &CodecConfig, mut out: W) -> Result<Vec<Token>> {
    let encoder = Encoder::new(config.clone())?;

    writeln!(out, "=== Encoding trace ===")?;
    writeln!(out, "Input: {}", quoted(input))?;
    writeln!(out, "Window size: {}", config.window_size)?;
    writeln!(out, "Look-ahead size: {}", config.lookahead_size)?;
    writeln!(out, "Minimum match: {}", config.min_match)?;
    writeln!(out)?;

    // The observer cannot return errors, so keep the first one and stop writing.
    let mut failure = None;
    let tokens = encoder.encode_with(input, |step| {
        if failure.is_some() {
            return;
        }
        let mut render = || -> std::io::Result<()> {
            writeln!(out, "Position: {}", step.position)?;
            if step.window.is_empty() {
                writeln!(out, "Window: (empty)")?;
            } else {
                writeln!(out, "Window: {}", quoted(step.window))?;
            }
            writeln!(out, "Look-ahead: {}", quoted(step.lookahead))?;

            if step.found.length == 0 {
                writeln!(out, "No match found")?;
            } else {
                let start = step.position - step.found.distance;
                let run = &step.window[step.window.len() - step.found.distance..];
                let run = if step.found.length <= run.len() {
                    quoted(&run[..step.found.length])
                } else {
                    // Self-overlapping run: show the repeating source bytes
                    format!("{} repeated", quoted(run))
                };
                writeln!(
                    out,
                    "Found match: length {}, distance {} (from position {}): {}",
                    step.found.length, step.found.distance, start, run
                )?;
                if !step.token.is_match() {
                    writeln!(out, "Match below minimum, emitting literal")?;
                }
            }

            match step.token.literal {
                Some(byte) => writeln!(out, "Next byte: '{}'", byte.escape_ascii())?,
                None => writeln!(out, "Next byte: EOF")?,
            }
            writeln!(out, "Output token: {}", step.token)?;
            writeln!(out, "New position: {}", step.position + step.token.uncompressed_size())?;
            writeln!(out)
        };
        if let Err(e) = render() {
            failure = Some(e);
        }
    });
    if let Some(e) = failure {
        return Err(e.into());
    }

    writeln!(out, "=== Encoded sequence ===")?;
    writeln!(out, "{}", token_list(&tokens))?;
    writeln!(out)?;
    Ok(tokens)
}

/// Decode `tokens`, writing the reconstruction of every token to `out`
pub fn trace_decoding<W: Write>(tokens: &[Token], mut out: W) -> Result<Vec<u8>> {
    writeln!(out, "=== Decoding trace ===")?;
    writeln!(out, "Input tokens: {}", token_list(tokens))?;
    writeln!(out)?;

    let mut output = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        writeln!(out, "Processing token {}: {}", i + 1, token)?;
        writeln!(out, "Current output: {}", quoted(&output))?;

        let before = output.len();
        apply_token(token, &mut output)?;

        if token.is_match() {
            let copied = before..before + token.length as usize;
            writeln!(
                out,
                "Copied {} bytes from distance {} (position {}): {}",
                token.length,
                token.distance,
                before - token.distance as usize,
                quoted(&output[copied])
            )?;
        } else {
            writeln!(out, "No match part")?;
        }
        match token.literal {
            Some(byte) => writeln!(out, "Added next byte: '{}'", byte.escape_ascii())?,
            None => writeln!(out, "End of input")?,
        }
        writeln!(out, "Output after this token: {}", quoted(&output))?;
        writeln!(out)?;
    }

    writeln!(out, "=== Decoded output ===")?;
    writeln!(out, "{}", quoted(&output))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(input: &[u8], config: &CodecConfig) -> (Vec<Token>, String) {
        let mut out = Vec::new();
        let tokens = trace_encoding(input, config, &mut out).unwrap();
        (tokens, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_encoding_trace_matches_encoder() {
        let input = b"abracadabra abracadabra";
        let config = CodecConfig::new(32, 16);
        let (tokens, text) = trace(input, &config);

        assert_eq!(tokens, crate::encode(input, 32, 16).unwrap());
        assert!(text.starts_with("=== Encoding trace ==="));
        assert!(text.contains("Window: (empty)"));
        assert_eq!(text.matches("Output token:").count(), tokens.len());
        assert!(text.contains("=== Encoded sequence ==="));
    }

    #[test]
    fn test_encoding_trace_reports_overlapping_run() {
        let (_, text) = trace(b"aaaaaaaaaa", &CodecConfig::new(9, 9));
        assert!(text.contains("Found match: length 9, distance 1 (from position 0): \"a\" repeated"));
        assert!(text.contains("Output token: <1,9,EOF>"));
        assert!(text.contains("Next byte: EOF"));
    }

    #[test]
    fn test_encoding_trace_short_match() {
        let config = CodecConfig::new(16, 8).with_search(crate::MatchSearch::Exhaustive);
        let (tokens, text) = trace(b"abXab", &config);
        assert!(tokens.iter().all(|t| !t.is_match()));
        assert!(text.contains("Match below minimum, emitting literal"));
    }

    #[test]
    fn test_decoding_trace() {
        let tokens = [Token::literal(b'a'), Token::literal(b'b'), Token::reference(2, 4, Some(b'\n'))];
        let mut out = Vec::new();
        let output = trace_decoding(&tokens, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(output, b"ababab\n");
        assert!(text.contains("Copied 4 bytes from distance 2 (position 0): \"abab\""));
        assert!(text.contains("Added next byte: '\\n'"));
        assert!(text.ends_with("\"ababab\\n\"\n"));
    }

    #[test]
    fn test_decoding_trace_rejects_bad_reference() {
        let mut out = Vec::new();
        let result = trace_decoding(&[Token::reference(1, 1, None)], &mut out);
        assert!(result.is_err());
    }
}
