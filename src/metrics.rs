use std::fmt;
use std::time::Duration;

use crate::CodecConfig;

/// Column names matching [`CompressionStats::to_csv_row`]
pub const CSV_HEADER: &str = "file,window_size,lookahead_size,min_match,original_size,\
compressed_size,tokens,ratio,bits_per_symbol,encode_ms,decode_ms";

/// Size and timing figures for one compress/decompress cycle
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompressionStats {
    pub original_size: u64,
    pub compressed_size: u64,
    pub token_count: u64,
    pub encode_time: Duration,
    pub decode_time: Duration,
}

impl CompressionStats {
    /// Original size over compressed size; higher is better
    pub fn ratio(&self) -> f64 {
        if self.compressed_size == 0 {
            return 0.0;
        }
        self.original_size as f64 / self.compressed_size as f64
    }

    /// Average compressed bits spent per input byte
    pub fn bits_per_symbol(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        self.compressed_size as f64 * 8.0 / self.original_size as f64
    }

    pub fn to_csv_row(&self, name: &str, config: &CodecConfig) -> String {
        format!(
            "{},{},{},{},{},{},{},{:.4},{:.4},{:.2},{:.2}",
            csv_field(name),
            config.window_size,
            config.lookahead_size,
            config.min_match,
            self.original_size,
            self.compressed_size,
            self.token_count,
            self.ratio(),
            self.bits_per_symbol(),
            millis(self.encode_time),
            millis(self.decode_time)
        )
    }
}

impl fmt::Display for CompressionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Original size: {} bytes", self.original_size)?;
        writeln!(f, "Compressed size: {} bytes", self.compressed_size)?;
        writeln!(f, "Tokens: {}", self.token_count)?;
        writeln!(f, "Compression ratio: {:.4}", self.ratio())?;
        writeln!(f, "Average code length: {:.4} bits/symbol", self.bits_per_symbol())?;
        writeln!(f, "Encoding time: {:.2} ms", millis(self.encode_time))?;
        write!(f, "Decoding time: {:.2} ms", millis(self.decode_time))
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Quote a CSV field when it contains a separator, quote or newline
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
