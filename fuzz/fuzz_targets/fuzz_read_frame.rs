#![no_main]

use libfuzzer_sys::fuzz_target;
use lz77kit::{decode, read_frame};

/// Skip replaying frames that would expand past this many bytes
const MAX_OUTPUT: u64 = 1 << 24;

fuzz_target!(|data: &[u8]| {
    // Hostile frames must fail cleanly, never panic
    if let Ok(tokens) = read_frame(data) {
        let size: u64 = tokens.iter().map(|t| t.uncompressed_size() as u64).sum();
        if size <= MAX_OUTPUT {
            let _ = decode(&tokens);
        }
    }
});
