#![no_main]

use libfuzzer_sys::fuzz_target;
use lz77kit::{decode, read_frame, write_frame, CodecConfig, Encoder};

fuzz_target!(|data: &[u8]| {
    // First two bytes pick the window and look-ahead sizes
    if data.len() < 2 {
        return;
    }
    let config = CodecConfig::new(u32::from(data[0]) * 16 + 1, u32::from(data[1]) + 1);
    let input = &data[2..];

    let tokens = Encoder::new(config).unwrap().encode(input);
    assert_eq!(decode(&tokens).unwrap(), input);

    let mut frame = Vec::new();
    write_frame(&tokens, &mut frame).unwrap();
    assert_eq!(read_frame(frame.as_slice()).unwrap(), tokens);
});
