//! Fuzz target: `LineDecoder::push`
//!
//! Streams arbitrary bytes through the CR/LF splitter used by the AT
//! engine.  Every yielded line must be non-empty, bounded and free of
//! terminators, and a reset must leave the decoder usable.
//!
//! cargo fuzz run fuzz_line_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use rn4modem::adapters::at_engine::{LineDecoder, MAX_LINE};

fuzz_target!(|data: &[u8]| {
    let mut decoder = LineDecoder::new();

    for &byte in data {
        if let Some(line) = decoder.push(byte) {
            assert!(!line.is_empty(), "decoder must not yield empty lines");
            assert!(line.len() <= MAX_LINE, "line exceeds MAX_LINE");
            assert!(!line.iter().any(|b| matches!(b, b'\r' | b'\n')));
        }
    }

    decoder.reset();
    for &byte in data.iter().chain(b"\r\n") {
        let _ = decoder.push(byte);
    }
});
