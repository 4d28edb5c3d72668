#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use zpack::{Decoder, DecoderConfig};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    data: Vec<u8>,
    max_depth: u8,
}

fuzz_target!(|input: FuzzInput| {
    let decoder = Decoder::with_config(DecoderConfig {
        reserved_map_capacity: 0,
        max_depth: usize::from(input.max_depth),
    });
    // любой вход даёт значение или ошибку, но не панику
    let _ = decoder.decode(&input.data);
});
