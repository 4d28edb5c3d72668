#![no_main]

use libfuzzer_sys::fuzz_target;
use zpack::{Decoder, DecoderConfig, Encoder, EncoderConfig, Value};

fuzz_target!(|value: Value| {
    // строка верхнего уровня пишется без тега и может начинаться с байта тега
    if matches!(value, Value::Str(_)) {
        return;
    }

    let mut encoder = Encoder::with_config(EncoderConfig {
        buffer_size: 256,
        ..Default::default()
    });
    let decoder = Decoder::with_config(DecoderConfig {
        reserved_map_capacity: 0,
        ..Default::default()
    });

    let bytes = encoder.encode(&value).expect("value must encode");
    let decoded = decoder.decode(bytes).expect("encoded value must decode");
    assert_eq!(decoded, value);
});
