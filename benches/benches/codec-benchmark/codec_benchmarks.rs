use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use zpack::{
    Decoder, DecoderConfig, Encoder, EncoderConfig, Object, Timestamp, Value, ValueMap, ValueSet,
};

// ============================================================================
// Helper functions для создания тестовых данных
// ============================================================================

fn encoder() -> Encoder {
    Encoder::with_config(EncoderConfig {
        buffer_size: 1 << 20,
        ..Default::default()
    })
}

fn decoder() -> Decoder {
    Decoder::with_config(DecoderConfig {
        reserved_map_capacity: 0,
        ..Default::default()
    })
}

fn random_key(
    rng: &mut SmallRng,
    len: usize,
) -> String {
    (0..len)
        .map(|_| char::from_digit(rng.gen_range(0..36), 36).unwrap_or('x'))
        .collect()
}

/// Запись пользователя с вложенным массивом и широким целым.
fn create_person() -> Value {
    let mut person = Object::new();
    person.insert("age".into(), Value::from(24));
    person.insert("gender".into(), Value::Undefined);
    person.insert(
        "friends".into(),
        Value::Array(vec![Value::from("Jenny"), Value::from("James")]),
    );
    person.insert("name".into(), Value::from("Jimmie Lovell"));
    Value::Array(vec![
        Value::Object(person),
        Value::from("jimmie"),
        Value::BigInt(4_534_323_343_434_343_489),
    ])
}

fn create_small_map() -> Value {
    let mut map = ValueMap::new();
    map.insert(Value::from(1), Value::from(2));
    map.insert(Value::from(2), Value::from(3));
    Value::Map(map)
}

fn create_string_array(len: usize) -> Value {
    Value::Array(vec![Value::from("X"); len])
}

fn create_wide_object(
    keys: usize,
    seed: u64,
) -> Value {
    let mut rng = SmallRng::seed_from_u64(seed);
    let obj: Object = (0..keys)
        .map(|_| (random_key(&mut rng, 40), Value::Null))
        .collect();
    Value::Object(obj)
}

fn create_number_set(len: usize) -> Value {
    let set: ValueSet = (0..len)
        .map(|i| Value::Number(i as f64 * 1.5))
        .collect();
    Value::Set(set)
}

// ============================================================================
// Бенчмарки
// ============================================================================

fn bench_shapes(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_decode/shapes");
    let shapes = [
        ("person", create_person()),
        ("map", create_small_map()),
        ("date", Value::custom(Timestamp::from_millis(1_700_000_000_000.0))),
    ];

    for (name, value) in &shapes {
        let mut enc = encoder();
        group.bench_with_input(BenchmarkId::new("encode", name), value, |b, v| {
            b.iter(|| {
                black_box(enc.encode(black_box(v)).unwrap().len());
            });
        });

        let encoded = encoder().encode_to_bytes(value).unwrap();
        let dec = decoder();
        group.bench_with_input(BenchmarkId::new("decode", name), &encoded, |b, data| {
            b.iter(|| black_box(dec.decode(black_box(data)).unwrap()));
        });
    }
    group.finish();
}

fn bench_collections(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_decode/collections");
    group.sample_size(50);

    for size in [16usize, 4096, 65_536] {
        group.throughput(Throughput::Elements(size as u64));

        for (name, value) in [
            ("array", create_string_array(size)),
            ("set", create_number_set(size)),
        ] {
            let mut enc = encoder();
            group.bench_with_input(
                BenchmarkId::new(format!("{name}/encode"), size),
                &value,
                |b, v| b.iter(|| black_box(enc.encode(black_box(v)).unwrap().len())),
            );

            let encoded = encoder().encode_to_bytes(&value).unwrap();
            let dec = decoder();
            group.bench_with_input(
                BenchmarkId::new(format!("{name}/decode"), size),
                &encoded,
                |b, data| b.iter(|| black_box(dec.decode(black_box(data)).unwrap())),
            );
        }
    }
    group.finish();
}

fn bench_wide_object(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_decode/object_keys");
    group.sample_size(20);

    let value = create_wide_object(0x1200, 42);
    group.throughput(Throughput::Elements(0x1200));

    let mut enc = encoder();
    group.bench_function("encode", |b| {
        b.iter(|| black_box(enc.encode(black_box(&value)).unwrap().len()));
    });

    let encoded = encoder().encode_to_bytes(&value).unwrap();
    let dec = decoder();
    group.bench_function("decode", |b| {
        b.iter(|| black_box(dec.decode(black_box(&encoded)).unwrap()));
    });
    group.finish();
}

fn bench_strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_decode/strings");

    for size in [16usize, 256, 65_536] {
        group.throughput(Throughput::Bytes(size as u64));
        let top = Value::from("a".repeat(size));
        let child = Value::Array(vec![top.clone()]);

        let mut enc = encoder();
        group.bench_with_input(BenchmarkId::new("top_level/encode", size), &top, |b, v| {
            b.iter(|| black_box(enc.encode(black_box(v)).unwrap().len()));
        });
        group.bench_with_input(BenchmarkId::new("child/encode", size), &child, |b, v| {
            b.iter(|| black_box(enc.encode(black_box(v)).unwrap().len()));
        });

        let encoded = encoder().encode_to_bytes(&child).unwrap();
        let dec = decoder();
        group.bench_with_input(
            BenchmarkId::new("child/decode", size),
            &encoded,
            |b, data| b.iter(|| black_box(dec.decode(black_box(data)).unwrap())),
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_shapes,
    bench_collections,
    bench_wide_object,
    bench_strings
);
criterion_main!(benches);
