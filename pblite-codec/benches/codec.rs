use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pblite_codec::{
    decode_with, encode, encode_with, DecodeOptions, Diagnostic, DynamicMessage, EncodeOptions,
    SchemaRegistry,
};
use serde_json::{json, Value};
use std::sync::Arc;

const SCHEMA: &str = r#"
[[message]]
name = "bench.Item"
field = [
    { number = 1, name = "id", kind = "int64" },
    { number = 2, name = "title", kind = "string" },
    { number = 3, name = "tags", kind = "string", label = "repeated" },
    { number = 4, name = "payload", kind = "bytes" },
    { number = 5, name = "score", kind = "double" },
    { number = 6, name = "parent", kind = "message", type = "bench.Item" },
    { number = 40, name = "flag", kind = "bool" },
]

[[message]]
name = "bench.Page"
field = [
    { number = 1, name = "items", kind = "message", type = "bench.Item", label = "repeated" },
    { number = 2, name = "cursor", kind = "string" },
]
"#;

fn registry() -> Arc<SchemaRegistry> {
    Arc::new(SchemaRegistry::from_toml_str(SCHEMA).unwrap())
}

fn create_page(count: usize) -> Value {
    let items: Vec<Value> = (0..count)
        .map(|i| {
            json!([
                i,
                format!("item {}", i),
                ["alpha", "beta", "gamma"],
                "AAECAwQFBgcICQ==",
                i as f64 * 0.5,
                [i + 1000000, "parent"],
                {"40": i % 2 == 0}
            ])
        })
        .collect();
    json!([items, "next"])
}

fn bench_decode(c: &mut Criterion) {
    let registry = registry();
    let mut group = c.benchmark_group("decode");

    for count in [10, 100, 1000] {
        let page = create_page(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &page, |b, page| {
            b.iter(|| {
                let mut target = DynamicMessage::new(Arc::clone(&registry), "bench.Page").unwrap();
                let mut sink = |_: Diagnostic| {};
                decode_with(&mut target, black_box(page), DecodeOptions::default(), &mut sink);
                black_box(target);
            });
        });
    }

    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let registry = registry();
    let mut group = c.benchmark_group("encode");

    for count in [10, 100, 1000] {
        let mut message = DynamicMessage::new(Arc::clone(&registry), "bench.Page").unwrap();
        decode_with(
            &mut message,
            &create_page(count),
            DecodeOptions::default(),
            &mut |_: Diagnostic| {},
        );

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("positional", count), &message, |b, message| {
            b.iter(|| black_box(encode(black_box(message))));
        });

        let opts = EncodeOptions {
            overflow_threshold: Some(8),
        };
        group.bench_with_input(BenchmarkId::new("overflow", count), &message, |b, message| {
            b.iter(|| black_box(encode_with(black_box(message), &opts)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode, bench_encode);
criterion_main!(benches);
