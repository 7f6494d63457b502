//! Benchmarks for detection, validation and transformation throughput
//!
//! Copyright (c) 2025 cms-bridge contributors
//! Licensed under the Apache-2.0 license

use cms_bridge_core::{
    detect_format, validation_report, DataTransformer, Format, IdMapper, TransformOptions,
    ValidationOptions,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};

fn create_legacy_page(items: usize) -> Value {
    let data: Vec<Value> = (0..items)
        .map(|id| {
            json!({
                "id": id,
                "attributes": {
                    "title": format!("Article {}", id),
                    "body": "Lorem ipsum dolor sit amet",
                    "views": id * 3,
                    "author": {"data": {"id": id % 7, "attributes": {"name": "Ann"}}},
                    "tags": {"data": [
                        {"id": 1, "attributes": {"name": "cms"}},
                        {"id": 2, "attributes": {"name": "rust"}}
                    ]},
                    "cover": {"data": {"id": id, "attributes": {"url": "/uploads/c.png", "mime": "image/png"}}}
                }
            })
        })
        .collect();
    Value::Array(data)
}

fn create_chain(depth: usize) -> Value {
    let mut node = json!({"id": depth, "attributes": {"name": "leaf"}});
    for id in (0..depth).rev() {
        node = json!({"id": id, "attributes": {"parent": {"data": node}}});
    }
    node
}

fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("detection");
    for size in [10, 100, 1000] {
        let page = create_legacy_page(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &page, |b, page| {
            b.iter(|| detect_format(black_box(page)))
        });
    }
    group.finish();
}

fn bench_validation(c: &mut Criterion) {
    let page = create_legacy_page(100);
    let options = ValidationOptions::default();
    c.bench_function("validation_report_100", |b| {
        b.iter(|| validation_report(black_box(&page), Format::Legacy, &options))
    });
}

fn bench_transformation(c: &mut Criterion) {
    let options = TransformOptions::for_content_type("article");
    let mut group = c.benchmark_group("legacy_to_modern");

    for size in [10, 100, 1000] {
        let page = create_legacy_page(size);
        // warm mapper: measures conversion, not id synthesis
        let mut mapper = IdMapper::new();
        let modern = DataTransformer::new(&mut mapper)
            .transform(&page, Format::Legacy, Format::Modern, &options)
            .map(|value| value.into_owned())
            .unwrap_or(Value::Null);

        group.bench_with_input(BenchmarkId::from_parameter(size), &page, |b, page| {
            b.iter(|| {
                DataTransformer::new(&mut mapper)
                    .transform(black_box(page), Format::Legacy, Format::Modern, &options)
                    .map(|value| value.into_owned())
            })
        });

        group.bench_with_input(BenchmarkId::new("back", size), &modern, |b, modern| {
            b.iter(|| {
                DataTransformer::new(&mut mapper)
                    .transform(black_box(modern), Format::Modern, Format::Legacy, &options)
                    .map(|value| value.into_owned())
            })
        });
    }
    group.finish();
}

fn bench_depth_guard(c: &mut Criterion) {
    let chain = create_chain(50);
    let options = TransformOptions::default();
    let mut mapper = IdMapper::new();

    c.bench_function("chain_50_levels", |b| {
        b.iter(|| {
            DataTransformer::new(&mut mapper)
                .transform(black_box(&chain), Format::Legacy, Format::Modern, &options)
                .map(|value| value.into_owned())
        })
    });
}

criterion_group!(
    benches,
    bench_detection,
    bench_validation,
    bench_transformation,
    bench_depth_guard
);
criterion_main!(benches);
