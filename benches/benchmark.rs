use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::json;

use typed_optional::OptionalInt;
use typed_optional::datatype::Value;
use typed_optional::path::{PathSpec, resolve};

fn orders(count: usize) -> Value {
    let orders: Vec<_> = (0..count)
        .map(|i| json!({"id": i, "lines": [{"sku": format!("A{i}")}, {"sku": format!("B{i}")}]}))
        .collect();
    Value::from(json!({ "orders": orders }))
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let present = OptionalInt::of(42).unwrap();
    c.bench_function("chain present", |b| {
        b.iter(|| {
            black_box(&present)
                .map(|v| v.as_int().map(|i| i + 1))
                .unwrap()
                .filter(|v| v.as_int().is_some_and(|i| i % 2 == 1))
                .or_else(0)
                .unwrap()
        })
    });
    let empty = OptionalInt::of_empty();
    c.bench_function("chain empty", |b| {
        b.iter(|| {
            black_box(&empty)
                .map(|v| v.as_int().map(|i| i + 1))
                .unwrap()
                .filter(|_| true)
                .is_empty()
        })
    });
    c.bench_function("of_empty", |b| b.iter(OptionalInt::of_empty));

    let path = PathSpec::parse("orders.*.lines.*.sku");
    for count in [10, 1000] {
        let document = orders(count);
        c.bench_function(&format!("wildcard collapse {count}"), |b| {
            b.iter(|| resolve(black_box(&document), &path))
        });
    }
    let document = orders(1000);
    let direct = PathSpec::parse("orders.999.lines.1.sku");
    c.bench_function("direct path", |b| b.iter(|| resolve(black_box(&document), &direct)));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
