#![allow(unused)]
extern crate dotlint;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dotlint::prelude::*;
use std::hint::black_box;

fn write_line_if() -> CallTarget {
    CallTarget::new_static(
        "System.Diagnostics.Debug",
        "WriteLineIf",
        &[names::BOOLEAN, names::STRING],
        names::VOID,
    )
}

/// A body whose message is copied through `hops` locals, each round trip
/// separated by `filler` stack-neutral instruction pairs.
fn chained_body(hops: u16, filler: usize) -> MethodBody {
    let mut builder = BodyBuilder::new();
    for _ in 0..=hops {
        builder = builder.local(names::STRING);
    }

    builder = builder.ldstr("****** Missing Dispose() call ******").stloc(0);
    for slot in 0..hops {
        for _ in 0..filler {
            builder = builder.ldc_i4(7).pop();
        }
        builder = builder.ldloc(slot).stloc(slot + 1);
    }

    builder
        .ldarg(1)
        .ldloc(hops)
        .call(write_line_if())
        .ret()
        .build()
        .unwrap()
}

/// Benchmark the backward walk over bodies of growing length
fn bench_resolve_argument(c: &mut Criterion) {
    let assembly = CilAssembly::new("Bench");
    let config = AnalysisConfig::permissive();

    let mut group = c.benchmark_group("resolve_argument");
    for hops in [1u16, 8, 32] {
        let body = chained_body(hops, 16);
        let call_site = body.len() - 2;
        group.throughput(Throughput::Elements(body.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(hops), &body, |b, body| {
            b.iter(|| {
                let cache = ResourceCache::new();
                let ctx = AnalysisContext::new(&assembly, &config, &cache);
                black_box(resolve_argument(black_box(body), call_site, 1, &ctx))
            });
        });
    }
    group.finish();
}

/// Benchmark parsing a generated string table
fn bench_parse_string_table(c: &mut Criterion) {
    let mut writer = ResourceWriter::new();
    for i in 0..512 {
        writer = writer.add_string(&format!("IDS_{i:04}"), &format!("Message number {i}"));
    }
    let data = writer.build().unwrap();

    println!(
        "Benchmarking string table: {} bytes ({:.2} KB)",
        data.len(),
        data.len() as f64 / 1024.0
    );

    let mut group = c.benchmark_group("string_table");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("from_blob", |b| {
        b.iter(|| {
            let table = StringTable::from_blob(black_box(&data)).unwrap();
            black_box(table)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_resolve_argument, bench_parse_string_table);
criterion_main!(benches);
