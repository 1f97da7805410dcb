//! Benchmarks for restriction construction, negation and evaluation.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use indexmap::IndexMap;
use sift_query::sql::SqlBuilder;
use sift_query::{Attribute, MemoryEngine, PageRequest, Query, Restriction, Value};
use std::hint::black_box;

fn wide_restriction(width: usize) -> Restriction {
    let children = (0..width).map(|i| {
        let attribute = Attribute::new(format!("field_{}", i));
        attribute
            .at_least(i as i64)
            .unwrap()
            .or(attribute.is_null())
    });
    Restriction::all(children).unwrap()
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("restriction_construction");

    group.bench_function("basic_equal_to", |b| {
        let name = Attribute::new("name");
        b.iter(|| black_box(name.equal_to("alice").unwrap()))
    });

    group.bench_function("contains_escaped", |b| {
        let name = Attribute::new("name");
        b.iter(|| black_box(name.contains("50%_off")))
    });

    for width in [4, 16, 64] {
        group.bench_with_input(BenchmarkId::new("wide_all", width), &width, |b, &width| {
            b.iter(|| black_box(wide_restriction(width)))
        });
    }

    group.finish();
}

fn bench_negation(c: &mut Criterion) {
    let mut group = c.benchmark_group("restriction_negation");

    for width in [4, 16, 64] {
        let restriction = wide_restriction(width);
        group.throughput(Throughput::Elements(restriction.leaf_count() as u64));

        group.bench_with_input(BenchmarkId::new("negate", width), &restriction, |b, r| {
            b.iter(|| black_box(r.negate()))
        });

        group.bench_with_input(
            BenchmarkId::new("push_down_negation", width),
            &restriction,
            |b, r| {
                let negated = r.negate();
                b.iter(|| black_box(negated.push_down_negation()))
            },
        );
    }

    group.finish();
}

fn bench_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("restriction_rendering");

    let restriction = wide_restriction(16);
    let query = Query::new()
        .where_(restriction)
        .sorted_by([Attribute::new("field_0").asc(), Attribute::new("id").desc()]);
    let request = PageRequest::of_size(50)
        .unwrap()
        .after_keyset(sift_query::keyset![10, 99])
        .unwrap();

    group.bench_function("sql_select_page", |b| {
        b.iter(|| black_box(SqlBuilder::postgres().select_page("t", &query, &request).unwrap()))
    });

    group.finish();
}

fn bench_memory_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_engine");

    let rows: Vec<IndexMap<String, Value>> = (0..10_000)
        .map(|n| {
            IndexMap::from([
                ("id".to_string(), Value::Int(n)),
                ("bucket".to_string(), Value::Int(n % 97)),
            ])
        })
        .collect();
    let engine = MemoryEngine::new(rows);
    let bucket = Attribute::new("bucket");
    let query = Query::new()
        .where_(bucket.between(10, 60).unwrap())
        .sorted_by([bucket.desc(), Attribute::new("id").asc()]);

    group.throughput(Throughput::Elements(10_000));

    group.bench_function("offset_page", |b| {
        let request = PageRequest::of(5, 100, true).unwrap();
        b.iter(|| black_box(engine.execute(&query, &request, false).unwrap()))
    });

    group.bench_function("keyset_page", |b| {
        let request = PageRequest::of_size(100)
            .unwrap()
            .after_keyset(sift_query::keyset![50, 5000])
            .unwrap();
        b.iter(|| black_box(engine.execute(&query, &request, false).unwrap()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_construction,
    bench_negation,
    bench_rendering,
    bench_memory_engine,
);

criterion_main!(benches);
