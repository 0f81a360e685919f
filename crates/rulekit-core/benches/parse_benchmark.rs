//! Benchmarks for the combinator engine
//!
//! Run with: cargo bench -p rulekit-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rulekit_core::{
    any, between, each, ignore, list_with, many, optional, recursive, regex, token, Limits, Rule,
};

/// Sample input for the nested-value grammar
const VALUE_SAMPLE: &str = r#"{
  name: "rulekit",
  version: 1,
  tags: [parser, combinator, "ll(k)"],
  limits: { depth: 512, steps: 0 },
  matrix: [[1, 2, 3], [4, 5, 6], [7, 8, 9]],
  nested: { a: { b: { c: { d: [true, false, null] } } } },
}"#;

fn value_grammar() -> Rule {
    let ws = ignore(regex(r"\s*").unwrap());
    let padded = move |rule: Rule| between(ws.clone(), rule, ws.clone());

    recursive(|value| {
        let string = regex(r#""([^"\\]|\\.)*""#).unwrap();
        let number = regex("-?[0-9]+(\\.[0-9]+)?").unwrap();
        let word = regex("[A-Za-z_][A-Za-z0-9_]*").unwrap();

        let entry = each([padded(word.clone()), token(":"), padded(value.clone())]);
        let object = between("{", optional(list_with(entry, ",", true)), padded(token("}")));
        let array = between(
            "[",
            optional(list_with(padded(value), ",", true)),
            padded(token("]")),
        );

        any([string, number, word, object, array])
    })
}

/// Pathological choice: every alternative shares a long prefix
fn backtracking_grammar() -> Rule {
    let prefix = || many(token("a"));
    any([
        each([prefix(), token("b")]),
        each([prefix(), token("c")]),
        each([prefix(), token("d")]),
        each([prefix(), token("e")]),
    ])
}

fn bench_value_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    let grammar = value_grammar();

    group.throughput(Throughput::Bytes(VALUE_SAMPLE.len() as u64));
    group.bench_function("nested_values", |b| {
        b.iter(|| {
            let value = grammar.parse_all(black_box(VALUE_SAMPLE)).unwrap();
            black_box(value)
        })
    });

    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");
    let grammar = value_grammar();

    for size in [1, 5, 10, 20].iter() {
        let content = format!("[{}]", vec![VALUE_SAMPLE; *size].join(","));

        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(BenchmarkId::new("nested_values", size), &content, |b, content| {
            b.iter(|| {
                let value = grammar
                    .parse_all_with(black_box(content), &Limits::unbounded())
                    .unwrap();
                black_box(value)
            })
        });
    }

    group.finish();
}

fn bench_backtracking(c: &mut Criterion) {
    let mut group = c.benchmark_group("backtracking");
    let grammar = backtracking_grammar();

    for len in [16, 256, 4096].iter() {
        let content = format!("{}e", "a".repeat(*len));

        group.bench_with_input(BenchmarkId::new("shared_prefix", len), &content, |b, content| {
            b.iter(|| {
                let value = grammar.parse_all(black_box(content)).unwrap();
                black_box(value)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_value_parse, bench_scaling, bench_backtracking);
criterion_main!(benches);
