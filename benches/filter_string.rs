use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mzscan::filter::{make_generic_filter, parse_filter_text, ScanTypeSummary};

const FILTERS: &[&str] = &[
    "FTMS + p NSI Full ms [350.0000-1800.0000]",
    "FTMS + c NSI d Full ms2 445.1200@hcd30.00 [100.0000-1000.0000]",
    "ITMS + c NSI r d sa Full ms2 538.8400@etd53.58@cid20.00 [120.0000-1627.0000]",
    "ITMS + c NSI d Full ms3 750.4000@cid35.00 520.3000@cid35.00 [140.0000-1055.0000]",
    "- c ESI SRM ms2 [100.0000-101.0000, 200.0000-201.0000, 300.0000-301.0000]",
    "FTMS + p NSI cv=-45.00 Full ms [350.0000-1800.0000]",
    "+ c NSI Q1MS",
];

fn parse_all(filters: &[&str]) -> usize {
    filters
        .iter()
        .map(|f| parse_filter_text(f).ms_level as usize)
        .sum()
}

fn generic_all(filters: &[&str]) -> usize {
    filters
        .iter()
        .map(|f| make_generic_filter(f, false).len())
        .sum()
}

fn summarize(filters: &[&str]) -> usize {
    let mut summary = ScanTypeSummary::new();
    for _ in 0..100 {
        for f in filters {
            summary.accumulate(&parse_filter_text(f));
        }
    }
    summary.len()
}

fn filter_benchmark(c: &mut Criterion) {
    c.bench_function("parse_filter_text", |b| {
        b.iter(|| parse_all(black_box(FILTERS)))
    });
    c.bench_function("make_generic_filter", |b| {
        b.iter(|| generic_all(black_box(FILTERS)))
    });
    c.bench_function("summarize_scan_types", |b| {
        b.iter(|| summarize(black_box(FILTERS)))
    });
}

criterion_group!(benches, filter_benchmark);
criterion_main!(benches);
