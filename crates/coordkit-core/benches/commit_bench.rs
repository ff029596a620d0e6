//! Benchmarks for coordination commit and propagation.
//!
//! Run with: `cargo bench --package coordkit-core --bench commit_bench`
//!
//! Results are written to `target/criterion/commit_bench/`.

use coordkit_bind::{AttrWidget, Widget, WidgetRef};
use coordkit_core::{Coordination, CoordinationContext, ViewSpec};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::json;
use std::hint::black_box;

// ============================================================================
// Fixtures
// ============================================================================

fn widgets(n: usize) -> Vec<WidgetRef> {
    (0..n).map(|_| AttrWidget::new().into_ref()).collect()
}

/// `n` widgets spread round-robin over `scopes` scopes of one type.
fn coordination(widgets: &[WidgetRef], scopes: usize) -> Coordination {
    let mut c = Coordination::new();
    for s in 0..scopes {
        c.set_scope_value("value", format!("s{s}"), s as i64);
    }
    for (i, w) in widgets.iter().enumerate() {
        c.add_view("value", &format!("s{}", i % scopes), ViewSpec::widget(w))
            .unwrap_or_default();
    }
    c
}

// ============================================================================
// Commit
// ============================================================================

fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit");
    for n in [8usize, 64, 512] {
        let ws = widgets(n);
        let coord = coordination(&ws, 4);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("fresh", n), &coord, |b, coord| {
            b.iter(|| {
                let mut ctx = CoordinationContext::new();
                let report = coord.commit(&mut ctx);
                // Links outlive the context unless torn down explicitly.
                ctx.shutdown();
                black_box(report)
            });
        });

        // Every iteration supersedes the previous session.
        let mut ctx = CoordinationContext::new();
        group.bench_with_input(BenchmarkId::new("supersede", n), &coord, |b, coord| {
            b.iter(|| black_box(coord.commit(&mut ctx)));
        });
    }
    group.finish();
}

// ============================================================================
// Propagation
// ============================================================================

fn bench_propagation(c: &mut Criterion) {
    let mut group = c.benchmark_group("propagation");
    for n in [8usize, 64, 512] {
        let ws = widgets(n);
        let mut ctx = CoordinationContext::new();
        coordination(&ws, 1).commit(&mut ctx);
        group.throughput(Throughput::Elements(n as u64));

        let leaf = &ws[n - 1];
        let mut tick = 0i64;
        group.bench_function(BenchmarkId::new("leaf_write", n), |b| {
            b.iter(|| {
                tick += 1;
                leaf.set_attribute("value", json!(tick));
            });
        });
    }
    group.finish();
}

// ============================================================================
// Export
// ============================================================================

fn bench_export(c: &mut Criterion) {
    let ws = widgets(256);
    let coord = coordination(&ws, 16);
    let text = coord.export_config().unwrap_or_default();

    c.bench_function("export_config/256", |b| {
        b.iter(|| black_box(coord.export_config()));
    });
    c.bench_function("from_json/256", |b| {
        b.iter(|| black_box(Coordination::from_json(black_box(&text))));
    });
}

criterion_group!(benches, bench_commit, bench_propagation, bench_export);
criterion_main!(benches);
