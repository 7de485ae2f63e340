//! Benchmarks for the tether step loop and the catenary fit.
//!
//! Run with: cargo bench -p tether-sim

#![allow(missing_docs, clippy::unwrap_used)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use nalgebra::Point3;

use tether_sim::{CatenarySolver, Tether, TetherConfig};

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("tether_step");
    for &n in &[10_usize, 100, 1000] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let mut tether = Tether::new(10.0, n, TetherConfig::default()).unwrap();
            b.iter(|| tether.step(black_box(0.01)));
        });
    }
    group.finish();
}

fn bench_catenary_fit(c: &mut Criterion) {
    let solver = CatenarySolver::default();
    c.bench_function("catenary_fit", |b| {
        b.iter(|| {
            solver.solve(
                black_box(Point3::new(-5.0, 3.0, 1.0)),
                black_box(Point3::new(5.0, 3.0, 1.0)),
                black_box(12.0),
            )
        });
    });
}

criterion_group!(benches, bench_step, bench_catenary_fit);
criterion_main!(benches);
