//! Benchmarks for peak evaluation and beats.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pulse_graph::topologies::{chain, fan_in_lattice, feedback_pair, ring};
use pulse_graph::{CellKind, Colour, Context, Evaluator, Pulsar, Timing};
use std::hint::black_box;

const CTX: Context = Context::release();

/// Fan-in lattice: exponentially many paths, linear work with the memo
fn bench_fan_in(c: &mut Criterion) {
    let mut group = c.benchmark_group("fan_in");

    for depth in [4, 8, 16] {
        let (mut store, source, sink) = fan_in_lattice(&CTX, 3, depth).unwrap();
        store.fire_cell(&CTX, source, Colour::Red).unwrap();

        group.bench_with_input(BenchmarkId::new("sink_peak", depth), &depth, |b, _| {
            b.iter(|| {
                let mut evaluator = Evaluator::new(&CTX, &store);
                black_box(evaluator.peak(sink, Colour::Red, Timing::Now).unwrap())
            });
        });
    }

    group.finish();
}

/// Timed loops: cost of projection and fixed-point detection
fn bench_timed_loops(c: &mut Criterion) {
    let mut group = c.benchmark_group("timed_loops");

    let (mut store, a, b) = feedback_pair(&CTX).unwrap();
    store.fire_cell(&CTX, a, Colour::Green).unwrap();
    group.bench_function("feedback_pair", |bench| {
        bench.iter(|| {
            let mut evaluator = Evaluator::new(&CTX, &store);
            black_box(evaluator.peak(b, Colour::Green, Timing::Future).unwrap())
        });
    });

    for len in [8, 64, 256] {
        let (mut store, cells) = ring(&CTX, len, Timing::Future).unwrap();
        store.fire_cell(&CTX, cells[0], Colour::Green).unwrap();
        group.bench_with_input(BenchmarkId::new("ring", len), &len, |bench, _| {
            bench.iter(|| {
                let mut evaluator = Evaluator::new(&CTX, &store);
                for &cell in &cells {
                    black_box(evaluator.peak(cell, Colour::Green, Timing::Now).unwrap());
                }
            });
        });
    }

    group.finish();
}

/// Whole beats over a long creation chain
fn bench_beats(c: &mut Criterion) {
    let mut group = c.benchmark_group("beats");

    for n in [10, 100, 500] {
        let mut kinds = vec![CellKind::Creation];
        kinds.extend(std::iter::repeat_n(CellKind::Slot, n));
        let (store, cells) = chain(&CTX, &kinds).unwrap();

        group.bench_with_input(BenchmarkId::new("fill_chain", n), &n, |b, &n| {
            b.iter(|| {
                let mut pulsar = Pulsar::with_store(CTX, store.clone());
                pulsar.set_history_limit(1);
                // Each beat fills one more slot; the fresh tag blocks every
                // other beat, so two beats per slot.
                for _ in 0..(2 * n) {
                    pulsar.fire(cells[0], Colour::Red).unwrap();
                    black_box(pulsar.beat().unwrap());
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fan_in, bench_timed_loops, bench_beats);
criterion_main!(benches);
