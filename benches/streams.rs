//! Benchmarks for ripple-streams
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ripple_streams::{combine_latest, emitter, slot, Observable, Scheduler, StreamOps};

// =============================================================================
// SOURCE BENCHMARKS
// =============================================================================

fn bench_emitter_create(c: &mut Criterion) {
    c.bench_function("emitter_create", |b| {
        b.iter(|| black_box(emitter::<i32>()))
    });
}

fn bench_emit_no_observers(c: &mut Criterion) {
    let source = emitter();
    c.bench_function("emit_no_observers", |b| {
        b.iter(|| source.emit(black_box(42)))
    });
}

fn bench_emit_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit_fan_out");
    for observers in [1usize, 4, 16] {
        group.bench_with_input(
            BenchmarkId::from_parameter(observers),
            &observers,
            |b, &observers| {
                let source = emitter();
                let subs: Vec<_> = (0..observers)
                    .map(|_| source.observe(|v: &i32| { black_box(*v); }))
                    .collect();
                b.iter(|| source.emit(black_box(1)));
                drop(subs);
            },
        );
    }
    group.finish();
}

fn bench_slot_set(c: &mut Criterion) {
    let cell = slot(0i32);
    let _sub = cell.observe(|v: &i32| { black_box(*v); });
    c.bench_function("slot_set", |b| b.iter(|| cell.set(black_box(42))));
}

// =============================================================================
// OPERATOR BENCHMARKS
// =============================================================================

fn bench_operator_chain(c: &mut Criterion) {
    let source = emitter();
    let chained = source
        .map(|v: &i32| v + 1)
        .filter(|v: &i32| v % 2 == 0)
        .map(|v: &i32| v * 3)
        .dedup();
    let _sub = chained.observe(|v: &i32| { black_box(*v); });

    let mut input = 0;
    c.bench_function("operator_chain_emit", |b| {
        b.iter(|| {
            input += 1;
            source.emit(black_box(input));
        })
    });
}

fn bench_scan(c: &mut Criterion) {
    let source = emitter();
    let sums = source.scan(0i64, |acc, v: &i64| acc + v);
    let _sub = sums.observe(|v: &i64| { black_box(*v); });

    c.bench_function("scan_emit", |b| b.iter(|| source.emit(black_box(1))));
}

fn bench_combine_latest_update(c: &mut Criterion) {
    let left = slot(0i32);
    let right = slot(0i32);
    let pairs = combine_latest(&left, &right);
    let _sub = pairs.observe(|v: &(i32, i32)| { black_box(*v); });

    let mut n = 0;
    c.bench_function("combine_latest_update", |b| {
        b.iter(|| {
            n += 1;
            left.set(black_box(n));
        })
    });
}

// =============================================================================
// SCHEDULER BENCHMARKS
// =============================================================================

fn bench_deliver_on_drain(c: &mut Criterion) {
    let scheduler = Scheduler::new();
    let source = emitter();
    let marshaled = source.deliver_on(&scheduler);
    let _sub = marshaled.observe(|v: &i32| { black_box(*v); });

    c.bench_function("deliver_on_emit_and_drain", |b| {
        b.iter(|| {
            source.emit(black_box(7));
            scheduler.run_until_idle();
        })
    });
}

criterion_group!(
    benches,
    bench_emitter_create,
    bench_emit_no_observers,
    bench_emit_fan_out,
    bench_slot_set,
    bench_operator_chain,
    bench_scan,
    bench_combine_latest_update,
    bench_deliver_on_drain
);
criterion_main!(benches);
