//! Benchmarks for parameter automation rendering.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use toneboard::graph::param::AudioParam;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_param(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/param");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Settled param: constant fill fast path
        let mut held = AudioParam::new(0.7);
        group.bench_with_input(BenchmarkId::new("constant", size), &size, |b, _| {
            b.iter(|| held.render(black_box(&mut buffer), 0.0, SAMPLE_RATE))
        });

        // Mid-ramp: evaluated per sample
        let mut ramp = AudioParam::new(0.0);
        ramp.set_value_at_time(0.0, 0.0)
            .linear_ramp_to_value_at_time(1.0, 10.0);
        group.bench_with_input(BenchmarkId::new("ramp", size), &size, |b, _| {
            b.iter(|| ramp.render(black_box(&mut buffer), 1.0, SAMPLE_RATE))
        });
    }

    group.finish();
}
