//! Benchmarks for reverb impulse generation.
//!
//! Runs once per session (or once per voice with fresh impulses enabled), so
//! this measures the stall a key press could see.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use toneboard::dsp::reverb::generate_reverb_impulse;

use crate::SAMPLE_RATE;

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");

    for seconds in [0.5f32, 3.0] {
        group.bench_with_input(
            BenchmarkId::new("generate_impulse", seconds),
            &seconds,
            |b, &seconds| b.iter(|| generate_reverb_impulse(black_box(SAMPLE_RATE), seconds)),
        );
    }

    group.finish();
}
