//! Benchmarks for state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use toneboard::dsp::filter::SVFilter;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Fixed cutoff: coefficients stay cached
        let cutoff = vec![2000.0f32; size];
        let mut filter = SVFilter::lowpass();
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass_fixed", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), black_box(&cutoff), SAMPLE_RATE);
            })
        });

        // Sweeping cutoff: tan() recomputed every sample
        let sweep: Vec<f32> = (0..size)
            .map(|i| 200.0 + 4000.0 * i as f32 / size as f32)
            .collect();
        let mut filter = SVFilter::lowpass();
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass_sweep", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), black_box(&sweep), SAMPLE_RATE);
            })
        });
    }

    group.finish();
}
