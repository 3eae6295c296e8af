//! Benchmarks for partitioned FFT convolution.
//!
//! The voice reverb convolves with a 3 s impulse; cost scales with the number
//! of partitions, so a short impulse is included for comparison.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use toneboard::dsp::convolver::PartitionedConvolver;
use toneboard::dsp::reverb::generate_reverb_impulse;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_convolver(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/convolver");

    for (name, seconds) in [("ir_0.25s", 0.25f32), ("ir_3s", 3.0)] {
        let impulse = generate_reverb_impulse(SAMPLE_RATE, seconds);

        for &size in BLOCK_SIZES {
            let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
            let mut buffer = input.clone();
            let mut conv = PartitionedConvolver::new(impulse.channel(0));

            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    conv.process(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
