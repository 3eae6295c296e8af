//! Benchmarks for rendering held voices.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use toneboard::{notes, AudioContext, ToneConfig, ToneManager};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for voice_count in [1usize, 4, 12] {
        let context = AudioContext::new(SAMPLE_RATE);
        let mut manager = ToneManager::with_config(context.clone(), ToneConfig::default());
        for note in notes::all().iter().take(voice_count) {
            manager
                .start_note(note.name)
                .expect("table notes always start");
        }

        for &size in BLOCK_SIZES {
            // Stereo interleaved device buffer
            let mut buffer = vec![0.0f32; size * 2];
            let id = format!("{voice_count}_voices");

            group.bench_with_input(BenchmarkId::new(id, size), &size, |b, _| {
                b.iter(|| context.render_interleaved(black_box(&mut buffer), 2))
            });
        }
    }

    group.finish();
}
