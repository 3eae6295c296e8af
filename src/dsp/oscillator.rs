use std::f32::consts::TAU;

use rand::{rngs::SmallRng, Rng, SeedableRng};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Phase-Accumulator Oscillator
============================

The oscillator keeps a normalized phase in [0, 1) and advances it by
frequency / sample_rate every sample. The waveform is a pure function of the
phase, so changing frequency mid-block never produces a discontinuity in phase.

      phase   0    0.25   0.5   0.75    1
  triangle    0 ──→ 1 ──→ 0 ──→ -1 ──→ 0
  sine        0 ──→ 1 ──→ 0 ──→ -1 ──→ 0   (curved)
  saw        -1 ─────────────────────→ 1
  square      1 ─────────── -1 ────────

Triangle is the instrument's voice: odd harmonics only, falling off as 1/n²,
so it is far softer than a square wave of the same pitch.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorWaveform {
    Sine,
    Saw,
    Square,
    Triangle,
    Noise,
}

impl OscillatorWaveform {
    /// Waveform value at a normalized phase in [0, 1).
    ///
    /// Noise has no phase relationship and returns 0 here; use
    /// [`OscillatorBlock`] to render it.
    #[inline]
    pub fn at_phase(self, phase: f32) -> f32 {
        match self {
            OscillatorWaveform::Sine => (TAU * phase).sin(),
            OscillatorWaveform::Saw => 2.0 * phase - 1.0,
            OscillatorWaveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            OscillatorWaveform::Triangle => {
                if phase < 0.25 {
                    4.0 * phase
                } else if phase < 0.75 {
                    2.0 - 4.0 * phase
                } else {
                    4.0 * phase - 4.0
                }
            }
            OscillatorWaveform::Noise => 0.0,
        }
    }
}

pub struct OscillatorBlock {
    waveform: OscillatorWaveform,
    phase: f32,
    rng: SmallRng,
}

impl OscillatorBlock {
    pub fn new(waveform: OscillatorWaveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
            rng: SmallRng::from_os_rng(),
        }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorWaveform::Sine)
    }

    pub fn triangle() -> Self {
        Self::new(OscillatorWaveform::Triangle)
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    /// Produce one sample at `frequency` Hz and advance the phase.
    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let value = match self.waveform {
            OscillatorWaveform::Noise => self.rng.random_range(-1.0..=1.0),
            waveform => waveform.at_phase(self.phase),
        };

        self.phase += frequency / sample_rate;
        self.phase -= self.phase.floor();

        value
    }

    /// Fill `out` using a per-sample frequency buffer of the same length.
    pub fn render(&mut self, out: &mut [f32], frequency: &[f32], sample_rate: f32) {
        debug_assert_eq!(out.len(), frequency.len());

        for (sample, &freq) in out.iter_mut().zip(frequency) {
            *sample = self.next_sample(freq, sample_rate);
        }
    }
}
