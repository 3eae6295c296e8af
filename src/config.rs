//! Voice configuration.
//!
//! The defaults are the instrument's fixed sound: a triangle oscillator through
//! a 2 kHz low-pass, an attack-then-swell envelope and a three second noise
//! reverb. Setters follow the builder style so tests can shorten times.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::oscillator::OscillatorWaveform;

/// Envelope times in seconds and levels in linear gain.
///
/// ```text
///   gain
///   0.7 ┤          ╭──────────── sustain (held until release)
///   0.5 ┤    ╭─────╯             peak
///       │   ╱
///   0.0 ┼──╯ attack   decay      release ramps from the current value to 0
/// ```
///
/// The peak sits below the sustain level, so the decay stage swells upward.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeShape {
    pub attack: f64,
    pub decay: f64,
    pub peak: f32,
    pub sustain: f32,
    pub release: f64,
}

impl Default for EnvelopeShape {
    fn default() -> Self {
        Self {
            attack: 0.1,
            decay: 0.5,
            peak: 0.5,
            sustain: 0.7,
            release: 1.0,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbConfig {
    /// Impulse response length in seconds
    pub seconds: f32,
    /// Generate a new impulse for every voice instead of sharing one per session
    pub fresh_per_voice: bool,
}

impl Default for ReverbConfig {
    fn default() -> Self {
        Self {
            seconds: 3.0,
            fresh_per_voice: false,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneConfig {
    pub waveform: OscillatorWaveform,
    pub envelope: EnvelopeShape,
    /// Extra time after the release before a voice's nodes are torn down
    pub cleanup_margin: f64,
    pub filter_cutoff_hz: f32,
    pub reverb: ReverbConfig,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            waveform: OscillatorWaveform::Triangle,
            envelope: EnvelopeShape::default(),
            cleanup_margin: 0.1,
            filter_cutoff_hz: 2000.0,
            reverb: ReverbConfig::default(),
        }
    }
}

impl ToneConfig {
    pub fn with_waveform(mut self, waveform: OscillatorWaveform) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn with_envelope(mut self, envelope: EnvelopeShape) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn with_release(mut self, release: f64) -> Self {
        self.envelope.release = release.max(0.0);
        self
    }

    pub fn with_cleanup_margin(mut self, margin: f64) -> Self {
        self.cleanup_margin = margin.max(0.0);
        self
    }

    pub fn with_filter_cutoff(mut self, cutoff_hz: f32) -> Self {
        self.filter_cutoff_hz = cutoff_hz;
        self
    }

    pub fn with_reverb_seconds(mut self, seconds: f32) -> Self {
        self.reverb.seconds = seconds.max(0.0);
        self
    }

    pub fn with_fresh_impulse_per_voice(mut self, fresh: bool) -> Self {
        self.reverb.fresh_per_voice = fresh;
        self
    }

    /// Seconds from a stop request until the voice's nodes are released.
    pub fn teardown_delay(&self) -> f64 {
        self.envelope.release + self.cleanup_margin
    }
}
