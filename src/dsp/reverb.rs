//! Synthetic reverb impulse responses.
//!
//! Instead of a recorded room, the reverb convolves with decaying white noise:
//!
//! ```text
//! h[i] = uniform(-1, 1) * (1 - i / len)
//!
//!   1 ┤▓▓▓▒▒▒░░░
//!     │▓▓▓▓▒▒▒░░░░·
//!   0 ┼──────────────·─→ i
//!     │▓▓▓▓▒▒▒░░░░·
//!  -1 ┤▓▓▓▒▒▒░░░
//! ```
//!
//! Dense random reflections with a linear decay read as a diffuse room tail.
//! The two channels are drawn independently, which gives the tail its stereo
//! width. The envelope shape is deterministic; the sample values are not.

use std::sync::Arc;

use rand::Rng;

/// A two-channel impulse response, shared between convolvers via `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseResponse {
    channels: [Vec<f32>; 2],
    sample_rate: f32,
}

impl ImpulseResponse {
    /// Build from explicit channel data. Shorter channels are zero-padded.
    pub fn from_channels(left: Vec<f32>, right: Vec<f32>, sample_rate: f32) -> Self {
        let len = left.len().max(right.len());
        let mut channels = [left, right];
        for channel in &mut channels {
            channel.resize(len, 0.0);
        }
        Self {
            channels,
            sample_rate,
        }
    }

    /// Length in samples per channel.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f32 {
        self.len() as f32 / self.sample_rate
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index.min(1)]
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

/// Generate a decaying-noise impulse `seconds` long at `sample_rate`.
pub fn generate_reverb_impulse(sample_rate: f32, seconds: f32) -> ImpulseResponse {
    generate_reverb_impulse_with(&mut rand::rng(), sample_rate, seconds)
}

/// Same as [`generate_reverb_impulse`] with a caller-supplied RNG.
pub fn generate_reverb_impulse_with<R: Rng + ?Sized>(
    rng: &mut R,
    sample_rate: f32,
    seconds: f32,
) -> ImpulseResponse {
    let len = (sample_rate * seconds).round().max(0.0) as usize;
    let mut left = Vec::with_capacity(len);
    let mut right = Vec::with_capacity(len);

    for i in 0..len {
        let decay = 1.0 - i as f32 / len as f32;
        left.push(rng.random_range(-1.0f32..=1.0) * decay);
        right.push(rng.random_range(-1.0f32..=1.0) * decay);
    }

    ImpulseResponse {
        channels: [left, right],
        sample_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const SAMPLE_RATE: f32 = 8_000.0;

    #[test]
    fn length_is_rate_times_seconds() {
        let ir = generate_reverb_impulse(SAMPLE_RATE, 3.0);
        assert_eq!(ir.len(), 24_000);
        assert_eq!(ir.channel(0).len(), ir.channel(1).len());
        assert!((ir.duration_secs() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn samples_stay_under_the_decay_envelope() {
        let ir = generate_reverb_impulse(SAMPLE_RATE, 3.0);
        let len = ir.len() as f32;

        for channel in 0..2 {
            for (i, &s) in ir.channel(channel).iter().enumerate() {
                let bound = 1.0 - i as f32 / len;
                assert!(s.abs() <= bound + 1e-6, "sample {i}: {s} > {bound}");
            }
        }
    }

    #[test]
    fn mean_magnitude_follows_linear_decay() {
        let mut rng = StdRng::seed_from_u64(7);
        let ir = generate_reverb_impulse_with(&mut rng, SAMPLE_RATE, 3.0);
        let window = 2_000;

        // E|U(-1,1)| = 0.5, scaled by the envelope at the window centre
        for start in (0..ir.len()).step_by(window) {
            let slice = &ir.channel(0)[start..start + window];
            let mean = slice.iter().map(|s| s.abs()).sum::<f32>() / window as f32;
            let p = (start + window / 2) as f32 / ir.len() as f32;
            let expected = 0.5 * (1.0 - p);
            assert!(
                (mean - expected).abs() < 0.05,
                "window at {start}: mean {mean}, expected {expected}"
            );
        }
    }

    #[test]
    fn channels_are_independent() {
        let ir = generate_reverb_impulse(SAMPLE_RATE, 1.0);
        let (l, r) = (ir.channel(0), ir.channel(1));

        assert_ne!(l, r);

        // Correlation of independent noise should be near zero
        let dot: f32 = l.iter().zip(r).map(|(a, b)| a * b).sum();
        let norm = (l.iter().map(|a| a * a).sum::<f32>() * r.iter().map(|b| b * b).sum::<f32>()).sqrt();
        assert!((dot / norm).abs() < 0.1);
    }

    #[test]
    fn zero_length_impulse_is_empty() {
        let ir = generate_reverb_impulse(SAMPLE_RATE, 0.0);
        assert!(ir.is_empty());
    }

    #[test]
    fn from_channels_pads_to_equal_length() {
        let ir = ImpulseResponse::from_channels(vec![1.0], vec![0.5, 0.25], SAMPLE_RATE);
        assert_eq!(ir.channel(0), &[1.0, 0.0]);
        assert_eq!(ir.channel(1), &[0.5, 0.25]);
    }
}
