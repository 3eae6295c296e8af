use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
| type      | passes       | rejects      |
| --------- | ------------ | ------------ |
| low-pass  | below cutoff | above cutoff |
| high-pass | above cutoff | below cutoff |

Topology-preserving (TPT) state-variable filter, 12 dB/octave. Cutoff is
pre-warped so the analog prototype's corner lands on the requested frequency
after the bilinear transform. The voice chain uses the low-pass response to
take the edge off the triangle's upper harmonics.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
}

pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    resonance: f32,
    filter_type: FilterType,

    // Coefficient cache, recomputed only when cutoff or sample rate moves
    cached_cutoff: f32,
    cached_rate: f32,
    g: f32,
}

impl SVFilter {
    pub fn new(filter_type: FilterType) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            resonance: 0.0,
            filter_type,
            cached_cutoff: f32::NAN,
            cached_rate: f32::NAN,
            g: 0.0,
        }
    }

    pub fn lowpass() -> Self {
        Self::new(FilterType::LowPass)
    }

    pub fn highpass() -> Self {
        Self::new(FilterType::HighPass)
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn set_filter_type(&mut self, filter_type: FilterType) {
        self.filter_type = filter_type;
    }

    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    /// 0.0 = no emphasis; values approaching 1.0 ring at the cutoff.
    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = resonance.clamp(0.0, 0.99);
    }

    #[inline]
    fn update_g(&mut self, cutoff_hz: f32, sample_rate: f32) {
        if cutoff_hz == self.cached_cutoff && sample_rate == self.cached_rate {
            return;
        }
        // Keep the corner below Nyquist so tan() stays finite
        let cutoff = cutoff_hz.clamp(10.0, sample_rate * 0.49);
        self.g = (PI * cutoff / sample_rate).tan();
        self.cached_cutoff = cutoff_hz;
        self.cached_rate = sample_rate;
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32, cutoff_hz: f32, sample_rate: f32) -> f32 {
        self.update_g(cutoff_hz, sample_rate);

        let g = self.g;
        let k = 2.0 - 2.0 * self.resonance;
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        match self.filter_type {
            FilterType::LowPass => v2,
            FilterType::HighPass => sample - k * v1 - v2,
        }
    }

    /// Filter `buffer` in place with a per-sample cutoff buffer.
    pub fn render(&mut self, buffer: &mut [f32], cutoff_hz: &[f32], sample_rate: f32) {
        debug_assert_eq!(buffer.len(), cutoff_hz.len());

        for (sample, &cutoff) in buffer.iter_mut().zip(cutoff_hz) {
            *sample = self.next_sample(*sample, cutoff, sample_rate);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::OscillatorBlock;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len().min(64);
        buffer[skip..].iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    fn filtered_sine(filter: &mut SVFilter, freq: f32, cutoff: f32) -> Vec<f32> {
        let mut osc = OscillatorBlock::sine();
        let mut buffer = vec![0.0f32; 1024];
        osc.render(&mut buffer, &vec![freq; 1024], SAMPLE_RATE);
        filter.render(&mut buffer, &vec![cutoff; 1024], SAMPLE_RATE);
        buffer
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut filter = SVFilter::lowpass();
        let mut buffer = vec![1.0; 256];
        filter.render(&mut buffer, &[500.0; 256], SAMPLE_RATE);

        assert!(buffer[255] > 0.99, "got {}", buffer[255]);
    }

    #[test]
    fn highpass_rejects_dc() {
        let mut filter = SVFilter::highpass();
        let mut buffer = vec![1.0; 256];
        filter.render(&mut buffer, &[500.0; 256], SAMPLE_RATE);

        assert!(buffer[255].abs() < 0.001, "got {}", buffer[255]);
    }

    #[test]
    fn lowpass_attenuates_above_cutoff() {
        let mut filter = SVFilter::lowpass();
        let passed = peak_after_transient(&filtered_sine(&mut filter, 200.0, 2000.0));

        filter.reset();
        let cut = peak_after_transient(&filtered_sine(&mut filter, 16_000.0, 2000.0));

        assert!(passed > 0.9, "in-band peak {passed}");
        assert!(cut < 0.1, "out-of-band peak {cut}");
    }

    #[test]
    fn cutoff_changes_take_effect() {
        let mut filter = SVFilter::lowpass();
        let dark = peak_after_transient(&filtered_sine(&mut filter, 1000.0, 200.0));

        filter.reset();
        let bright = peak_after_transient(&filtered_sine(&mut filter, 1000.0, 5000.0));

        assert!(
            bright > dark * 2.0,
            "high cutoff should pass more: bright={bright}, dark={dark}"
        );
    }

    #[test]
    fn resonance_is_clamped_stable() {
        let mut filter = SVFilter::lowpass();
        filter.set_resonance(5.0);
        assert!(filter.resonance() < 1.0);

        let out = filtered_sine(&mut filter, 1000.0, 1000.0);
        assert!(out.iter().all(|s| s.is_finite()));
    }
}
