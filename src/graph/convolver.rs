use std::sync::Arc;

use crate::dsp::convolver::PartitionedConvolver;
use crate::dsp::reverb::ImpulseResponse;
use crate::graph::node::{GraphNode, RenderCtx, StereoBlock};

/*
Convolution Reverb
==================

Each channel of the input is convolved with the matching channel of a shared
impulse response. A decaying-noise impulse three seconds long sums tens of
thousands of reflections, so the raw result would be enormously loud. The
impulse is therefore normalized by its RMS power and a fixed calibration gain
(the same scheme browsers use for their convolver), which keeps a 3 s noise
tail at roughly the level of the dry signal.

  scale = CALIBRATION / sqrt(max(power, MIN_POWER)) * (CALIBRATION_RATE / sr)

The impulse is held through an `Arc`, so many voices can share one buffer
while each keeps its own convolution state.
*/

const GAIN_CALIBRATION: f32 = 0.00125;
const GAIN_CALIBRATION_SAMPLE_RATE: f32 = 44_100.0;
const MIN_POWER: f32 = 0.000125;

/// Gain applied to an impulse so long noisy tails play at a sane level.
pub fn normalization_scale(impulse: &ImpulseResponse) -> f32 {
    if impulse.is_empty() {
        return 1.0;
    }

    let sum: f32 = (0..2)
        .flat_map(|ch| impulse.channel(ch).iter())
        .map(|s| s * s)
        .sum();
    let rms = (sum / (2 * impulse.len()) as f32).max(MIN_POWER).sqrt();

    let mut scale = GAIN_CALIBRATION / rms;
    if impulse.sample_rate() > 0.0 {
        scale *= GAIN_CALIBRATION_SAMPLE_RATE / impulse.sample_rate();
    }
    scale
}

pub struct ConvolverNode {
    impulse: Arc<ImpulseResponse>,
    convolvers: [PartitionedConvolver; 2],
}

impl ConvolverNode {
    /// Convolver with browser-style normalization applied to the impulse.
    pub fn new(impulse: Arc<ImpulseResponse>) -> Self {
        Self::build(impulse, true)
    }

    /// Convolver that uses the impulse exactly as given.
    pub fn unnormalized(impulse: Arc<ImpulseResponse>) -> Self {
        Self::build(impulse, false)
    }

    fn build(impulse: Arc<ImpulseResponse>, normalize: bool) -> Self {
        let scale = if normalize {
            normalization_scale(&impulse)
        } else {
            1.0
        };
        let channel = |ch: usize| {
            let scaled: Vec<f32> = impulse.channel(ch).iter().map(|s| s * scale).collect();
            PartitionedConvolver::new(&scaled)
        };
        let convolvers = [channel(0), channel(1)];

        Self {
            impulse,
            convolvers,
        }
    }

    pub fn impulse(&self) -> &Arc<ImpulseResponse> {
        &self.impulse
    }

    /// Samples of delay introduced by block convolution.
    pub fn latency(&self) -> usize {
        self.convolvers[0].latency()
    }
}

impl GraphNode for ConvolverNode {
    fn process(&mut self, input: &StereoBlock, output: &mut StereoBlock, ctx: &RenderCtx) {
        let frames = ctx.frames;
        output.copy_from(input, frames);

        let [left, right] = &mut self.convolvers;
        left.process(&mut output.left[..frames]);
        right.process(&mut output.right[..frames]);
    }
}
