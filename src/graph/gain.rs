use crate::graph::node::{GraphNode, RenderCtx, StereoBlock};
use crate::graph::param::AudioParam;
use crate::MAX_BLOCK_SIZE;

/// Multiplies its input by an automated gain.
///
/// This is where a voice's envelope lives: the attack, swell and release are
/// all ramps on the `gain` param rather than a separate envelope generator.
pub struct GainNode {
    gain: AudioParam,
    gain_buffer: Vec<f32>,
}

impl GainNode {
    pub fn new(gain: f32) -> Self {
        Self {
            gain: AudioParam::new(gain),
            gain_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn gain(&self) -> &AudioParam {
        &self.gain
    }

    pub fn gain_mut(&mut self) -> &mut AudioParam {
        &mut self.gain
    }
}

impl Default for GainNode {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl GraphNode for GainNode {
    fn process(&mut self, input: &StereoBlock, output: &mut StereoBlock, ctx: &RenderCtx) {
        let frames = ctx.frames;
        let gain = &mut self.gain_buffer[..frames];
        self.gain.render(gain, ctx.time, ctx.sample_rate);

        for ((o, i), g) in output.left[..frames].iter_mut().zip(&input.left).zip(gain.iter()) {
            *o = i * g;
        }
        for ((o, i), g) in output.right[..frames].iter_mut().zip(&input.right).zip(gain.iter()) {
            *o = i * g;
        }
    }
}
