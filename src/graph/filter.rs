use crate::dsp::filter::{FilterType, SVFilter};
use crate::graph::node::{GraphNode, RenderCtx, StereoBlock};
use crate::graph::param::AudioParam;
use crate::MAX_BLOCK_SIZE;

/*
Filter Node
===========

Wraps one state-variable filter per channel behind an automatable cutoff.

  cutoff (Hz)     character of a triangle at bass pitches
  -----------     ----------------------------------------
  200             muffled, almost a sine
  2000            warm, upper harmonics rounded off
  20000           effectively open

Example:
  let mut filter = FilterNode::lowpass(2000.0);
  filter.frequency_mut().set_value_at_time(2000.0, now);
*/

pub struct FilterNode {
    filters: [SVFilter; 2],
    frequency: AudioParam,
    cutoff_buffer: Vec<f32>,
}

impl FilterNode {
    pub fn new(filter_type: FilterType, cutoff_hz: f32) -> Self {
        Self {
            filters: [SVFilter::new(filter_type), SVFilter::new(filter_type)],
            frequency: AudioParam::new(cutoff_hz),
            cutoff_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz)
    }

    pub fn filter_type(&self) -> FilterType {
        self.filters[0].filter_type()
    }

    pub fn frequency(&self) -> &AudioParam {
        &self.frequency
    }

    pub fn frequency_mut(&mut self) -> &mut AudioParam {
        &mut self.frequency
    }

    pub fn set_resonance(&mut self, resonance: f32) {
        for filter in &mut self.filters {
            filter.set_resonance(resonance);
        }
    }
}

impl GraphNode for FilterNode {
    fn process(&mut self, input: &StereoBlock, output: &mut StereoBlock, ctx: &RenderCtx) {
        let frames = ctx.frames;
        let cutoff = &mut self.cutoff_buffer[..frames];
        self.frequency.render(cutoff, ctx.time, ctx.sample_rate);

        output.copy_from(input, frames);
        let [left, right] = &mut self.filters;
        left.render(&mut output.left[..frames], cutoff, ctx.sample_rate);
        right.render(&mut output.right[..frames], cutoff, ctx.sample_rate);
    }
}
