use crate::dsp::oscillator::{OscillatorBlock, OscillatorWaveform};
use crate::graph::node::{GraphNode, RenderCtx, StereoBlock};
use crate::graph::param::AudioParam;
use crate::MAX_BLOCK_SIZE;

/*
Scheduled Oscillator
====================

A source node that plays only inside a window on the audio clock:

             start                     stop
  silence ─────┼═══════ sounding ════════┼───── silence
               ▲                         ▲
          start(when)               stop(when)

Both edges are sample-accurate: the first audible frame is the first frame
whose time is >= start, and the last is the final frame before stop. An
oscillator can be started once. Stopping requires a prior start, and a stop
time earlier than the start simply means the oscillator never sounds.

The frequency is an AudioParam, so pitch can be set (or glided) on the same
clock as everything else.

Example:
  let mut osc = OscillatorNode::new(OscillatorWaveform::Triangle, 110.0);
  osc.frequency_mut().set_value_at_time(110.0, now);
  osc.start(now);
  osc.stop(now + 1.0);
*/

pub struct OscillatorNode {
    osc: OscillatorBlock,
    frequency: AudioParam,
    start_time: Option<f64>,
    stop_time: Option<f64>,
    freq_buffer: Vec<f32>,
    mono: Vec<f32>,
}

impl OscillatorNode {
    pub fn new(waveform: OscillatorWaveform, frequency: f32) -> Self {
        Self {
            osc: OscillatorBlock::new(waveform),
            frequency: AudioParam::new(frequency),
            start_time: None,
            stop_time: None,
            freq_buffer: vec![0.0; MAX_BLOCK_SIZE],
            mono: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.osc.waveform()
    }

    pub fn frequency(&self) -> &AudioParam {
        &self.frequency
    }

    pub fn frequency_mut(&mut self) -> &mut AudioParam {
        &mut self.frequency
    }

    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    pub fn stop_time(&self) -> Option<f64> {
        self.stop_time
    }

    /// Schedule playback to begin at `when`. Returns false if already started.
    pub fn start(&mut self, when: f64) -> bool {
        if self.start_time.is_some() {
            return false;
        }
        self.start_time = Some(when.max(0.0));
        true
    }

    /// Schedule playback to end at `when`. Returns false if never started.
    ///
    /// A later call replaces the earlier stop time.
    pub fn stop(&mut self, when: f64) -> bool {
        match self.start_time {
            Some(start) => {
                self.stop_time = Some(when.max(start));
                true
            }
            None => false,
        }
    }

    /// Whether any part of [from, to) falls inside the playing window.
    fn overlaps(&self, from: f64, to: f64) -> bool {
        match self.start_time {
            Some(start) => start < to && self.stop_time.map_or(true, |stop| stop > from),
            None => false,
        }
    }
}

impl GraphNode for OscillatorNode {
    fn process(&mut self, _input: &StereoBlock, output: &mut StereoBlock, ctx: &RenderCtx) {
        let frames = ctx.frames;

        if !self.overlaps(ctx.time, ctx.end_time()) {
            output.clear(frames);
            return;
        }

        let freq = &mut self.freq_buffer[..frames];
        self.frequency.render(freq, ctx.time, ctx.sample_rate);

        for (i, sample) in self.mono[..frames].iter_mut().enumerate() {
            let playing = match self.start_time {
                Some(start) => {
                    let t = ctx.frame_time(i);
                    t >= start && self.stop_time.map_or(true, |stop| t < stop)
                }
                None => false,
            };
            *sample = if playing {
                self.osc.next_sample(freq[i], ctx.sample_rate)
            } else {
                0.0
            };
        }

        output.fill_mono(&self.mono[..frames]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 8_000.0;

    fn render(node: &mut OscillatorNode, time: f64, frames: usize) -> StereoBlock {
        let ctx = RenderCtx::new(SAMPLE_RATE, time, frames);
        let mut out = StereoBlock::default();
        node.process(&StereoBlock::default(), &mut out, &ctx);
        out
    }

    #[test]
    fn silent_until_started() {
        let mut osc = OscillatorNode::new(OscillatorWaveform::Triangle, 110.0);
        let out = render(&mut osc, 0.0, 256);
        assert_eq!(out.peak(256), 0.0);
        assert_eq!(osc.start_time(), None);
    }

    #[test]
    fn start_is_sample_accurate() {
        let mut osc = OscillatorNode::new(OscillatorWaveform::Square, 110.0);
        // Frame 100 of the first block
        assert!(osc.start(100.0 / SAMPLE_RATE as f64));

        let out = render(&mut osc, 0.0, 256);
        assert!(out.left[..100].iter().all(|&s| s == 0.0));
        assert_eq!(out.left[100], 1.0);
        assert_eq!(out.left[..256], out.right[..256]);
    }

    #[test]
    fn stop_silences_from_stop_time() {
        let mut osc = OscillatorNode::new(OscillatorWaveform::Square, 110.0);
        osc.start(0.0);
        assert!(osc.stop(0.01)); // frame 80

        let out = render(&mut osc, 0.0, 256);
        assert_eq!(out.left[79], 1.0);
        assert!(out.left[80..256].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn starts_once_and_stop_requires_a_start() {
        let mut osc = OscillatorNode::new(OscillatorWaveform::Triangle, 110.0);
        assert!(!osc.stop(1.0));

        assert!(osc.start(0.5));
        assert!(!osc.start(0.6));
        assert_eq!(osc.start_time(), Some(0.5));

        // Stop earlier than start clamps to start: never sounds
        assert!(osc.stop(0.1));
        assert_eq!(osc.stop_time(), Some(0.5));
    }

    #[test]
    fn frequency_follows_automation() {
        let mut osc = OscillatorNode::new(OscillatorWaveform::Saw, 440.0);
        osc.frequency_mut().set_value_at_time(100.0, 0.0);
        osc.start(0.0);

        // 100 Hz at 8 kHz: 80 frames per cycle
        let out = render(&mut osc, 0.0, 64);
        assert!((out.left[0] + 1.0).abs() < 1e-4);
        assert!((out.left[20] + 0.5).abs() < 1e-3);
        assert!(out.left[40].abs() < 1e-3);
    }
}
