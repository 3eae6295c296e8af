use crate::MAX_BLOCK_SIZE;

/// Context passed to graph nodes during rendering
///
/// Contains information about what to render:
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - time: Audio clock time of the first frame in the block, in seconds
/// - frames: Number of frames to render (at most `MAX_BLOCK_SIZE`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub time: f64,
    pub frames: usize,
}

impl RenderCtx {
    pub fn new(sample_rate: f32, time: f64, frames: usize) -> Self {
        Self {
            sample_rate,
            time,
            frames: frames.min(MAX_BLOCK_SIZE),
        }
    }

    /// Audio clock time of frame `index` within the block.
    #[inline]
    pub fn frame_time(&self, index: usize) -> f64 {
        self.time + index as f64 / self.sample_rate as f64
    }

    /// Audio clock time just past the last frame.
    pub fn end_time(&self) -> f64 {
        self.frame_time(self.frames)
    }
}

/// Two channels of `MAX_BLOCK_SIZE` samples. Only the first `ctx.frames`
/// samples of each channel are meaningful during a render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct StereoBlock {
    pub left: Vec<f32>,
    pub right: Vec<f32>,
}

impl Default for StereoBlock {
    fn default() -> Self {
        Self {
            left: vec![0.0; MAX_BLOCK_SIZE],
            right: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

impl StereoBlock {
    pub fn clear(&mut self, frames: usize) {
        self.left[..frames].fill(0.0);
        self.right[..frames].fill(0.0);
    }

    /// Sum `other` into this block (input mixing).
    pub fn accumulate(&mut self, other: &StereoBlock, frames: usize) {
        for (o, i) in self.left[..frames].iter_mut().zip(&other.left[..frames]) {
            *o += i;
        }
        for (o, i) in self.right[..frames].iter_mut().zip(&other.right[..frames]) {
            *o += i;
        }
    }

    pub fn copy_from(&mut self, other: &StereoBlock, frames: usize) {
        self.left[..frames].copy_from_slice(&other.left[..frames]);
        self.right[..frames].copy_from_slice(&other.right[..frames]);
    }

    /// Write the same mono signal to both channels.
    pub fn fill_mono(&mut self, mono: &[f32]) {
        let frames = mono.len();
        self.left[..frames].copy_from_slice(mono);
        self.right[..frames].copy_from_slice(mono);
    }

    pub fn peak(&self, frames: usize) -> f32 {
        self.left[..frames]
            .iter()
            .chain(&self.right[..frames])
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }
}

/// Core trait for audio processing graph nodes
///
/// A node reads the mix of everything connected into it and writes its own
/// output block. Sources ignore `input`; the destination copies it through.
pub trait GraphNode: Send {
    fn process(&mut self, input: &StereoBlock, output: &mut StereoBlock, ctx: &RenderCtx);
}
