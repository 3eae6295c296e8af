pub mod config; // Voice sound and timing constants
pub mod dsp;
pub mod engine; // Audio-clock task scheduling
pub mod error;
pub mod graph; // Web-Audio-style node graph and audio clock
pub mod notes;
pub mod synth; // Tone lifecycle and keyboard front end

pub use config::{EnvelopeShape, ReverbConfig, ToneConfig};
pub use error::{GraphError, Result, ToneError};
pub use graph::{AudioContext, AudioGraph, NodeId};
pub use notes::Note;
pub use synth::{
    format_active_tones, ActiveTonesListener, Keyboard, ToneManager, VoiceNodes, VoiceState,
};

pub const MAX_BLOCK_SIZE: usize = 2048;
