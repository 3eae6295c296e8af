//! Low-level DSP primitives used by the graph nodes.
//!
//! These components own no graph state and know nothing about scheduling;
//! they take samples (and per-sample parameter buffers) in and hand samples
//! back. The graph layer wraps them with automation and routing.

/// Partitioned FFT convolution for long impulse responses.
pub mod convolver;
/// State-variable filter with low-pass and high-pass responses.
pub mod filter;
/// Oscillator waveforms and noise sources.
pub mod oscillator;
/// Decaying-noise impulse responses for the reverb.
pub mod reverb;

pub use convolver::PartitionedConvolver;
pub use filter::{FilterType, SVFilter};
pub use oscillator::{OscillatorBlock, OscillatorWaveform};
pub use reverb::{generate_reverb_impulse, ImpulseResponse};
