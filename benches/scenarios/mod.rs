//! Tone engine benchmarks.
//!
//! These render complete voices (oscillator → filter → envelope → reverb)
//! through the audio graph, the same path the device callback takes.

mod voices;

pub use voices::bench_voices;
