//! Benchmarks for low-level DSP primitives.

mod convolver;
mod filter;
mod oscillator;
mod param;
mod reverb;

pub use convolver::bench_convolver;
pub use filter::bench_filter;
pub use oscillator::bench_oscillator;
pub use param::bench_param;
pub use reverb::bench_reverb;
