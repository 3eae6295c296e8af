use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/*
Uniformly Partitioned Convolution (overlap-save)
================================================

Direct convolution with a three second impulse costs len(h) multiplies per
sample, which is far too slow at audio rates. Instead the impulse is cut into
P partitions of B samples, each transformed once up front:

  h:  [ h0 | h1 | h2 | ... | hP-1 ]      H_p = FFT(h_p ++ zeros(B))

Input is processed one block of B samples at a time. Each block, together with
the previous one, forms a 2B window that is transformed and pushed into a
frequency-domain delay line (FDL):

  X_0 = FFT([prev block | this block])
  FDL = [X_0, X_1, ..., X_P-1]           X_p = spectrum from p blocks ago

  Y = Σ X_p · H_p                        (complex multiply-accumulate)
  y = IFFT(Y)[B..2B]                     (first half is circular wrap-around)

Latency is one block: a sample entering at time n comes out at n + B. The
input signal is real, so only bins 0..=B are accumulated and the upper half of
Y is filled in as the complex conjugate mirror before the inverse transform.
*/

pub const DEFAULT_PARTITION_SIZE: usize = 512;

pub struct PartitionedConvolver {
    block: usize,
    fft: Arc<dyn Fft<f32>>,
    ifft: Arc<dyn Fft<f32>>,

    partitions: Vec<Vec<Complex<f32>>>,
    fdl: Vec<Vec<Complex<f32>>>,
    fdl_head: usize,

    window: Vec<f32>,
    filled: usize,
    output: Vec<f32>,

    spectrum: Vec<Complex<f32>>,
    accum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl PartitionedConvolver {
    pub fn new(impulse: &[f32]) -> Self {
        Self::with_partition_size(impulse, DEFAULT_PARTITION_SIZE)
    }

    /// `block` is rounded up to a power of two (minimum 16).
    pub fn with_partition_size(impulse: &[f32], block: usize) -> Self {
        let block = block.max(16).next_power_of_two();
        let size = 2 * block;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);
        let scratch_len = fft
            .get_inplace_scratch_len()
            .max(ifft.get_inplace_scratch_len());
        let mut scratch = vec![Complex::default(); scratch_len];

        let count = impulse.len().div_ceil(block).max(1);
        let partitions: Vec<Vec<Complex<f32>>> = (0..count)
            .map(|p| {
                let mut spectrum = vec![Complex::default(); size];
                let start = (p * block).min(impulse.len());
                let end = (start + block).min(impulse.len());
                for (bin, &h) in spectrum.iter_mut().zip(&impulse[start..end]) {
                    bin.re = h;
                }
                fft.process_with_scratch(&mut spectrum, &mut scratch);
                spectrum
            })
            .collect();

        Self {
            block,
            fft,
            ifft,
            fdl: vec![vec![Complex::default(); size]; count],
            fdl_head: 0,
            partitions,
            window: vec![0.0; size],
            filled: 0,
            output: vec![0.0; block],
            spectrum: vec![Complex::default(); size],
            accum: vec![Complex::default(); size],
            scratch,
        }
    }

    /// Partition size B, which is also the latency in samples.
    pub fn latency(&self) -> usize {
        self.block
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    #[inline]
    pub fn next_sample(&mut self, input: f32) -> f32 {
        let out = self.output[self.filled];
        self.window[self.block + self.filled] = input;
        self.filled += 1;

        if self.filled == self.block {
            self.process_block();
            self.filled = 0;
        }
        out
    }

    /// Convolve `buffer` in place.
    pub fn process(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample);
        }
    }

    fn process_block(&mut self) {
        let block = self.block;
        let size = 2 * block;
        let count = self.partitions.len();

        for (bin, &x) in self.spectrum.iter_mut().zip(&self.window) {
            *bin = Complex::new(x, 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.spectrum, &mut self.scratch);

        // Newest spectrum goes in front of the delay line
        self.fdl_head = (self.fdl_head + count - 1) % count;
        self.fdl[self.fdl_head].copy_from_slice(&self.spectrum);

        self.accum.fill(Complex::default());
        for (p, partition) in self.partitions.iter().enumerate() {
            let x = &self.fdl[(self.fdl_head + p) % count];
            for k in 0..=block {
                self.accum[k] += x[k] * partition[k];
            }
        }
        for k in 1..block {
            self.accum[size - k] = self.accum[k].conj();
        }

        self.ifft
            .process_with_scratch(&mut self.accum, &mut self.scratch);

        let scale = 1.0 / size as f32;
        for (out, y) in self.output.iter_mut().zip(&self.accum[block..]) {
            *out = y.re * scale;
        }

        self.window.copy_within(block.., 0);
    }

    pub fn reset(&mut self) {
        for spectrum in &mut self.fdl {
            spectrum.fill(Complex::default());
        }
        self.window.fill(0.0);
        self.output.fill(0.0);
        self.filled = 0;
    }
}
