//! Synthetic audio source and FFT front end
//!
//! Stands in for a media player: produces a simple beat-driven track and
//! turns each block into the interleaved magnitude layout the core expects.

use num_complex::Complex;
use rand::Rng;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::TAU;
use std::sync::Arc;

/// Full-scale amplitude of 16-bit PCM
const PCM_SCALE: f32 = 32767.0;

/// Kick drum, bass line, chord pad and hiss
pub struct SignalGenerator {
    sample_rate: f32,
    beat_period: f32,
    position: u64,
}

impl SignalGenerator {
    /// Create a generator at `sample_rate` with a beat every `60 / bpm` seconds
    pub fn new(sample_rate: u32, bpm: f32) -> Self {
        Self {
            sample_rate: sample_rate.max(1) as f32,
            beat_period: 60.0 / bpm.max(1.0),
            position: 0,
        }
    }

    /// Fill `out` with the next block of samples in PCM scale
    pub fn fill<R: Rng + ?Sized>(&mut self, out: &mut [f32], rng: &mut R) {
        for sample in out.iter_mut() {
            let t = self.position as f32 / self.sample_rate;
            self.position += 1;

            let beat_phase = t % self.beat_period;
            let bar = (t / (self.beat_period * 4.0)) as u32;

            // Decaying low sine on every beat
            let kick = (TAU * 55.0 * beat_phase).sin() * (-beat_phase * 18.0).exp();
            // Bass note changes every bar
            let bass_freq = [82.4, 110.0, 98.0, 73.4][(bar % 4) as usize];
            let bass = 0.3 * (TAU * bass_freq * t).sin();
            // Pad swells over two beats
            let swell = 0.5 - 0.5 * (TAU * t / (self.beat_period * 2.0)).cos();
            let pad = 0.15
                * swell
                * [440.0, 554.4, 659.3]
                    .iter()
                    .map(|f| (TAU * f * t).sin())
                    .sum::<f32>();
            let hiss = 0.02 * rng.random_range(-1.0f32..1.0);

            *sample = (0.6 * kick + bass + pad + hiss).clamp(-1.0, 1.0) * PCM_SCALE;
        }
    }
}

/// Windowed FFT producing two magnitude values per bin
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    magnitudes: Vec<f32>,
}

impl SpectrumAnalyzer {
    /// Create an analyzer for blocks of `fft_size` samples
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        // Hann window
        let window = (0..fft_size)
            .map(|i| {
                let t = i as f32 / (fft_size.max(2) - 1) as f32;
                0.5 * (1.0 - (TAU * t).cos())
            })
            .collect();

        Self {
            fft,
            window,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            magnitudes: vec![0.0; fft_size],
        }
    }

    /// Transform one block. The result holds `fft_size / 2` bins up to the
    /// Nyquist frequency, each written twice (left and right channel).
    pub fn analyze(&mut self, samples: &[f32]) -> &[f32] {
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let s = samples.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(s * self.window[i], 0.0);
        }
        self.fft.process(&mut self.buffer);

        let bins = self.buffer.len() / 2;
        for (bin, value) in self.buffer[..bins].iter().enumerate() {
            let magnitude = value.norm();
            self.magnitudes[2 * bin] = magnitude;
            self.magnitudes[2 * bin + 1] = magnitude;
        }
        &self.magnitudes
    }
}
