//! PCM to byte-spectrum conversion with browser analyser semantics.
//!
//! Blackman window, forward FFT, magnitude scaled by 1/N, temporal smoothing,
//! then decibels mapped linearly from `[min_db, max_db]` onto `0..=255`.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::constants::*;

pub struct FrequencyAnalyser {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    smoothing: f32,
    min_db: f32,
    max_db: f32,
}

impl FrequencyAnalyser {
    pub fn new() -> Self {
        Self::with_fft_size(ANALYSER_FFT_SIZE)
    }

    /// `fft_size` is rounded up to a power of two, minimum 32.
    pub fn with_fft_size(fft_size: usize) -> Self {
        let n = fft_size.max(32).next_power_of_two();
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        Self {
            fft,
            window: blackman_window(n),
            buffer: vec![Complex::new(0.0, 0.0); n],
            scratch,
            smoothed: vec![0.0; n / 2],
            smoothing: ANALYSER_SMOOTHING,
            min_db: ANALYSER_MIN_DB,
            max_db: ANALYSER_MAX_DB,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.window.len()
    }

    pub fn bin_count(&self) -> usize {
        self.smoothed.len()
    }

    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.smoothing = smoothing.clamp(0.0, 1.0);
    }

    /// Forget the smoothing history.
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|s| *s = 0.0);
    }

    /// Analyse the most recent `fft_size` samples of `samples` (zero-padded at
    /// the front when shorter) and write one byte per bin into `out`.
    pub fn process(&mut self, samples: &[f32], out: &mut Vec<u8>) {
        let n = self.fft_size();
        let take = samples.len().min(n);
        let pad = n - take;
        let recent = &samples[samples.len() - take..];

        for (i, c) in self.buffer.iter_mut().enumerate() {
            let s = if i < pad { 0.0 } else { recent[i - pad] };
            // a single NaN or inf would otherwise stick in the smoothing state
            let s = if s.is_finite() { s } else { 0.0 };
            *c = Complex::new(s * self.window[i], 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        let inv_n = 1.0 / n as f32;
        let range = (self.max_db - self.min_db).max(f32::EPSILON);
        out.clear();
        out.reserve(self.smoothed.len());
        for (k, s) in self.smoothed.iter_mut().enumerate() {
            let mag = self.buffer[k].norm() * inv_n;
            *s = self.smoothing * *s + (1.0 - self.smoothing) * mag;
            if !s.is_finite() {
                *s = 0.0;
            }
            let db = if *s > 0.0 {
                20.0 * s.log10()
            } else {
                f32::NEG_INFINITY
            };
            let scaled = 255.0 * (db - self.min_db) / range;
            out.push(scaled.clamp(0.0, 255.0) as u8);
        }
    }
}

impl Default for FrequencyAnalyser {
    fn default() -> Self {
        Self::new()
    }
}

fn blackman_window(n: usize) -> Vec<f32> {
    const A0: f32 = 0.42;
    const A1: f32 = 0.5;
    const A2: f32 = 0.08;
    (0..n)
        .map(|i| {
            let x = i as f32 / n as f32;
            A0 - A1 * (2.0 * PI * x).cos() + A2 * (4.0 * PI * x).cos()
        })
        .collect()
}
