//! Centred short-time Fourier transform
//!
//! # Algorithm
//!
//! 1. Reflect-pad the waveform by `n_fft / 2` samples on both ends, so frame
//!    `t` is centred on sample `t * hop_length`
//! 2. Slice `floor(N / hop_length) + 1` frames of `n_fft` samples
//! 3. Multiply each frame by the window and run a forward FFT
//! 4. Keep the non-negative half of the spectrum (`n_fft/2 + 1` bins)
//!
//! Frames are independent, so step 3 runs on the rayon pool.
//!
//! # Example
//!
//! ```no_run
//! use sonance_dsp::features::spectrum::stft::StftEngine;
//! use sonance_dsp::features::spectrum::window::WindowFunction;
//!
//! let samples = vec![0.0f32; 22050];
//! let engine = StftEngine::new(2048, 512, WindowFunction::Hann)?;
//! let spectrum = engine.process(&samples, 22050)?;
//! assert_eq!(spectrum.frames.len(), 22050 / 512 + 1);
//! # Ok::<(), sonance_dsp::AnalysisError>(())
//! ```

use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use super::window::WindowFunction;
use super::{frame_count, reflect_pad, ComplexSpectrogram};
use crate::error::AnalysisError;

/// STFT with a pre-planned FFT and pre-computed window
///
/// Planning is done once; [`process`](Self::process) can then be called from
/// several threads at once.
#[derive(Clone)]
pub struct StftEngine {
    n_fft: usize,
    hop_length: usize,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
}

impl fmt::Debug for StftEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StftEngine")
            .field("n_fft", &self.n_fft)
            .field("hop_length", &self.hop_length)
            .finish()
    }
}

impl StftEngine {
    /// Plan an STFT
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `n_fft` or `hop_length` is zero, or if
    /// `hop_length > n_fft`.
    pub fn new(
        n_fft: usize,
        hop_length: usize,
        window: WindowFunction,
    ) -> Result<Self, AnalysisError> {
        if n_fft == 0 || hop_length == 0 {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "n_fft ({}) and hop_length ({}) must be > 0",
                n_fft, hop_length
            )));
        }
        if hop_length > n_fft {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "hop_length ({}) must not exceed n_fft ({})",
                hop_length, n_fft
            )));
        }

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(n_fft);

        Ok(Self {
            n_fft,
            hop_length,
            window: window.coefficients(n_fft),
            fft,
        })
    }

    /// Frame length in samples
    pub fn n_fft(&self) -> usize {
        self.n_fft
    }

    /// Frame advance in samples
    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    /// Window coefficients applied to each frame
    pub fn window(&self) -> &[f32] {
        &self.window
    }

    /// Compute the one-sided STFT of `samples`
    ///
    /// # Errors
    ///
    /// `EmptyInput` for a zero-length waveform.
    pub fn process(
        &self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<ComplexSpectrogram, AnalysisError> {
        if samples.is_empty() {
            return Err(AnalysisError::EmptyInput(
                "Cannot compute STFT of a zero-length waveform".to_string(),
            ));
        }

        let n_frames = frame_count(samples.len(), self.hop_length);
        let n_bins = self.n_fft / 2 + 1;
        log::debug!(
            "STFT: {} samples, n_fft={}, hop={}, {} frames x {} bins",
            samples.len(),
            self.n_fft,
            self.hop_length,
            n_frames,
            n_bins
        );

        let padded = reflect_pad(samples, self.n_fft / 2);

        let frames: Vec<Vec<Complex<f32>>> = (0..n_frames)
            .into_par_iter()
            .map(|t| {
                let start = t * self.hop_length;
                let mut buffer: Vec<Complex<f32>> = self
                    .window
                    .iter()
                    .enumerate()
                    .map(|(i, &w)| {
                        let sample = padded.get(start + i).copied().unwrap_or(0.0);
                        Complex::new(sample * w, 0.0)
                    })
                    .collect();
                self.fft.process(&mut buffer);
                buffer.truncate(n_bins);
                buffer
            })
            .collect();

        Ok(ComplexSpectrogram {
            frames,
            sample_rate,
            n_fft: self.n_fft,
            hop_length: self.hop_length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, sample_rate: u32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_frame_and_bin_counts() {
        let engine = StftEngine::new(2048, 512, WindowFunction::Hann).unwrap();
        for n in [1usize, 511, 512, 1000, 22050] {
            let spec = engine.process(&vec![0.1; n], 22050).unwrap();
            assert_eq!(spec.frames.len(), n / 512 + 1, "frame count for n={}", n);
            assert!(spec.frames.iter().all(|f| f.len() == 1025));
        }
    }

    #[test]
    fn test_odd_frame_length_keeps_frame_count() {
        let engine = StftEngine::new(1001, 250, WindowFunction::Hann).unwrap();
        let spec = engine.process(&vec![0.1; 5000], 8000).unwrap();
        assert_eq!(spec.frames.len(), 5000 / 250 + 1);
        assert!(spec.frames.iter().all(|f| f.len() == 501));
    }

    #[test]
    fn test_sine_peak_bin() {
        let sample_rate = 22050;
        let engine = StftEngine::new(2048, 512, WindowFunction::Hann).unwrap();
        // Bin 100 centre: 100 * 22050 / 2048 ≈ 1076.66 Hz
        let freq = 100.0 * sample_rate as f32 / 2048.0;
        let spec = engine.process(&sine(freq, sample_rate, 22050), sample_rate).unwrap();
        let middle = &spec.frames[spec.frames.len() / 2];
        let peak = middle
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.norm().partial_cmp(&b.1.norm()).unwrap())
            .map(|(k, _)| k)
            .unwrap();
        assert_eq!(peak, 100);
    }

    #[test]
    fn test_empty_input_rejected() {
        let engine = StftEngine::new(2048, 512, WindowFunction::Hann).unwrap();
        assert!(matches!(
            engine.process(&[], 22050),
            Err(AnalysisError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        assert!(matches!(
            StftEngine::new(512, 1024, WindowFunction::Hann),
            Err(AnalysisError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            StftEngine::new(0, 0, WindowFunction::Hann),
            Err(AnalysisError::InvalidConfiguration(_))
        ));
    }
}
