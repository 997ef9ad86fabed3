//! Short-time spectral analysis
//!
//! Turns a waveform into time-aligned spectra:
//! - Analysis windows
//! - Centred, reflect-padded STFT
//! - Power / magnitude spectrograms
//!
//! Every spectrogram in this crate is time-major: `frames[t][k]` is bin `k`
//! of frame `t`, and frame `t` is centred on sample `t * hop_length`.

pub mod power;
pub mod stft;
pub mod window;

use rustfft::num_complex::Complex;
use serde::{Deserialize, Serialize};

/// Complex STFT output (n_frames × (n_fft/2 + 1))
#[derive(Debug, Clone)]
pub struct ComplexSpectrogram {
    /// One-sided spectra, one per frame
    pub frames: Vec<Vec<Complex<f32>>>,

    /// Sample rate of the analysed waveform in Hz
    pub sample_rate: u32,

    /// Frame length in samples
    pub n_fft: usize,

    /// Frame advance in samples
    pub hop_length: usize,
}

/// Real-valued time-frequency matrix (n_frames × (n_fft/2 + 1))
///
/// Holds power (`|X|²`) unless produced by
/// [`magnitude_spectrogram`](power::magnitude_spectrogram).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrogram {
    /// Non-negative values, one row per frame
    pub frames: Vec<Vec<f32>>,

    /// Sample rate of the analysed waveform in Hz
    pub sample_rate: u32,

    /// Frame length in samples
    pub n_fft: usize,

    /// Frame advance in samples
    pub hop_length: usize,
}

impl Spectrogram {
    /// Number of frames
    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of frequency bins per frame (`n_fft/2 + 1`)
    pub fn n_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Centre frequency of bin `k` in Hz
    pub fn bin_frequency(&self, k: usize) -> f32 {
        bin_frequency(k, self.sample_rate, self.n_fft)
    }

    /// Time of frame `t` in seconds
    pub fn frame_time(&self, t: usize) -> f32 {
        frames_to_time(t, self.sample_rate, self.hop_length)
    }
}

/// Centre frequency of FFT bin `k` in Hz
pub fn bin_frequency(k: usize, sample_rate: u32, n_fft: usize) -> f32 {
    k as f32 * sample_rate as f32 / n_fft as f32
}

/// Convert a frame index to seconds
pub fn frames_to_time(frame: usize, sample_rate: u32, hop_length: usize) -> f32 {
    (frame * hop_length) as f32 / sample_rate as f32
}

/// Number of centred frames for a waveform of `n_samples`
///
/// Always `floor(n_samples / hop_length) + 1`, independent of `n_fft`.
pub fn frame_count(n_samples: usize, hop_length: usize) -> usize {
    n_samples / hop_length + 1
}

/// Reflect-pad `samples` by `pad` on both ends (numpy "reflect" mode)
///
/// The edge sample is not repeated. Pads longer than the signal keep
/// reflecting back and forth.
pub fn reflect_pad(samples: &[f32], pad: usize) -> Vec<f32> {
    let n = samples.len();
    if n == 0 {
        return vec![0.0; 2 * pad];
    }
    (0..n + 2 * pad)
        .map(|j| samples[reflect_index(j as isize - pad as isize, n)])
        .collect()
}

fn reflect_index(m: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n as isize - 1);
    let m = m.rem_euclid(period);
    if m >= n as isize {
        (period - m) as usize
    } else {
        m as usize
    }
}

/// Copy frame `index` out of a padded signal; reads past the end are zero
pub fn frame_at(padded: &[f32], index: usize, n_fft: usize, hop_length: usize) -> Vec<f32> {
    let start = index * hop_length;
    (0..n_fft)
        .map(|i| padded.get(start + i).copied().unwrap_or(0.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_pad_matches_numpy() {
        let padded = reflect_pad(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(padded, vec![3.0, 2.0, 1.0, 2.0, 3.0, 4.0, 3.0, 2.0]);
    }

    #[test]
    fn test_reflect_pad_longer_than_signal() {
        let padded = reflect_pad(&[1.0, 2.0], 3);
        // period 2 reflection: ... 2 1 2 | 1 2 | 1 2 1
        assert_eq!(padded, vec![2.0, 1.0, 2.0, 1.0, 2.0, 1.0, 2.0, 1.0]);

        let single = reflect_pad(&[5.0], 2);
        assert_eq!(single, vec![5.0; 5]);
    }

    #[test]
    fn test_frame_count() {
        assert_eq!(frame_count(22050, 512), 44);
        assert_eq!(frame_count(512, 512), 2);
        assert_eq!(frame_count(1, 512), 1);
    }

    #[test]
    fn test_frame_at_zero_fills_past_end() {
        let frame = frame_at(&[1.0, 2.0, 3.0], 1, 4, 2);
        assert_eq!(frame, vec![3.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_bin_frequency_and_time() {
        assert!((bin_frequency(1024, 22050, 2048) - 11025.0).abs() < 1e-3);
        assert!((frames_to_time(43, 22050, 512) - 0.998).abs() < 1e-3);
    }
}
