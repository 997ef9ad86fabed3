//! Spectral flux onset strength
//!
//! Half-wave rectified frame-to-frame increase of spectral energy:
//!
//! ```text
//! novelty[t] = Σ_k max(0, S[t][k] - S[t-1][k]),   novelty[0] = 0
//! ```
//!
//! `S` is the power spectrogram, optionally log-compressed as
//! `ln(1 + γ · power)` to shrink its dynamic range. A centred moving average
//! can be applied afterwards to suppress jitter.
//!
//! # Reference
//!
//! Bello, J. P., Daudet, L., Abdallah, S., Duxbury, C., Davies, M., & Sandler, M. B. (2005).
//! A Tutorial on Onset Detection in Music Signals.
//! *IEEE Transactions on Speech and Audio Processing*, 13(5), 1035-1047.
//!
//! # Example
//!
//! ```no_run
//! use sonance_dsp::features::onset::spectral_flux::{onset_strength, OnsetCompression};
//! use sonance_dsp::features::spectrum::Spectrogram;
//!
//! let power = Spectrogram {
//!     frames: vec![vec![0.0f32; 1025]; 100],
//!     sample_rate: 22050,
//!     n_fft: 2048,
//!     hop_length: 512,
//! };
//! let curve = onset_strength(&power, OnsetCompression::None, 3)?;
//! assert_eq!(curve.len(), 100);
//! # Ok::<(), sonance_dsp::AnalysisError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::features::spectrum::Spectrogram;

/// Compression applied to power values before differencing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OnsetCompression {
    /// Difference raw power
    None,
    /// Difference `ln(1 + gamma * power)`
    Log {
        /// Gain before the logarithm; larger values compress harder
        gamma: f32,
    },
}

impl OnsetCompression {
    fn apply(&self, power: f32) -> f32 {
        match *self {
            OnsetCompression::None => power,
            OnsetCompression::Log { gamma } => (gamma * power).ln_1p(),
        }
    }
}

/// Compute the onset strength curve of a power spectrogram
///
/// # Arguments
///
/// * `power` - Power spectrogram (n_frames × n_bins)
/// * `compression` - Optional log compression before differencing
/// * `smoothing_window` - Centred moving-average width in frames (1 = off)
///
/// # Returns
///
/// One non-negative value per spectrogram frame; the first is always 0
/// before smoothing.
///
/// # Errors
///
/// Returns `AnalysisError` if:
/// - Spectrogram has no frames (`EmptyInput`)
/// - Frames have inconsistent lengths (`InvalidInput`)
pub fn onset_strength(
    power: &Spectrogram,
    compression: OnsetCompression,
    smoothing_window: usize,
) -> Result<Vec<f32>, AnalysisError> {
    if power.frames.is_empty() {
        return Err(AnalysisError::EmptyInput(
            "Cannot compute onset strength of an empty spectrogram".to_string(),
        ));
    }

    let n_bins = power.frames[0].len();
    for (i, frame) in power.frames.iter().enumerate() {
        if frame.len() != n_bins {
            return Err(AnalysisError::InvalidInput(format!(
                "Inconsistent frame lengths: frame 0 has {} bins, frame {} has {} bins",
                n_bins,
                i,
                frame.len()
            )));
        }
    }

    log::debug!(
        "Computing spectral flux: {} frames, {} bins, compression={:?}, smoothing={}",
        power.n_frames(),
        n_bins,
        compression,
        smoothing_window
    );

    let mut flux = Vec::with_capacity(power.n_frames());
    flux.push(0.0f32);

    let mut previous: Vec<f32> = power.frames[0]
        .iter()
        .map(|&p| compression.apply(p))
        .collect();

    for frame in &power.frames[1..] {
        let current: Vec<f32> = frame.iter().map(|&p| compression.apply(p)).collect();
        let increase: f32 = current
            .iter()
            .zip(previous.iter())
            .map(|(&curr, &prev)| (curr - prev).max(0.0))
            .sum();
        flux.push(increase);
        previous = current;
    }

    let curve = moving_average(&flux, smoothing_window);

    log::debug!(
        "Spectral flux: {} values, max={:.6}",
        curve.len(),
        curve.iter().copied().fold(0.0f32, f32::max)
    );

    Ok(curve)
}

/// Centred moving average; the window is truncated at the edges
pub fn moving_average(values: &[f32], window_size: usize) -> Vec<f32> {
    if window_size <= 1 || values.len() < 2 {
        return values.to_vec();
    }
    let n = values.len();
    let half = window_size / 2;
    (0..n)
        .map(|t| {
            let start = t.saturating_sub(half);
            let end = (t + window_size - half).min(n);
            values[start..end].iter().sum::<f32>() / (end - start) as f32
        })
        .collect()
}
