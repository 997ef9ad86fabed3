//! Frame-level envelope descriptors
//!
//! - RMS volume envelope
//! - Spectral centroid (brightness)
//! - Zero-crossing rate
//!
//! The time-domain descriptors use the same centred, reflect-padded framing as
//! the STFT, so every per-frame vector lines up with the spectrogram.

use super::spectrum::{frame_at, frame_count, reflect_pad, Spectrogram};
use crate::error::AnalysisError;

const EPSILON: f32 = 1e-10;

fn validate_framing(samples: &[f32], n_fft: usize, hop_length: usize) -> Result<(), AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::EmptyInput("Empty waveform".to_string()));
    }
    if n_fft == 0 || hop_length == 0 {
        return Err(AnalysisError::InvalidConfiguration(format!(
            "n_fft ({}) and hop_length ({}) must be > 0",
            n_fft, hop_length
        )));
    }
    Ok(())
}

/// Per-frame root-mean-square amplitude
///
/// # Errors
///
/// `EmptyInput` for an empty waveform, `InvalidConfiguration` for zero sizes.
pub fn rms_envelope(
    samples: &[f32],
    n_fft: usize,
    hop_length: usize,
) -> Result<Vec<f32>, AnalysisError> {
    validate_framing(samples, n_fft, hop_length)?;
    log::debug!(
        "Computing RMS envelope: {} samples, n_fft={}, hop={}",
        samples.len(),
        n_fft,
        hop_length
    );

    let padded = reflect_pad(samples, n_fft / 2);
    let n_frames = frame_count(samples.len(), hop_length);

    Ok((0..n_frames)
        .map(|t| {
            let frame = frame_at(&padded, t, n_fft, hop_length);
            (frame.iter().map(|x| x * x).sum::<f32>() / n_fft as f32).sqrt()
        })
        .collect())
}

/// Per-frame fraction of adjacent sample pairs that change sign
///
/// Zero counts as non-negative, so a frame of digital silence has rate 0.
pub fn zero_crossing_rate(
    samples: &[f32],
    n_fft: usize,
    hop_length: usize,
) -> Result<Vec<f32>, AnalysisError> {
    validate_framing(samples, n_fft, hop_length)?;

    let padded = reflect_pad(samples, n_fft / 2);
    let n_frames = frame_count(samples.len(), hop_length);
    let pairs = n_fft.saturating_sub(1).max(1) as f32;

    Ok((0..n_frames)
        .map(|t| {
            let frame = frame_at(&padded, t, n_fft, hop_length);
            let crossings = frame
                .windows(2)
                .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
                .count();
            crossings as f32 / pairs
        })
        .collect())
}

/// Per-frame spectral centroid in Hz
///
/// `Σ f(k)·P(k) / Σ P(k)`; frames with no energy get 0.
pub fn spectral_centroid(power: &Spectrogram) -> Vec<f32> {
    power
        .frames
        .iter()
        .map(|frame| {
            let total: f32 = frame.iter().sum();
            if total <= EPSILON {
                return 0.0;
            }
            let weighted: f32 = frame
                .iter()
                .enumerate()
                .map(|(k, &p)| power.bin_frequency(k) * p)
                .sum();
            weighted / total
        })
        .collect()
}

/// Min-max scale an envelope to [0, 1]
///
/// Constant envelopes are returned unchanged.
pub fn normalize_envelope(envelope: &[f32]) -> Vec<f32> {
    let min = envelope.iter().copied().fold(f32::INFINITY, f32::min);
    let max = envelope.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;
    if !(range > EPSILON) {
        return envelope.to_vec();
    }
    envelope.iter().map(|&v| (v - min) / range).collect()
}

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}
