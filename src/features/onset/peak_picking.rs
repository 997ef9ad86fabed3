//! Onset peak picking
//!
//! Turns the continuous onset strength curve into discrete onset events:
//! local maxima above a median + MAD threshold, at least `min_distance`
//! frames apart.

use super::threshold::adaptive_threshold_median_mad;
use super::Onset;
use crate::error::AnalysisError;
use crate::features::spectrum::frames_to_time;

const EPSILON: f32 = 1e-10;

/// Find local maxima in a signal
///
/// # Arguments
///
/// * `signal` - Signal to find peaks in
/// * `threshold` - Minimum peak height (absolute)
/// * `min_distance` - Minimum distance between kept peaks (in samples)
///
/// # Returns
///
/// `(index, value)` pairs sorted by index
///
/// # Algorithm
///
/// 1. Find all local maxima (rising on the left, non-rising on the right)
/// 2. Filter by threshold
/// 3. Enforce minimum distance, keeping the higher peak when too close
pub fn find_peaks(signal: &[f32], threshold: f32, min_distance: usize) -> Vec<(usize, f32)> {
    log::debug!(
        "Finding peaks in signal of length {}, threshold={:.4}, min_distance={}",
        signal.len(),
        threshold,
        min_distance
    );

    if signal.len() < 3 {
        return vec![];
    }

    let mut peaks: Vec<(usize, f32)> = (1..signal.len() - 1)
        .filter(|&i| {
            let value = signal[i];
            value > signal[i - 1] && value >= signal[i + 1] && value >= threshold && value > EPSILON
        })
        .map(|i| (i, signal[i]))
        .collect();

    if min_distance > 1 && peaks.len() > 1 {
        // Strongest first, so weaker neighbours are the ones dropped
        peaks.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut kept: Vec<(usize, f32)> = Vec::with_capacity(peaks.len());
        for (idx, value) in peaks {
            let too_close = kept
                .iter()
                .any(|(existing, _)| idx.abs_diff(*existing) < min_distance);
            if !too_close {
                kept.push((idx, value));
            }
        }
        peaks = kept;
    }

    peaks.sort_by_key(|&(idx, _)| idx);
    peaks
}

/// Detect onset events in an onset strength curve
///
/// # Arguments
///
/// * `curve` - Onset strength curve (one value per frame)
/// * `sample_rate` - Sample rate in Hz
/// * `hop_length` - Hop used for the spectrogram
/// * `delta` - MAD multiplier for the adaptive threshold (typical: 2.0-3.0)
///
/// # Returns
///
/// Onsets in time order; empty when the curve is flat.
///
/// # Errors
///
/// `EmptyInput` for an empty curve, `InvalidConfiguration` for negative `delta`.
pub fn detect_onsets(
    curve: &[f32],
    sample_rate: u32,
    hop_length: usize,
    delta: f32,
) -> Result<Vec<Onset>, AnalysisError> {
    let threshold = adaptive_threshold_median_mad(curve, delta)?;

    // ~30 ms refractory period between onsets
    let min_distance = ((0.03 * sample_rate as f32 / hop_length as f32).round() as usize).max(1);

    let onsets: Vec<Onset> = find_peaks(curve, threshold, min_distance)
        .into_iter()
        .map(|(frame, strength)| Onset {
            frame,
            time_seconds: frames_to_time(frame, sample_rate, hop_length),
            strength,
        })
        .collect();

    log::debug!(
        "Detected {} onsets (threshold={:.4}, min_distance={} frames)",
        onsets.len(),
        threshold,
        min_distance
    );

    Ok(onsets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_peaks_basic() {
        let signal = vec![0.0, 0.5, 1.0, 0.7, 0.3, 0.9, 0.2];
        let peaks = find_peaks(&signal, 0.5, 2);
        assert_eq!(peaks, vec![(2, 1.0), (5, 0.9)]);
    }

    #[test]
    fn test_find_peaks_too_short() {
        assert!(find_peaks(&[], 0.5, 2).is_empty());
        assert!(find_peaks(&[1.0, 2.0], 0.5, 2).is_empty());
    }

    #[test]
    fn test_find_peaks_min_distance_keeps_higher() {
        let signal = vec![0.0, 0.5, 1.0, 0.8, 0.9, 0.3, 0.1];
        let peaks = find_peaks(&signal, 0.3, 3);
        assert_eq!(peaks, vec![(2, 1.0)]);
    }

    #[test]
    fn test_find_peaks_all_below_threshold() {
        let signal = vec![0.1, 0.2, 0.3, 0.2, 0.1];
        assert!(find_peaks(&signal, 1.0, 1).is_empty());
    }

    #[test]
    fn test_find_peaks_plateau_reports_first_sample() {
        let signal = vec![0.0, 1.0, 1.0, 0.0];
        assert_eq!(find_peaks(&signal, 0.5, 1), vec![(1, 1.0)]);
    }

    #[test]
    fn test_detect_onsets_periodic_curve() {
        let mut curve = vec![0.0f32; 200];
        for t in (10..200).step_by(20) {
            curve[t] = 1.0;
            curve[t + 1] = 0.4;
        }
        let onsets = detect_onsets(&curve, 22050, 512, 2.5).unwrap();
        let frames: Vec<usize> = onsets.iter().map(|o| o.frame).collect();
        assert_eq!(frames, (10..200).step_by(20).collect::<Vec<_>>());
        assert!((onsets[0].time_seconds - 10.0 * 512.0 / 22050.0).abs() < 1e-5);
    }

    #[test]
    fn test_detect_onsets_flat_curve() {
        let onsets = detect_onsets(&vec![0.0; 50], 22050, 512, 2.5).unwrap();
        assert!(onsets.is_empty());
    }
}
