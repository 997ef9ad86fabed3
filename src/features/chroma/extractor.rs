//! Chroma vector extraction
//!
//! Folds a power spectrogram into 12 pitch classes. Each FFT bin with centre
//! frequency `f >= min_hz` is assigned to
//! `p = round(12 * log2(f / f_C0)) mod 12`, where `f_C0` is C0 derived from the
//! A4 tuning reference, and its energy is summed into row `p`.

use crate::error::AnalysisError;
use crate::features::spectrum::{bin_frequency, Spectrogram};

/// Number of pitch classes
pub const N_CHROMA: usize = 12;

/// Semitones from C0 up to A4
const A4_SEMITONES_ABOVE_C0: f32 = 57.0;

/// Pitch-class names, index 0 = C
pub const PITCH_CLASS_NAMES: [&str; N_CHROMA] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Bin → pitch-class assignment for one `(sample_rate, n_fft)` configuration
#[derive(Debug, Clone)]
pub struct ChromaMap {
    /// `Some(pitch_class)` for bins that contribute, `None` for excluded bins
    classes: Vec<Option<usize>>,
}

impl ChromaMap {
    /// Build the assignment table
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Sample rate in Hz
    /// * `n_fft` - FFT frame length
    /// * `reference_a4_hz` - Tuning reference (440.0 for standard tuning)
    /// * `min_hz` - Bins below this frequency (including DC) are ignored
    pub fn new(
        sample_rate: u32,
        n_fft: usize,
        reference_a4_hz: f32,
        min_hz: f32,
    ) -> Result<Self, AnalysisError> {
        if sample_rate == 0 || n_fft == 0 || !(reference_a4_hz > 0.0) {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "Chroma map needs positive sample_rate, n_fft and reference (got {}, {}, {})",
                sample_rate, n_fft, reference_a4_hz
            )));
        }

        let c0 = reference_a4_hz * 2f32.powf(-A4_SEMITONES_ABOVE_C0 / 12.0);
        let classes = (0..n_fft / 2 + 1)
            .map(|k| {
                let f = bin_frequency(k, sample_rate, n_fft);
                if f <= 0.0 || f < min_hz {
                    None
                } else {
                    let semitones = (12.0 * (f / c0).log2()).round() as i64;
                    Some(semitones.rem_euclid(N_CHROMA as i64) as usize)
                }
            })
            .collect();

        Ok(Self { classes })
    }

    /// Pitch class of bin `k`, if the bin contributes
    pub fn pitch_class(&self, k: usize) -> Option<usize> {
        self.classes.get(k).copied().flatten()
    }

    /// Number of bins the map expects per frame
    pub fn n_bins(&self) -> usize {
        self.classes.len()
    }

    /// Fold one power frame into 12 pitch classes
    pub fn fold_frame(&self, frame: &[f32]) -> Vec<f32> {
        let mut chroma = vec![0.0f32; N_CHROMA];
        for (power, class) in frame.iter().zip(self.classes.iter()) {
            if let Some(p) = class {
                chroma[*p] += power;
            }
        }
        chroma
    }
}

/// Extract raw (unnormalized) chroma vectors from a power spectrogram
///
/// # Returns
///
/// One 12-element vector per frame
///
/// # Errors
///
/// `InvalidInput` if the spectrogram bin count does not match the map.
pub fn extract_chroma(
    power: &Spectrogram,
    map: &ChromaMap,
) -> Result<Vec<Vec<f32>>, AnalysisError> {
    if power.n_bins() != map.n_bins() {
        return Err(AnalysisError::InvalidInput(format!(
            "Spectrogram has {} bins, chroma map expects {}",
            power.n_bins(),
            map.n_bins()
        )));
    }
    log::debug!("Extracting chroma: {} frames", power.n_frames());
    Ok(power.frames.iter().map(|frame| map.fold_frame(frame)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_of_frequency(
        map: &ChromaMap,
        sample_rate: u32,
        n_fft: usize,
        hz: f32,
    ) -> Option<usize> {
        let k = (hz * n_fft as f32 / sample_rate as f32).round() as usize;
        map.pitch_class(k)
    }

    #[test]
    fn test_pitch_class_assignment() {
        let sample_rate = 44100;
        let n_fft = 16384;
        let map = ChromaMap::new(sample_rate, n_fft, 440.0, 20.0).unwrap();
        assert_eq!(class_of_frequency(&map, sample_rate, n_fft, 440.0), Some(9)); // A
        assert_eq!(class_of_frequency(&map, sample_rate, n_fft, 261.63), Some(0)); // C4
        assert_eq!(class_of_frequency(&map, sample_rate, n_fft, 392.0), Some(7)); // G4
        assert_eq!(class_of_frequency(&map, sample_rate, n_fft, 1760.0), Some(9)); // A6
    }

    #[test]
    fn test_low_bins_excluded() {
        let map = ChromaMap::new(22050, 2048, 440.0, 20.0).unwrap();
        assert_eq!(map.pitch_class(0), None);
        // Bin 1 ≈ 10.8 Hz, below 20 Hz
        assert_eq!(map.pitch_class(1), None);
        assert!(map.pitch_class(2).is_some());
    }

    #[test]
    fn test_fold_frame_sums_energy() {
        let map = ChromaMap::new(22050, 2048, 440.0, 20.0).unwrap();
        let frame = vec![1.0f32; 1025];
        let chroma = map.fold_frame(&frame);
        let total: f32 = chroma.iter().sum();
        // All bins except DC and bin 1
        assert!((total - 1023.0).abs() < 1e-3);
    }

    #[test]
    fn test_extract_rejects_mismatched_bins() {
        let map = ChromaMap::new(22050, 2048, 440.0, 20.0).unwrap();
        let power = Spectrogram {
            frames: vec![vec![0.0; 513]],
            sample_rate: 22050,
            n_fft: 1024,
            hop_length: 256,
        };
        assert!(extract_chroma(&power, &map).is_err());
    }
}
