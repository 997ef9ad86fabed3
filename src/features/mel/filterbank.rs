//! Mel filterbank projection
//!
//! Triangular filters spaced uniformly on the mel scale
//! (`mel(f) = 2595 * log10(1 + f / 700)`), each normalized to unit area over
//! the discrete FFT bins so wide high-frequency bands do not dominate.
//!
//! # Example
//!
//! ```no_run
//! use sonance_dsp::features::mel::filterbank::MelFilterbank;
//!
//! let bank = MelFilterbank::new(22050, 2048, 128, 0.0, 11025.0)?;
//! assert_eq!(bank.n_mels(), 128);
//! # Ok::<(), sonance_dsp::AnalysisError>(())
//! ```

use crate::error::AnalysisError;
use crate::features::spectrum::{bin_frequency, Spectrogram};

/// Convert Hz to mel
pub fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

/// Convert mel to Hz
pub fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10f32.powf(mel / 2595.0) - 1.0)
}

/// One triangular filter, stored from its first non-zero bin
#[derive(Debug, Clone)]
struct MelBand {
    start_bin: usize,
    weights: Vec<f32>,
}

/// Sparse (n_mels × n_bins) projection matrix
#[derive(Debug, Clone)]
pub struct MelFilterbank {
    bands: Vec<MelBand>,
    n_bins: usize,
    bin_width_hz: f32,
}

impl MelFilterbank {
    /// Build the filterbank for one `(sample_rate, n_fft, n_mels)` configuration
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` for zero sizes or a frequency range outside
    /// `[0, sample_rate / 2]`.
    pub fn new(
        sample_rate: u32,
        n_fft: usize,
        n_mels: usize,
        fmin: f32,
        fmax: f32,
    ) -> Result<Self, AnalysisError> {
        if sample_rate == 0 || n_fft == 0 || n_mels == 0 {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "Mel filterbank needs sample_rate, n_fft, n_mels > 0 (got {}, {}, {})",
                sample_rate, n_fft, n_mels
            )));
        }
        let nyquist = sample_rate as f32 / 2.0;
        if !(fmin >= 0.0 && fmin < fmax && fmax <= nyquist) {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "Mel range [{:.1}, {:.1}] Hz outside [0, {:.1}]",
                fmin, fmax, nyquist
            )));
        }

        let n_bins = n_fft / 2 + 1;
        let bin_width_hz = sample_rate as f32 / n_fft as f32;

        // n_mels + 2 edge frequencies, uniform in mel
        let mel_min = hz_to_mel(fmin);
        let mel_max = hz_to_mel(fmax);
        let edges: Vec<f32> = (0..n_mels + 2)
            .map(|i| mel_to_hz(mel_min + (mel_max - mel_min) * i as f32 / (n_mels + 1) as f32))
            .collect();

        let mut bands = Vec::with_capacity(n_mels);
        let mut empty_bands = 0;

        for m in 0..n_mels {
            let (lower, centre, upper) = (edges[m], edges[m + 1], edges[m + 2]);

            let mut start_bin = None;
            let mut weights = Vec::new();
            for k in 0..n_bins {
                let f = bin_frequency(k, sample_rate, n_fft);
                let rising = (f - lower) / (centre - lower);
                let falling = (upper - f) / (upper - centre);
                let w = rising.min(falling).max(0.0);
                if w > 0.0 {
                    start_bin.get_or_insert(k);
                    weights.push(w);
                } else if start_bin.is_some() {
                    break;
                }
            }

            // Unit area over the discrete bins: sum(w) * bin_width = 1
            let area: f32 = weights.iter().sum::<f32>() * bin_width_hz;
            if area > 0.0 {
                for w in &mut weights {
                    *w /= area;
                }
            } else {
                empty_bands += 1;
            }

            bands.push(MelBand {
                start_bin: start_bin.unwrap_or(0),
                weights,
            });
        }

        if empty_bands > 0 {
            log::warn!(
                "{} of {} mel bands cover no FFT bin (n_fft={} too small for n_mels={})",
                empty_bands,
                n_mels,
                n_fft,
                n_mels
            );
        }

        log::debug!(
            "Built mel filterbank: {} bands over [{:.1}, {:.1}] Hz, {} bins",
            n_mels,
            fmin,
            fmax,
            n_bins
        );

        Ok(Self {
            bands,
            n_bins,
            bin_width_hz,
        })
    }

    /// Number of mel bands
    pub fn n_mels(&self) -> usize {
        self.bands.len()
    }

    /// Number of FFT bins the filterbank expects per frame
    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Dense weight row for band `m` (length `n_bins`)
    pub fn band_weights(&self, m: usize) -> Vec<f32> {
        let mut row = vec![0.0f32; self.n_bins];
        if let Some(band) = self.bands.get(m) {
            row[band.start_bin..band.start_bin + band.weights.len()]
                .copy_from_slice(&band.weights);
        }
        row
    }

    /// Area of band `m` (`sum(w) * bin_width`), 1.0 for non-empty bands
    pub fn band_area(&self, m: usize) -> f32 {
        self.bands
            .get(m)
            .map(|band| band.weights.iter().sum::<f32>() * self.bin_width_hz)
            .unwrap_or(0.0)
    }

    /// Project one power frame onto the mel bands
    pub fn project_frame(&self, frame: &[f32]) -> Vec<f32> {
        self.bands
            .iter()
            .map(|band| {
                frame
                    .iter()
                    .skip(band.start_bin)
                    .zip(band.weights.iter())
                    .map(|(&p, &w)| p * w)
                    .sum()
            })
            .collect()
    }

    /// Project a power spectrogram (time axis preserved)
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the spectrogram bin count differs from the filterbank.
    pub fn apply(&self, power: &Spectrogram) -> Result<Vec<Vec<f32>>, AnalysisError> {
        if power.n_bins() != self.n_bins {
            return Err(AnalysisError::InvalidInput(format!(
                "Spectrogram has {} bins, mel filterbank expects {}",
                power.n_bins(),
                self.n_bins
            )));
        }
        log::debug!(
            "Projecting {} frames onto {} mel bands",
            power.n_frames(),
            self.n_mels()
        );
        Ok(power
            .frames
            .iter()
            .map(|frame| self.project_frame(frame))
            .collect())
    }
}

/// Convert a power matrix to decibels relative to its maximum
///
/// `10 * log10(max(x, amin) / max(ref, amin))`, clipped to `top_db` below the peak.
pub fn power_to_db(power: &[Vec<f32>], amin: f32, top_db: f32) -> Vec<Vec<f32>> {
    let amin = amin.max(f32::MIN_POSITIVE);
    let reference = power
        .iter()
        .flat_map(|row| row.iter().copied())
        .fold(0.0f32, f32::max)
        .max(amin);
    let ref_db = 10.0 * reference.log10();
    let floor = -top_db.abs();

    power
        .iter()
        .map(|row| {
            row.iter()
                .map(|&p| (10.0 * p.max(amin).log10() - ref_db).max(floor))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mel_scale_round_trip_points() {
        assert!(hz_to_mel(0.0).abs() < 1e-6);
        assert!((hz_to_mel(700.0) - 2595.0 * 2f32.log10()).abs() < 1e-2);
        assert!((mel_to_hz(hz_to_mel(1000.0)) - 1000.0).abs() < 0.1);
    }

    #[test]
    fn test_bands_have_unit_area_across_sample_rates() {
        for sample_rate in [16000u32, 22050, 44100] {
            let bank = MelFilterbank::new(sample_rate, 2048, 128, 0.0, sample_rate as f32 / 2.0)
                .unwrap();
            assert_eq!(bank.n_mels(), 128);
            for m in 0..bank.n_mels() {
                let area = bank.band_area(m);
                assert!(
                    (area - 1.0).abs() < 1e-3,
                    "band {} at {} Hz has area {}",
                    m,
                    sample_rate,
                    area
                );
            }
        }
    }

    #[test]
    fn test_weights_are_non_negative_and_ordered() {
        let bank = MelFilterbank::new(22050, 2048, 40, 0.0, 11025.0).unwrap();
        let mut previous_peak = 0;
        for m in 0..bank.n_mels() {
            let row = bank.band_weights(m);
            assert!(row.iter().all(|&w| w >= 0.0));
            let peak = row
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
                .map(|(k, _)| k)
                .unwrap();
            assert!(peak >= previous_peak, "band centres must increase");
            previous_peak = peak;
        }
    }

    #[test]
    fn test_apply_preserves_time_axis() {
        let bank = MelFilterbank::new(22050, 512, 32, 0.0, 11025.0).unwrap();
        let power = Spectrogram {
            frames: vec![vec![1.0; 257]; 7],
            sample_rate: 22050,
            n_fft: 512,
            hop_length: 128,
        };
        let mel = bank.apply(&power).unwrap();
        assert_eq!(mel.len(), 7);
        assert!(mel.iter().all(|row| row.len() == 32));
        // Flat unit spectrum: each band returns sum(w) = 1 / bin_width
        let expected = 512.0 / 22050.0;
        assert!((mel[0][10] - expected).abs() < 1e-4);
    }

    #[test]
    fn test_apply_rejects_mismatched_bins() {
        let bank = MelFilterbank::new(22050, 512, 32, 0.0, 11025.0).unwrap();
        let power = Spectrogram {
            frames: vec![vec![1.0; 1025]; 2],
            sample_rate: 22050,
            n_fft: 2048,
            hop_length: 512,
        };
        assert!(bank.apply(&power).is_err());
    }

    #[test]
    fn test_invalid_range_rejected() {
        assert!(MelFilterbank::new(22050, 2048, 128, 0.0, 20000.0).is_err());
        assert!(MelFilterbank::new(22050, 2048, 0, 0.0, 11025.0).is_err());
    }

    #[test]
    fn test_power_to_db_reference_and_floor() {
        let db = power_to_db(&[vec![1.0, 0.1, 0.0]], 1e-10, 80.0);
        assert!(db[0][0].abs() < 1e-5);
        assert!((db[0][1] + 10.0).abs() < 1e-4);
        assert!((db[0][2] + 80.0).abs() < 1e-4);
    }
}
