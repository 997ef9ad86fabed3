//! Mel-frequency cepstral coefficients
//!
//! `mfcc[t] = DCT-II(ln(mel[t] + ε))[..n_mfcc]` with the orthonormal DCT
//! convention. Coefficient 0 tracks overall log-energy; higher coefficients
//! describe the spectral envelope.

use std::f32::consts::PI;

use crate::error::AnalysisError;

/// Pre-computed orthonormal DCT-II basis (n_mfcc × n_mels)
#[derive(Debug, Clone)]
pub struct Mfcc {
    basis: Vec<Vec<f32>>,
    n_mels: usize,
    log_floor: f32,
}

impl Mfcc {
    /// Build the DCT basis
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `n_mfcc` is zero or exceeds `n_mels`, or if
    /// `log_floor` is not positive.
    pub fn new(n_mels: usize, n_mfcc: usize, log_floor: f32) -> Result<Self, AnalysisError> {
        if n_mels == 0 || n_mfcc == 0 || n_mfcc > n_mels {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "n_mfcc must be in 1..={} (n_mels), got {}",
                n_mels, n_mfcc
            )));
        }
        if !(log_floor > 0.0) {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "log floor must be > 0, got {}",
                log_floor
            )));
        }

        let n = n_mels as f32;
        let basis = (0..n_mfcc)
            .map(|k| {
                let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
                (0..n_mels)
                    .map(|i| scale * (PI * k as f32 * (2 * i + 1) as f32 / (2.0 * n)).cos())
                    .collect()
            })
            .collect();

        Ok(Self {
            basis,
            n_mels,
            log_floor,
        })
    }

    /// Number of coefficients per frame
    pub fn n_mfcc(&self) -> usize {
        self.basis.len()
    }

    /// Cepstral coefficients for one mel frame
    pub fn frame(&self, mel_frame: &[f32]) -> Vec<f32> {
        let log_mel: Vec<f32> = mel_frame
            .iter()
            .map(|&e| (e.max(0.0) + self.log_floor).ln())
            .collect();
        self.basis
            .iter()
            .map(|row| row.iter().zip(log_mel.iter()).map(|(&b, &x)| b * x).sum())
            .collect()
    }

    /// Cepstral coefficients for a mel spectrogram (time axis preserved)
    ///
    /// # Errors
    ///
    /// `InvalidInput` if a frame does not have `n_mels` bands.
    pub fn apply(&self, mel: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, AnalysisError> {
        if let Some((t, frame)) = mel.iter().enumerate().find(|(_, f)| f.len() != self.n_mels) {
            return Err(AnalysisError::InvalidInput(format!(
                "Mel frame {} has {} bands, expected {}",
                t,
                frame.len(),
                self.n_mels
            )));
        }
        log::debug!(
            "Computing {} MFCCs for {} frames",
            self.n_mfcc(),
            mel.len()
        );
        Ok(mel.iter().map(|frame| self.frame(frame)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basis_is_orthonormal() {
        let mfcc = Mfcc::new(16, 16, 1e-6).unwrap();
        for a in 0..16 {
            for b in 0..16 {
                let dot: f32 = mfcc.basis[a]
                    .iter()
                    .zip(mfcc.basis[b].iter())
                    .map(|(x, y)| x * y)
                    .sum();
                let expected = if a == b { 1.0 } else { 0.0 };
                assert!((dot - expected).abs() < 1e-4, "<{}, {}> = {}", a, b, dot);
            }
        }
    }

    #[test]
    fn test_flat_spectrum_has_only_energy_coefficient() {
        let mfcc = Mfcc::new(40, 13, 1e-6).unwrap();
        let coeffs = mfcc.frame(&vec![1.0; 40]);
        assert_eq!(coeffs.len(), 13);
        // ln(1 + 1e-6) * sqrt(40)
        assert!((coeffs[0] - (1.0f32 + 1e-6).ln() * 40f32.sqrt()).abs() < 1e-4);
        assert!(coeffs[1..].iter().all(|c| c.abs() < 1e-4));
    }

    #[test]
    fn test_silence_is_floored_not_infinite() {
        let mfcc = Mfcc::new(20, 20, 1e-6).unwrap();
        let coeffs = mfcc.frame(&vec![0.0; 20]);
        assert!(coeffs.iter().all(|c| c.is_finite()));
        assert!(coeffs[0] < 0.0);
    }

    #[test]
    fn test_louder_frame_raises_coefficient_zero() {
        let mfcc = Mfcc::new(20, 5, 1e-6).unwrap();
        let quiet = mfcc.frame(&vec![0.01; 20]);
        let loud = mfcc.frame(&vec![1.0; 20]);
        assert!(loud[0] > quiet[0]);
    }

    #[test]
    fn test_invalid_sizes() {
        assert!(Mfcc::new(10, 20, 1e-6).is_err());
        assert!(Mfcc::new(10, 0, 1e-6).is_err());
        assert!(Mfcc::new(10, 5, 0.0).is_err());
        let mfcc = Mfcc::new(10, 5, 1e-6).unwrap();
        assert!(mfcc.apply(&[vec![0.0; 9]]).is_err());
    }
}
