//! Onset-curve autocorrelation
//!
//! Finds periodicity in the onset strength curve using FFT-accelerated
//! autocorrelation: `ACF = IFFT(|FFT(curve - mean)|²)`.
//!
//! Lags are measured in frames and relate to tempo through
//! `BPM = 60 * sample_rate / (lag * hop_length)`.
//!
//! # Reference
//!
//! Ellis, D. P. W., & Pikrakis, A. (2006). Real-time Beat Induction.
//! *Proceedings of the International Conference on Music Information Retrieval*.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::AnalysisError;

/// Convert a tempo in BPM to a lag in frames
pub fn bpm_to_lag(bpm: f32, sample_rate: u32, hop_length: usize) -> f32 {
    60.0 * sample_rate as f32 / (bpm * hop_length as f32)
}

/// Convert a lag in frames to a tempo in BPM
pub fn lag_to_bpm(lag: f32, sample_rate: u32, hop_length: usize) -> f32 {
    60.0 * sample_rate as f32 / (lag * hop_length as f32)
}

/// Autocorrelation of the mean-removed curve
///
/// # Returns
///
/// `acf[lag]` for `lag in 0..curve.len()`, unnormalized; `acf[0]` is the
/// curve's total squared deviation.
///
/// # Errors
///
/// `EmptyInput` for an empty curve.
pub fn autocorrelation(curve: &[f32]) -> Result<Vec<f32>, AnalysisError> {
    if curve.is_empty() {
        return Err(AnalysisError::EmptyInput(
            "Cannot autocorrelate an empty onset curve".to_string(),
        ));
    }

    let n = curve.len();
    let mean = curve.iter().sum::<f32>() / n as f32;

    // FFT size: next power of 2 >= 2*n so the circular correlation does not wrap
    let fft_size = (2 * n).next_power_of_two();

    let mut buffer: Vec<Complex<f32>> = curve
        .iter()
        .map(|&x| Complex::new(x - mean, 0.0))
        .collect();
    buffer.resize(fft_size, Complex::new(0.0, 0.0));

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);
    fft.process(&mut buffer);

    for x in &mut buffer {
        *x = Complex::new(x.norm_sqr(), 0.0);
    }

    let ifft = planner.plan_fft_inverse(fft_size);
    ifft.process(&mut buffer);

    let scale = 1.0 / fft_size as f32;
    let acf: Vec<f32> = buffer[..n].iter().map(|x| x.re * scale).collect();

    log::debug!("Autocorrelation: {} lags, acf[0]={:.6}", acf.len(), acf[0]);

    Ok(acf)
}
