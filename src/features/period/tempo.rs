//! Global tempo estimation
//!
//! # Algorithm
//!
//! 1. Autocorrelate the onset curve
//! 2. Restrict to lags inside the tempo search range
//! 3. Weight each lag by a log-normal tempo prior centred at `start_bpm`, which
//!    breaks the half/double-tempo tie between harmonically related peaks
//! 4. Refine the best lag by parabolic interpolation
//!
//! Confidence is the normalized autocorrelation at the chosen lag.
//!
//! # Example
//!
//! ```no_run
//! use sonance_dsp::features::period::tempo::{estimate_tempo, TempoConfig};
//!
//! let curve = vec![0.0f32; 1000];
//! let estimate = estimate_tempo(&curve, 22050, 512, &TempoConfig::default());
//! assert!(estimate.is_err()); // silent curve
//! ```

use super::autocorrelation::{autocorrelation, bpm_to_lag, lag_to_bpm};
use super::TempoEstimate;
use crate::error::AnalysisError;

const EPSILON: f32 = 1e-10;

/// Tempo search parameters
#[derive(Debug, Clone)]
pub struct TempoConfig {
    /// Slowest tempo considered (default: 30.0)
    pub min_bpm: f32,

    /// Fastest tempo considered (default: 300.0)
    pub max_bpm: f32,

    /// Centre of the log-normal prior (default: 120.0)
    pub start_bpm: f32,

    /// Standard deviation of the prior in octaves (default: 1.0)
    pub prior_octaves: f32,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            min_bpm: 30.0,
            max_bpm: 300.0,
            start_bpm: 120.0,
            prior_octaves: 1.0,
        }
    }
}

/// Log-normal tempo prior, 1.0 at `start_bpm`
///
/// `exp(-0.5 * (log2(bpm / start_bpm) / octaves)²)`
pub fn log_normal_prior(bpm: f32, start_bpm: f32, octaves: f32) -> f32 {
    let z = (bpm / start_bpm).log2() / octaves;
    (-0.5 * z * z).exp()
}

/// Estimate the global tempo of an onset strength curve
///
/// # Arguments
///
/// * `curve` - Onset strength curve (one value per frame)
/// * `sample_rate` - Sample rate in Hz
/// * `hop_length` - Hop used for the spectrogram
/// * `config` - Search range and prior
///
/// # Errors
///
/// - `EmptyInput` for an empty curve
/// - `InvalidConfiguration` for an invalid search range or prior
/// - `NoOnsetsDetected` if the curve is silent, constant, too short for the
///   search range, or has no periodicity inside it
pub fn estimate_tempo(
    curve: &[f32],
    sample_rate: u32,
    hop_length: usize,
    config: &TempoConfig,
) -> Result<TempoEstimate, AnalysisError> {
    log::debug!(
        "Estimating tempo: {} frames, {} Hz, hop={}, range=[{:.1}, {:.1}] BPM",
        curve.len(),
        sample_rate,
        hop_length,
        config.min_bpm,
        config.max_bpm
    );

    if curve.is_empty() {
        return Err(AnalysisError::EmptyInput("Empty onset curve".to_string()));
    }
    if sample_rate == 0 || hop_length == 0 {
        return Err(AnalysisError::InvalidConfiguration(format!(
            "sample_rate ({}) and hop_length ({}) must be > 0",
            sample_rate, hop_length
        )));
    }
    if !(config.min_bpm > 0.0 && config.min_bpm < config.max_bpm) {
        return Err(AnalysisError::InvalidConfiguration(format!(
            "Invalid BPM range: [{:.1}, {:.1}]",
            config.min_bpm, config.max_bpm
        )));
    }
    if !(config.start_bpm > 0.0 && config.prior_octaves > 0.0) {
        return Err(AnalysisError::InvalidConfiguration(
            "Tempo prior needs start_bpm > 0 and prior_octaves > 0".to_string(),
        ));
    }

    let peak = curve.iter().copied().fold(0.0f32, f32::max);
    if peak <= EPSILON {
        return Err(AnalysisError::NoOnsetsDetected(
            "Onset curve has no energy (silent input)".to_string(),
        ));
    }

    let acf = autocorrelation(curve)?;
    if acf[0] <= EPSILON {
        return Err(AnalysisError::NoOnsetsDetected(
            "Onset curve is constant, no periodicity to measure".to_string(),
        ));
    }

    let lag_min = (bpm_to_lag(config.max_bpm, sample_rate, hop_length).ceil() as usize).max(1);
    let lag_max_wanted = bpm_to_lag(config.min_bpm, sample_rate, hop_length).floor() as usize;
    let lag_max = lag_max_wanted.min(acf.len() - 1);
    if lag_max < lag_max_wanted {
        log::warn!(
            "Onset curve ({} frames) too short for {:.1} BPM; searching lags up to {}",
            curve.len(),
            config.min_bpm,
            lag_max
        );
    }
    if lag_min > lag_max {
        return Err(AnalysisError::NoOnsetsDetected(format!(
            "Recording too short for tempo search: {} frames, need at least {}",
            curve.len(),
            lag_min + 1
        )));
    }

    let score = |lag: usize| -> f32 {
        let bpm = lag_to_bpm(lag as f32, sample_rate, hop_length);
        acf[lag].max(0.0) * log_normal_prior(bpm, config.start_bpm, config.prior_octaves)
    };

    let (best_lag, best_score) = (lag_min..=lag_max)
        .map(|lag| (lag, score(lag)))
        .fold((lag_min, f32::MIN), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        });

    if best_score <= EPSILON {
        return Err(AnalysisError::NoOnsetsDetected(
            "No periodicity found inside the tempo search range".to_string(),
        ));
    }

    let period_frames = refine_peak(best_lag, &score, acf.len());
    let bpm = lag_to_bpm(period_frames, sample_rate, hop_length)
        .clamp(config.min_bpm, config.max_bpm);
    let confidence = (acf[best_lag] / acf[0]).clamp(0.0, 1.0);

    log::debug!(
        "Tempo: {:.2} BPM (lag {} -> {:.3} frames), confidence={:.3}",
        bpm,
        best_lag,
        period_frames,
        confidence
    );

    Ok(TempoEstimate {
        bpm,
        confidence,
        period_frames,
    })
}

/// Sub-frame peak position by fitting a parabola through three scores
fn refine_peak(lag: usize, score: &impl Fn(usize) -> f32, n_lags: usize) -> f32 {
    if lag < 2 || lag + 1 >= n_lags {
        return lag as f32;
    }
    let (a, b, c) = (score(lag - 1), score(lag), score(lag + 1));
    let denominator = a - 2.0 * b + c;
    if denominator >= -EPSILON {
        return lag as f32;
    }
    let offset = (0.5 * (a - c) / denominator).clamp(-0.5, 0.5);
    lag as f32 + offset
}
