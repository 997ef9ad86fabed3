//! # Sonance DSP
//!
//! A spectral and temporal feature-extraction engine for music recordings:
//! tempo, beat positions, chroma, MFCCs, volume envelope, onset strength and
//! complexity measures, computed from a mono waveform.
//!
//! ## Features
//!
//! - **Spectral analysis**: Centred, reflect-padded STFT and power spectrogram
//! - **Timbre**: Unit-area mel filterbank and orthonormal-DCT MFCCs
//! - **Harmony**: 12-bin chroma folded from the power spectrogram
//! - **Rhythm**: Spectral-flux onset strength, autocorrelation tempo with a
//!   log-normal prior, and dynamic programming beat tracking
//! - **Envelope**: RMS, spectral centroid, zero-crossing rate and a
//!   recording-level summary
//!
//! ## Quick Start
//!
//! ```no_run
//! use sonance_dsp::{analyze_audio, AnalysisConfig};
//!
//! // Mono samples at config.sample_rate (22050 Hz by default)
//! let samples: Vec<f32> = vec![]; // Your audio data
//!
//! let result = analyze_audio(&samples, AnalysisConfig::default())?;
//!
//! println!("Tempo: {:.1} BPM (confidence: {:.2})", result.tempo.bpm, result.tempo.confidence);
//! println!("Beats: {}", result.beats.len());
//! println!("Complexity: {:.3}", result.summary.complexity);
//! # Ok::<(), sonance_dsp::AnalysisError>(())
//! ```
//!
//! For many recordings with one configuration, build an [`AnalysisContext`]
//! once and call [`AnalysisContext::analyze`] for each waveform.
//!
//! ## Architecture
//!
//! ```text
//! Waveform → STFT → Power spectrogram → {Mel → MFCC, Chroma, Onset → Tempo → Beats}
//!                                     → Envelope summaries → AnalysisResult
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;

// Re-export main types
pub use analysis::context::AnalysisContext;
pub use analysis::metadata::AnalysisMetadata;
pub use analysis::result::AnalysisResult;
pub use analysis::summary::FeatureSummary;
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use features::beat_tracking::BeatSequence;
pub use features::period::TempoEstimate;
pub use features::spectrum::Spectrogram;

/// Main analysis function
///
/// Builds an [`AnalysisContext`] for `config` and analyzes one waveform.
///
/// # Arguments
///
/// * `samples` - Mono audio samples at `config.sample_rate`
/// * `config` - Analysis configuration parameters
///
/// # Returns
///
/// `AnalysisResult` containing every feature matrix, tempo, beats and the summary
///
/// # Errors
///
/// - `InvalidConfiguration` if `config` fails validation
/// - `EmptyInput` for zero samples, `InvalidInput` for non-finite samples
/// - `NoOnsetsDetected` if the recording has no rhythmic content
///
/// # Example
///
/// ```no_run
/// use sonance_dsp::{analyze_audio, AnalysisConfig};
///
/// let samples = vec![0.0f32; 22050 * 30];
/// let result = analyze_audio(&samples, AnalysisConfig::default());
/// assert!(result.is_err()); // silence has no tempo
/// ```
pub fn analyze_audio(
    samples: &[f32],
    config: AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    AnalysisContext::new(config)?.analyze(samples)
}
