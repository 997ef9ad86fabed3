//! Analysis metadata structures

use serde::{Deserialize, Serialize};

/// Analysis metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Audio duration in seconds
    pub duration_seconds: f32,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of spectrogram frames
    pub n_frames: usize,

    /// Processing time in milliseconds
    pub processing_time_ms: f32,

    /// Algorithm version
    pub algorithm_version: String,
}

impl AnalysisMetadata {
    /// Metadata for a waveform of `n_samples` at `sample_rate`
    pub fn new(n_samples: usize, sample_rate: u32, n_frames: usize) -> Self {
        Self {
            duration_seconds: n_samples as f32 / sample_rate as f32,
            sample_rate,
            n_frames,
            ..Self::default()
        }
    }
}

impl Default for AnalysisMetadata {
    fn default() -> Self {
        Self {
            duration_seconds: 0.0,
            sample_rate: 0,
            n_frames: 0,
            processing_time_ms: 0.0,
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
