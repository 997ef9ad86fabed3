//! Tempo estimation modules
//!
//! Convert the onset strength curve into a single global tempo:
//! - Autocorrelation of the onset curve
//! - Lag scoring under a log-normal tempo prior

pub mod autocorrelation;
pub mod tempo;

use serde::{Deserialize, Serialize};

/// Global tempo estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempoEstimate {
    /// Tempo in beats per minute
    pub bpm: f32,

    /// Normalized autocorrelation at the chosen lag (0.0-1.0)
    pub confidence: f32,

    /// Beat period in frames (sub-frame precision)
    pub period_frames: f32,
}
