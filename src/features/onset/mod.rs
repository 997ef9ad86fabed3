//! Onset detection modules
//!
//! - Spectral flux onset strength (novelty curve)
//! - Median + MAD adaptive threshold
//! - Peak picking into discrete onset events

pub mod peak_picking;
pub mod spectral_flux;
pub mod threshold;

use serde::{Deserialize, Serialize};

/// A detected onset event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Onset {
    /// Spectrogram frame index
    pub frame: usize,

    /// Onset time in seconds
    pub time_seconds: f32,

    /// Onset strength at the peak
    pub strength: f32,
}
