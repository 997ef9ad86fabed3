//! Beat tracking modules
//!
//! Place individual beats on the onset curve given a global tempo:
//! - Dynamic programming over onset strength with a tempo-consistency penalty

pub mod dynamic_programming;

use serde::{Deserialize, Serialize};

/// Tracked beats, strictly increasing in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeatSequence {
    /// Beat positions as spectrogram frame indices
    pub frames: Vec<usize>,

    /// Beat positions in seconds
    pub times: Vec<f32>,
}

impl BeatSequence {
    /// Number of beats
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True if no beats were tracked
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
