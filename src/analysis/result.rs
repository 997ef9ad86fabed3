//! Analysis result types

use serde::{Deserialize, Serialize};

use super::metadata::AnalysisMetadata;
use super::summary::FeatureSummary;
use crate::features::beat_tracking::BeatSequence;
use crate::features::mel::filterbank::power_to_db;
use crate::features::onset::Onset;
use crate::features::period::TempoEstimate;
use crate::features::spectrum::Spectrogram;

/// Complete analysis result
///
/// Every per-frame matrix is time-major and has `metadata.n_frames` rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Power spectrogram
    pub spectrogram: Spectrogram,

    /// Mel-band energies (frames × n_mels)
    pub mel_spectrogram: Vec<Vec<f32>>,

    /// Cepstral coefficients (frames × n_mfcc)
    pub mfcc: Vec<Vec<f32>>,

    /// Pitch-class energies (frames × 12), index 0 = C
    pub chroma: Vec<Vec<f32>>,

    /// Onset strength curve (one value per frame)
    pub onset_strength: Vec<f32>,

    /// Discrete onset events picked from the onset curve
    pub onsets: Vec<Onset>,

    /// Global tempo
    pub tempo: TempoEstimate,

    /// Tracked beats
    pub beats: BeatSequence,

    /// RMS amplitude per frame
    pub volume_envelope: Vec<f32>,

    /// `volume_envelope` min-max scaled to [0, 1] for plotting
    pub normalized_volume_envelope: Vec<f32>,

    /// Spectral centroid per frame in Hz
    pub spectral_centroid: Vec<f32>,

    /// Zero-crossing rate per frame
    pub zero_crossing_rate: Vec<f32>,

    /// Recording-level summary
    pub summary: FeatureSummary,

    /// Analysis metadata
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    /// Number of analysis frames
    pub fn n_frames(&self) -> usize {
        self.spectrogram.n_frames()
    }

    /// Mel spectrogram in decibels relative to its peak, floored `top_db` below it
    pub fn mel_db(&self, top_db: f32) -> Vec<Vec<f32>> {
        power_to_db(&self.mel_spectrogram, 1e-10, top_db)
    }
}
