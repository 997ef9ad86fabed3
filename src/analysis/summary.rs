//! Scalar summaries of a whole recording
//!
//! Reduces the per-frame descriptors to the handful of numbers a presenter
//! shows in its summary box. The envelope reductions never depend on tempo;
//! tempo is attached separately when the recording has one.

use serde::{Deserialize, Serialize};

use crate::features::envelope::mean;
use crate::features::period::TempoEstimate;

/// Recording-level summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    /// Mean RMS amplitude
    pub average_volume: f32,

    /// Mean spectral centroid in Hz
    pub average_brightness: f32,

    /// Mean onset strength: how much spectral change happens per frame
    ///
    /// Close to 0 for steady tones, large for noisy or dense material.
    pub complexity: f32,

    /// Mean zero-crossing rate (0.0-1.0)
    pub average_zero_crossing_rate: f32,

    /// Global tempo in BPM, `None` when the recording has no periodicity
    pub tempo_bpm: Option<f32>,

    /// Tempo confidence (0.0-1.0), `None` alongside `tempo_bpm`
    pub tempo_confidence: Option<f32>,
}

impl FeatureSummary {
    /// Reduce per-frame envelopes to their means, with no tempo attached
    pub fn from_envelopes(
        volume_envelope: &[f32],
        spectral_centroid: &[f32],
        onset_strength: &[f32],
        zero_crossing_rate: &[f32],
    ) -> Self {
        Self {
            average_volume: mean(volume_envelope),
            average_brightness: mean(spectral_centroid),
            complexity: mean(onset_strength),
            average_zero_crossing_rate: mean(zero_crossing_rate),
            tempo_bpm: None,
            tempo_confidence: None,
        }
    }

    /// Attach a tempo estimate
    pub fn with_tempo(mut self, tempo: &TempoEstimate) -> Self {
        self.tempo_bpm = Some(tempo.bpm);
        self.tempo_confidence = Some(tempo.confidence);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_envelopes() {
        let summary = FeatureSummary::from_envelopes(
            &[0.1, 0.3],
            &[1000.0, 2000.0],
            &[0.0, 2.0, 4.0],
            &[0.1, 0.1],
        );
        assert!((summary.average_volume - 0.2).abs() < 1e-6);
        assert!((summary.average_brightness - 1500.0).abs() < 1e-3);
        assert!((summary.complexity - 2.0).abs() < 1e-6);
        assert!((summary.average_zero_crossing_rate - 0.1).abs() < 1e-6);
        assert_eq!(summary.tempo_bpm, None);
        assert_eq!(summary.tempo_confidence, None);
    }

    #[test]
    fn test_with_tempo_keeps_envelope_means() {
        let tempo = TempoEstimate {
            bpm: 120.0,
            confidence: 0.8,
            period_frames: 21.5,
        };
        let base = FeatureSummary::from_envelopes(&[0.5], &[440.0], &[1.0], &[0.2]);
        let summary = base.clone().with_tempo(&tempo);
        assert_eq!(summary.tempo_bpm, Some(120.0));
        assert_eq!(summary.tempo_confidence, Some(0.8));
        assert_eq!(summary.complexity, base.complexity);
        assert_eq!(summary.average_volume, base.average_volume);
    }
}
