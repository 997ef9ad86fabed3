//! Configuration-scoped analysis context
//!
//! Everything that depends only on the configuration (window, FFT plan, mel
//! filterbank, DCT basis, chroma map) is built once in [`AnalysisContext::new`]
//! and reused for every waveform. A context holds no mutable state, so one
//! instance can analyze several waveforms from different threads at once.
//!
//! # Pipeline
//!
//! ```text
//! waveform → STFT → power ─┬→ mel → MFCC
//!                          ├→ chroma
//!                          └→ onset strength → tempo → beats
//! waveform → RMS / zero-crossing rate
//! ```
//!
//! The three spectral branches only read the power spectrogram and run under
//! `rayon::join`.
//!
//! # Example
//!
//! ```no_run
//! use sonance_dsp::{AnalysisConfig, AnalysisContext};
//!
//! let context = AnalysisContext::new(AnalysisConfig::default())?;
//! let samples = vec![0.0f32; 22050 * 10];
//! let result = context.analyze(&samples)?;
//! println!("Tempo: {:.1} BPM", result.tempo.bpm);
//! # Ok::<(), sonance_dsp::AnalysisError>(())
//! ```

use std::time::Instant;

use super::metadata::AnalysisMetadata;
use super::result::AnalysisResult;
use super::summary::FeatureSummary;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::beat_tracking::dynamic_programming::DpBeatTracker;
use crate::features::beat_tracking::BeatSequence;
use crate::features::chroma::extractor::{extract_chroma, ChromaMap};
use crate::features::chroma::normalization::normalize_chroma;
use crate::features::chroma::smoothing::smooth_chroma;
use crate::features::envelope::{
    normalize_envelope, rms_envelope, spectral_centroid, zero_crossing_rate,
};
use crate::features::mel::filterbank::MelFilterbank;
use crate::features::mel::mfcc::Mfcc;
use crate::features::onset::peak_picking::detect_onsets;
use crate::features::onset::spectral_flux::onset_strength;
use crate::features::onset::Onset;
use crate::features::period::tempo::{estimate_tempo, TempoConfig};
use crate::features::period::TempoEstimate;
use crate::features::spectrum::power::power_spectrogram;
use crate::features::spectrum::stft::StftEngine;
use crate::features::spectrum::Spectrogram;

/// Output of the onset/tempo/beat branch
struct RhythmFeatures {
    onset_strength: Vec<f32>,
    onsets: Vec<Onset>,
    tempo: TempoEstimate,
    beats: BeatSequence,
}

/// Precomputed analysis state for one configuration
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    config: AnalysisConfig,
    stft: StftEngine,
    mel: MelFilterbank,
    mfcc: Mfcc,
    chroma: ChromaMap,
}

impl AnalysisContext {
    /// Validate `config` and build every filterbank it implies
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if the configuration fails validation.
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;

        log::debug!(
            "Building analysis context: sr={}, n_fft={}, hop={}, n_mels={}, n_mfcc={}",
            config.sample_rate,
            config.n_fft,
            config.hop_length,
            config.n_mels,
            config.n_mfcc
        );

        let stft = StftEngine::new(config.n_fft, config.hop_length, config.window)?;
        let mel = MelFilterbank::new(
            config.sample_rate,
            config.n_fft,
            config.n_mels,
            config.mel_fmin,
            config.mel_fmax_hz(),
        )?;
        let mfcc = Mfcc::new(config.n_mels, config.n_mfcc, config.log_floor)?;
        let chroma = ChromaMap::new(
            config.sample_rate,
            config.n_fft,
            config.chroma_reference_hz,
            config.chroma_min_hz,
        )?;

        Ok(Self {
            config,
            stft,
            mel,
            mfcc,
            chroma,
        })
    }

    /// Configuration this context was built from
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the full pipeline on a mono waveform
    ///
    /// # Arguments
    ///
    /// * `samples` - Mono samples at `config().sample_rate`
    ///
    /// # Errors
    ///
    /// - `EmptyInput` for zero samples
    /// - `InvalidInput` if any sample is NaN or infinite
    /// - `NoOnsetsDetected` if the recording has no rhythmic content (e.g. silence)
    pub fn analyze(&self, samples: &[f32]) -> Result<AnalysisResult, AnalysisError> {
        let start_time = Instant::now();
        let sample_rate = self.config.sample_rate;

        log::debug!(
            "Starting audio analysis: {} samples at {} Hz",
            samples.len(),
            sample_rate
        );

        validate_samples(samples)?;

        let complex = self.stft.process(samples, sample_rate)?;
        let power = power_spectrogram(&complex);
        drop(complex);

        let ((mel_result, chroma_result), rhythm_result) = rayon::join(
            || {
                rayon::join(
                    || self.cepstral_features(&power),
                    || self.chroma_features(&power),
                )
            },
            || self.rhythm_features(&power),
        );
        let (mel_spectrogram, mfcc) = mel_result?;
        let chroma = chroma_result?;
        let rhythm = rhythm_result?;

        let volume_envelope = rms_envelope(samples, self.config.n_fft, self.config.hop_length)?;
        let zcr = zero_crossing_rate(samples, self.config.n_fft, self.config.hop_length)?;
        let centroid = spectral_centroid(&power);

        let normalized_volume_envelope = normalize_envelope(&volume_envelope);

        let summary = FeatureSummary::from_envelopes(
            &volume_envelope,
            &centroid,
            &rhythm.onset_strength,
            &zcr,
        )
        .with_tempo(&rhythm.tempo);

        let mut metadata = AnalysisMetadata::new(samples.len(), sample_rate, power.n_frames());
        metadata.processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;

        log::debug!(
            "Analysis complete: {} frames, {:.2} BPM, {} beats, {} onsets in {:.1} ms",
            power.n_frames(),
            rhythm.tempo.bpm,
            rhythm.beats.len(),
            rhythm.onsets.len(),
            metadata.processing_time_ms
        );

        Ok(AnalysisResult {
            spectrogram: power,
            mel_spectrogram,
            mfcc,
            chroma,
            onset_strength: rhythm.onset_strength,
            onsets: rhythm.onsets,
            tempo: rhythm.tempo,
            beats: rhythm.beats,
            volume_envelope,
            normalized_volume_envelope,
            spectral_centroid: centroid,
            zero_crossing_rate: zcr,
            summary,
            metadata,
        })
    }

    /// Envelope and complexity summary without the full feature matrices
    ///
    /// Unlike [`analyze`](Self::analyze), recordings with no periodicity (a
    /// steady tone, silence) still summarize; their `tempo_bpm` and
    /// `tempo_confidence` are `None`.
    ///
    /// # Errors
    ///
    /// - `EmptyInput` for zero samples
    /// - `InvalidInput` if any sample is NaN or infinite
    pub fn summarize(&self, samples: &[f32]) -> Result<FeatureSummary, AnalysisError> {
        validate_samples(samples)?;
        let config = &self.config;

        let power = power_spectrogram(&self.stft.process(samples, config.sample_rate)?);
        let curve = onset_strength(
            &power,
            config.onset_compression,
            config.onset_smoothing_window,
        )?;
        let volume_envelope = rms_envelope(samples, config.n_fft, config.hop_length)?;
        let zcr = zero_crossing_rate(samples, config.n_fft, config.hop_length)?;
        let centroid = spectral_centroid(&power);

        let summary = FeatureSummary::from_envelopes(&volume_envelope, &centroid, &curve, &zcr);
        let tempo_config = self.tempo_config();
        match estimate_tempo(&curve, config.sample_rate, config.hop_length, &tempo_config) {
            Ok(tempo) => Ok(summary.with_tempo(&tempo)),
            Err(AnalysisError::NoOnsetsDetected(reason)) => {
                log::debug!("Summary without tempo: {}", reason);
                Ok(summary)
            }
            Err(e) => Err(e),
        }
    }

    fn tempo_config(&self) -> TempoConfig {
        TempoConfig {
            min_bpm: self.config.tempo_search_range.0,
            max_bpm: self.config.tempo_search_range.1,
            start_bpm: self.config.start_bpm,
            prior_octaves: self.config.tempo_prior_octaves,
        }
    }

    fn cepstral_features(
        &self,
        power: &Spectrogram,
    ) -> Result<(Vec<Vec<f32>>, Vec<Vec<f32>>), AnalysisError> {
        let mel = self.mel.apply(power)?;
        let mfcc = self.mfcc.apply(&mel)?;
        Ok((mel, mfcc))
    }

    fn chroma_features(&self, power: &Spectrogram) -> Result<Vec<Vec<f32>>, AnalysisError> {
        let mut chroma = extract_chroma(power, &self.chroma)?;
        normalize_chroma(&mut chroma, self.config.chroma_norm);
        Ok(smooth_chroma(&chroma, self.config.chroma_smoothing_window))
    }

    fn rhythm_features(&self, power: &Spectrogram) -> Result<RhythmFeatures, AnalysisError> {
        let config = &self.config;
        let curve = onset_strength(
            power,
            config.onset_compression,
            config.onset_smoothing_window,
        )?;
        let onsets = detect_onsets(
            &curve,
            config.sample_rate,
            config.hop_length,
            config.onset_delta,
        )?;

        let tempo = estimate_tempo(
            &curve,
            config.sample_rate,
            config.hop_length,
            &self.tempo_config(),
        )?;

        let beats = DpBeatTracker::new(tempo.bpm, config.tightness, config.trim_beats).track(
            &curve,
            config.sample_rate,
            config.hop_length,
        )?;

        Ok(RhythmFeatures {
            onset_strength: curve,
            onsets,
            tempo,
            beats,
        })
    }
}

fn validate_samples(samples: &[f32]) -> Result<(), AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::EmptyInput("Empty audio samples".to_string()));
    }
    if let Some(index) = samples.iter().position(|x| !x.is_finite()) {
        return Err(AnalysisError::InvalidInput(format!(
            "Non-finite sample at index {}",
            index
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click_track(bpm: f32, seconds: f32, sample_rate: u32) -> Vec<f32> {
        let n = (seconds * sample_rate as f32) as usize;
        let mut samples = vec![0.0f32; n];
        let interval = 60.0 / bpm;
        let mut t = 0.5;
        while t < seconds {
            let start = (t * sample_rate as f32) as usize;
            for i in 0..220.min(n.saturating_sub(start)) {
                samples[start + i] = (1.0 - i as f32 / 220.0) * if i % 2 == 0 { 1.0 } else { -1.0 };
            }
            t += interval;
        }
        samples
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = AnalysisConfig {
            hop_length: 4096,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            AnalysisContext::new(config),
            Err(AnalysisError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_rejects_non_finite_samples() {
        let context = AnalysisContext::new(AnalysisConfig::default()).unwrap();
        let mut samples = vec![0.1f32; 4096];
        samples[100] = f32::NAN;
        assert!(matches!(
            context.analyze(&samples),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_empty_input() {
        let context = AnalysisContext::new(AnalysisConfig::default()).unwrap();
        assert!(matches!(
            context.analyze(&[]),
            Err(AnalysisError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_output_shapes_agree() {
        let context = AnalysisContext::new(AnalysisConfig::default()).unwrap();
        let samples = click_track(120.0, 6.0, 22050);
        let result = context.analyze(&samples).unwrap();

        let n_frames = samples.len() / 512 + 1;
        assert_eq!(result.n_frames(), n_frames);
        assert_eq!(result.metadata.n_frames, n_frames);
        assert_eq!(result.mel_spectrogram.len(), n_frames);
        assert!(result.mel_spectrogram.iter().all(|row| row.len() == 128));
        assert_eq!(result.mfcc.len(), n_frames);
        assert!(result.mfcc.iter().all(|row| row.len() == 20));
        assert_eq!(result.chroma.len(), n_frames);
        assert!(result.chroma.iter().all(|row| row.len() == 12));
        assert_eq!(result.onset_strength.len(), n_frames);
        assert_eq!(result.volume_envelope.len(), n_frames);
        assert_eq!(result.normalized_volume_envelope.len(), n_frames);
        assert_eq!(result.spectral_centroid.len(), n_frames);
        assert_eq!(result.zero_crossing_rate.len(), n_frames);
        assert_eq!(result.mel_db(80.0).len(), n_frames);
    }

    #[test]
    fn test_summarize_steady_tone_without_tempo() {
        let context = AnalysisContext::new(AnalysisConfig::default()).unwrap();
        let tone: Vec<f32> = (0..22050 * 3)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 22050.0).sin())
            .collect();

        assert!(context.analyze(&tone).is_err());
        let summary = context.summarize(&tone).expect("a steady tone still summarizes");
        assert_eq!(summary.tempo_bpm, None);
        assert_eq!(summary.tempo_confidence, None);
        assert!(summary.complexity.is_finite() && summary.complexity >= 0.0);
        assert!((summary.average_volume - 0.5 / 2.0f32.sqrt()).abs() < 0.02);
        assert!((summary.average_brightness - 440.0).abs() < 50.0);
    }

    #[test]
    fn test_summarize_matches_full_analysis() {
        let context = AnalysisContext::new(AnalysisConfig::default()).unwrap();
        let samples = click_track(120.0, 6.0, 22050);
        let summary = context.summarize(&samples).unwrap();
        let result = context.analyze(&samples).unwrap();
        assert_eq!(summary, result.summary);
        assert_eq!(summary.tempo_bpm, Some(result.tempo.bpm));
    }

    #[test]
    fn test_summarize_rejects_empty_input() {
        let context = AnalysisContext::new(AnalysisConfig::default()).unwrap();
        assert!(matches!(
            context.summarize(&[]),
            Err(AnalysisError::EmptyInput(_))
        ));
    }
}
