//! Configuration parameters for feature extraction

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::features::chroma::normalization::ChromaNorm;
use crate::features::onset::spectral_flux::OnsetCompression;
use crate::features::spectrum::window::WindowFunction;

/// Analysis configuration parameters
///
/// Every field has a default, so a TOML file only needs to name the values it
/// overrides:
///
/// ```
/// use sonance_dsp::AnalysisConfig;
///
/// let config = AnalysisConfig::from_toml_str("n_fft = 4096\nhop_length = 1024")?;
/// assert_eq!(config.n_fft, 4096);
/// assert_eq!(config.n_mels, 128);
/// # Ok::<(), sonance_dsp::AnalysisError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Sample rate of the waveform in Hz (default: 22050)
    pub sample_rate: u32,

    // STFT parameters
    /// Frame length in samples (default: 2048)
    pub n_fft: usize,

    /// Frame advance in samples (default: 512), must not exceed `n_fft`
    pub hop_length: usize,

    /// Analysis window (default: periodic Hann)
    pub window: WindowFunction,

    // Mel / cepstral
    /// Number of mel bands (default: 128)
    pub n_mels: usize,

    /// Lowest mel filter edge in Hz (default: 0.0)
    pub mel_fmin: f32,

    /// Highest mel filter edge in Hz (default: `None` = Nyquist)
    pub mel_fmax: Option<f32>,

    /// Number of cepstral coefficients kept per frame (default: 20)
    pub n_mfcc: usize,

    /// Floor added before the logarithm in the cepstral transform (default: 1e-6)
    pub log_floor: f32,

    // Chroma
    /// Tuning reference for A4 in Hz (default: 440.0)
    pub chroma_reference_hz: f32,

    /// Bins below this frequency are excluded from chroma (default: 20.0 Hz)
    pub chroma_min_hz: f32,

    /// Per-frame chroma normalization (default: Max)
    pub chroma_norm: ChromaNorm,

    /// Temporal moving-average window in frames, 1 disables (default: 1)
    pub chroma_smoothing_window: usize,

    // Onset strength
    /// Compression applied to power values before differencing (default: None)
    pub onset_compression: OnsetCompression,

    /// Centred moving-average window over the onset curve, 1 disables (default: 3)
    pub onset_smoothing_window: usize,

    /// MAD multiplier for onset peak picking (default: 2.5)
    pub onset_delta: f32,

    // Tempo / beats
    /// Tempo search range in BPM (default: (30.0, 300.0))
    pub tempo_search_range: (f32, f32),

    /// Centre of the log-normal tempo prior in BPM (default: 120.0)
    pub start_bpm: f32,

    /// Width of the tempo prior in octaves (default: 1.0)
    pub tempo_prior_octaves: f32,

    /// Beat tracker tightness: weight of the inter-beat interval penalty (default: 100.0)
    pub tightness: f32,

    /// Drop weak beats at the start and end of the sequence (default: true)
    pub trim_beats: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            n_fft: 2048,
            hop_length: 512,
            window: WindowFunction::Hann,
            n_mels: 128,
            mel_fmin: 0.0,
            mel_fmax: None,
            n_mfcc: 20,
            log_floor: 1e-6,
            chroma_reference_hz: 440.0,
            chroma_min_hz: 20.0,
            chroma_norm: ChromaNorm::Max,
            chroma_smoothing_window: 1,
            onset_compression: OnsetCompression::None,
            onset_smoothing_window: 3,
            onset_delta: 2.5,
            tempo_search_range: (30.0, 300.0),
            start_bpm: 120.0,
            tempo_prior_octaves: 1.0,
            tightness: 100.0,
            trim_beats: true,
        }
    }
}

impl AnalysisConfig {
    /// Parse a configuration from TOML, then validate it
    pub fn from_toml_str(source: &str) -> Result<Self, AnalysisError> {
        let config: AnalysisConfig = toml::from_str(source)
            .map_err(|e| AnalysisError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Upper mel edge, resolving `None` to Nyquist
    pub fn mel_fmax_hz(&self) -> f32 {
        self.mel_fmax.unwrap_or(self.sample_rate as f32 / 2.0)
    }

    /// Reject configurations no stage can run with
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let invalid = |msg: String| Err(AnalysisError::InvalidConfiguration(msg));

        if self.sample_rate == 0 {
            return invalid("sample_rate must be > 0".to_string());
        }
        if self.n_fft == 0 {
            return invalid("n_fft must be > 0".to_string());
        }
        if self.hop_length == 0 {
            return invalid("hop_length must be > 0".to_string());
        }
        if self.hop_length > self.n_fft {
            return invalid(format!(
                "hop_length ({}) must not exceed n_fft ({})",
                self.hop_length, self.n_fft
            ));
        }
        if self.n_mels == 0 {
            return invalid("n_mels must be > 0".to_string());
        }
        if self.n_mfcc == 0 || self.n_mfcc > self.n_mels {
            return invalid(format!(
                "n_mfcc must be in 1..={} (n_mels), got {}",
                self.n_mels, self.n_mfcc
            ));
        }
        let nyquist = self.sample_rate as f32 / 2.0;
        let fmax = self.mel_fmax_hz();
        if !(self.mel_fmin >= 0.0 && self.mel_fmin < fmax && fmax <= nyquist) {
            return invalid(format!(
                "mel range [{:.1}, {:.1}] Hz must satisfy 0 <= fmin < fmax <= {:.1}",
                self.mel_fmin, fmax, nyquist
            ));
        }
        if !(self.log_floor > 0.0) {
            return invalid("log_floor must be > 0".to_string());
        }
        if !(self.chroma_reference_hz > 0.0) || self.chroma_min_hz < 0.0 {
            return invalid("chroma reference must be > 0 and chroma_min_hz >= 0".to_string());
        }
        if self.chroma_smoothing_window == 0 || self.onset_smoothing_window == 0 {
            return invalid("smoothing windows must be >= 1 frame".to_string());
        }
        if let OnsetCompression::Log { gamma } = self.onset_compression {
            if !(gamma > 0.0) {
                return invalid("onset log compression gamma must be > 0".to_string());
            }
        }
        if self.onset_delta < 0.0 {
            return invalid("onset_delta must be >= 0".to_string());
        }
        let (min_bpm, max_bpm) = self.tempo_search_range;
        if !(min_bpm > 0.0 && min_bpm < max_bpm) {
            return invalid(format!(
                "Invalid tempo search range: [{:.1}, {:.1}]",
                min_bpm, max_bpm
            ));
        }
        if !(self.start_bpm > 0.0) || !(self.tempo_prior_octaves > 0.0) {
            return invalid("start_bpm and tempo_prior_octaves must be > 0".to_string());
        }
        if !(self.tightness > 0.0) {
            return invalid("tightness must be > 0".to_string());
        }

        Ok(())
    }
}
