//! Error types for the feature-extraction engine

use std::fmt;

/// Errors that can occur during feature extraction
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Zero-length waveform, or a statistic that is undefined for the input
    EmptyInput(String),

    /// Configuration rejected by validation (e.g. `hop_length > n_fft`)
    InvalidConfiguration(String),

    /// Onset curve carries no energy, so tempo and beats are undefined
    NoOnsetsDetected(String),

    /// Waveform contains non-finite samples
    InvalidInput(String),

    /// Input file does not exist or cannot be opened
    FileNotFound(String),

    /// Container or codec is not supported by the decoder
    UnsupportedFormat(String),

    /// File was recognized but could not be decoded
    CorruptFile(String),
}

impl AnalysisError {
    /// True for mistakes the caller can fix by changing the configuration
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, AnalysisError::InvalidConfiguration(_))
    }

    /// True for problems with the audio itself (silent, too short, unreadable)
    pub fn is_data_error(&self) -> bool {
        !self.is_configuration_error()
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::EmptyInput(msg) => write!(f, "Empty input: {}", msg),
            AnalysisError::InvalidConfiguration(msg) => {
                write!(f, "Invalid configuration: {}", msg)
            }
            AnalysisError::NoOnsetsDetected(msg) => write!(f, "No onsets detected: {}", msg),
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnalysisError::FileNotFound(msg) => write!(f, "File not found: {}", msg),
            AnalysisError::UnsupportedFormat(msg) => write!(f, "Unsupported format: {}", msg),
            AnalysisError::CorruptFile(msg) => write!(f, "Corrupt file: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}
