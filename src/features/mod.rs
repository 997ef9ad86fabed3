//! Feature extraction modules
//!
//! This module contains all feature extraction algorithms:
//! - Spectral analysis (windowed STFT, power spectrogram)
//! - Mel filterbank and MFCC
//! - Chroma extraction
//! - Onset strength and onset events
//! - Period estimation (global tempo)
//! - Beat tracking (dynamic programming)
//! - Envelope descriptors (RMS, centroid, zero-crossing rate)

pub mod beat_tracking;
pub mod chroma;
pub mod envelope;
pub mod mel;
pub mod onset;
pub mod period;
pub mod spectrum;
