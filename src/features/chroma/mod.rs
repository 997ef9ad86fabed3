//! Chroma extraction modules
//!
//! Extract pitch-class distribution (12 semitones) from a power spectrogram:
//! - Bin to pitch-class folding
//! - Normalization strategies
//! - Temporal smoothing

pub mod extractor;
pub mod normalization;
pub mod smoothing;
