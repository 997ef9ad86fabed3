//! Mel-scale energy and cepstral coefficients
//!
//! - Mel filterbank projection of power spectra
//! - Log-mel DCT (MFCC)

pub mod filterbank;
pub mod mfcc;
