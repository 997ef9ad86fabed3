//! Audio I/O modules
//!
//! Audio decoding using Symphonia and band-limited resampling to the analysis rate.

pub mod decoder;
pub mod resample;
