//! Analysis window functions

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Window applied to each frame before the FFT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowFunction {
    /// Periodic Hann (the usual choice for overlapped STFT)
    Hann,
    /// Periodic Hamming
    Hamming,
    /// No tapering
    Rectangular,
}

impl WindowFunction {
    /// Window coefficients of length `size`
    ///
    /// Periodic (DFT-even) variants are used so that Hann at `hop = size/4`
    /// overlap-adds to a constant.
    pub fn coefficients(&self, size: usize) -> Vec<f32> {
        if size <= 1 {
            return vec![1.0; size];
        }
        let n = size as f32;
        (0..size)
            .map(|i| {
                let phase = 2.0 * PI * i as f32 / n;
                match self {
                    WindowFunction::Hann => 0.5 - 0.5 * phase.cos(),
                    WindowFunction::Hamming => 0.54 - 0.46 * phase.cos(),
                    WindowFunction::Rectangular => 1.0,
                }
            })
            .collect()
    }
}
