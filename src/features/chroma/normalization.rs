//! Chroma normalization strategies

use serde::{Deserialize, Serialize};

const EPSILON: f32 = 1e-10;

/// Per-frame chroma normalization
///
/// Normalizing makes the pitch-class *distribution* comparable across frames of
/// different loudness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChromaNorm {
    /// Keep raw summed energy
    None,
    /// Scale so the strongest pitch class is 1.0
    Max,
    /// Scale to unit Euclidean length
    L2,
}

/// Normalize one chroma vector in place
///
/// Frames with no energy are left at zero.
pub fn normalize_frame(chroma: &mut [f32], norm: ChromaNorm) {
    let scale = match norm {
        ChromaNorm::None => return,
        ChromaNorm::Max => chroma.iter().copied().fold(0.0f32, f32::max),
        ChromaNorm::L2 => chroma.iter().map(|x| x * x).sum::<f32>().sqrt(),
    };
    if scale > EPSILON {
        for value in chroma.iter_mut() {
            *value /= scale;
        }
    }
}

/// Normalize every frame of a chroma matrix
pub fn normalize_chroma(chroma_vectors: &mut [Vec<f32>], norm: ChromaNorm) {
    log::debug!(
        "Normalizing {} chroma vectors ({:?})",
        chroma_vectors.len(),
        norm
    );
    for frame in chroma_vectors.iter_mut() {
        normalize_frame(frame, norm);
    }
}
