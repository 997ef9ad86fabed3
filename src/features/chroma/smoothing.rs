//! Temporal chroma smoothing

/// Smooth chroma vectors over time with a centred moving average
///
/// # Arguments
///
/// * `chroma_vectors` - Vector of 12-element chroma vectors
/// * `window_size` - Smoothing window size in frames (1 or 0 = no smoothing)
///
/// # Returns
///
/// Smoothed chroma vectors; near the edges the window is truncated.
pub fn smooth_chroma(chroma_vectors: &[Vec<f32>], window_size: usize) -> Vec<Vec<f32>> {
    if window_size <= 1 || chroma_vectors.len() < 2 {
        return chroma_vectors.to_vec();
    }
    log::debug!(
        "Smoothing {} chroma vectors with window size {}",
        chroma_vectors.len(),
        window_size
    );

    let n = chroma_vectors.len();
    let half = window_size / 2;
    (0..n)
        .map(|t| {
            let start = t.saturating_sub(half);
            let end = (t + window_size - half).min(n);
            let width = chroma_vectors[t].len();
            let mut sum = vec![0.0f32; width];
            for frame in &chroma_vectors[start..end] {
                for (acc, &x) in sum.iter_mut().zip(frame.iter()) {
                    *acc += x;
                }
            }
            let count = (end - start) as f32;
            sum.iter().map(|x| x / count).collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_one_is_identity() {
        let frames = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        assert_eq!(smooth_chroma(&frames, 1), frames);
    }

    #[test]
    fn test_moving_average() {
        let frames = vec![vec![0.0], vec![3.0], vec![0.0], vec![3.0]];
        let smoothed = smooth_chroma(&frames, 3);
        assert_eq!(smoothed.len(), 4);
        assert!((smoothed[0][0] - 1.5).abs() < 1e-6); // frames 0..2
        assert!((smoothed[1][0] - 1.0).abs() < 1e-6); // frames 0..3
        assert!((smoothed[2][0] - 2.0).abs() < 1e-6); // frames 1..4
        assert!((smoothed[3][0] - 1.5).abs() < 1e-6); // frames 2..4
    }
}
