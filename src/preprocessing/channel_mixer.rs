//! Channel mixing utilities (multi-channel to mono conversion)

use crate::error::AnalysisError;

/// Convert interleaved samples to mono by averaging the channels of each frame
///
/// # Arguments
///
/// * `samples` - Interleaved samples (`frame0_ch0, frame0_ch1, ...`)
/// * `channels` - Number of interleaved channels
///
/// # Returns
///
/// One sample per frame; a trailing partial frame is dropped.
///
/// # Errors
///
/// `InvalidInput` if `channels` is 0.
pub fn downmix_interleaved(samples: &[f32], channels: usize) -> Result<Vec<f32>, AnalysisError> {
    if channels == 0 {
        return Err(AnalysisError::InvalidInput("Channel count must be > 0".to_string()));
    }
    if channels == 1 {
        return Ok(samples.to_vec());
    }

    log::debug!(
        "Downmixing {} frames of {} channels",
        samples.len() / channels,
        channels
    );

    Ok(samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_downmix() {
        let interleaved = vec![1.0, 0.0, 0.5, 0.5, -1.0, 1.0];
        let mono = downmix_interleaved(&interleaved, 2).unwrap();
        assert_eq!(mono, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_multichannel_downmix() {
        let interleaved = vec![0.3, 0.6, 0.9, -0.3, 0.0, 0.3];
        let mono = downmix_interleaved(&interleaved, 3).unwrap();
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.6).abs() < 1e-6);
        assert!(mono[1].abs() < 1e-6);
    }

    #[test]
    fn test_mono_passthrough_and_partial_frame() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(downmix_interleaved(&samples, 1).unwrap(), samples);
        // Trailing sample does not form a full stereo frame
        let mono = downmix_interleaved(&samples, 2).unwrap();
        assert_eq!(mono.len(), 1);
    }

    #[test]
    fn test_zero_channels() {
        assert!(downmix_interleaved(&[0.0], 0).is_err());
    }
}
