//! Adaptive thresholding for onset peak picking
//!
//! Median + MAD (Median Absolute Deviation) as recommended by McFee & Ellis
//! (2014); robust to the few very strong onsets that would inflate a
//! mean-based threshold.

use crate::error::AnalysisError;

/// Median of a slice (mean of the two middle values for even lengths)
pub fn median(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) * 0.5
    } else {
        sorted[mid]
    })
}

/// Compute adaptive threshold using median + MAD
///
/// `threshold = median(values) + k * MAD(values)`, with
/// `MAD = median(|values - median(values)|)`.
///
/// # Reference
///
/// McFee, B., & Ellis, D. P. W. (2014). Better Beat Tracking Through Robust Onset Aggregation.
/// *Proceedings of the International Society for Music Information Retrieval Conference*.
///
/// # Errors
///
/// Returns `AnalysisError` if values are empty or `k` is negative
pub fn adaptive_threshold_median_mad(values: &[f32], k: f32) -> Result<f32, AnalysisError> {
    let centre = median(values).ok_or_else(|| {
        AnalysisError::EmptyInput("Empty values for threshold calculation".to_string())
    })?;

    if k < 0.0 {
        return Err(AnalysisError::InvalidConfiguration(
            "MAD multiplier k must be non-negative".to_string(),
        ));
    }

    let deviations: Vec<f32> = values.iter().map(|&v| (v - centre).abs()).collect();
    let mad = median(&deviations).unwrap_or(0.0);

    Ok(centre + k * mad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_adaptive_threshold_median_mad_basic() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 100.0]; // Outlier at 100
        let threshold = adaptive_threshold_median_mad(&values, 2.5).unwrap();

        // Median 3.5, MAD 1.5: threshold ignores the outlier
        assert!((threshold - 7.25).abs() < 1e-5);
    }

    #[test]
    fn test_adaptive_threshold_median_mad_empty() {
        assert!(adaptive_threshold_median_mad(&[], 2.5).is_err());
    }

    #[test]
    fn test_adaptive_threshold_median_mad_single_value() {
        let threshold = adaptive_threshold_median_mad(&[5.0], 2.5).unwrap();
        assert_eq!(threshold, 5.0); // MAD of single value is 0
    }

    #[test]
    fn test_negative_multiplier_rejected() {
        assert!(adaptive_threshold_median_mad(&[1.0, 2.0], -1.0).is_err());
    }
}
