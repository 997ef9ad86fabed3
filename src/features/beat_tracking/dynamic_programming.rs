//! Dynamic programming beat tracker
//!
//! Places beats where onset strength is high while keeping consecutive beats
//! close to the global beat period.
//!
//! # Algorithm
//!
//! 1. Normalize the onset curve by its standard deviation
//! 2. Local score: convolve with a Gaussian of width `period / 32`
//! 3. For each frame `i`, choose the best predecessor `j` in
//!    `[i - 2·period, i - period/2]`, maximizing
//!    `cumulative[j] - tightness · ln((i - j) / period)²`
//! 4. Backtrack from the frame with the highest cumulative score
//! 5. Optionally trim weak leading and trailing beats
//!
//! Frames before the onset curve first becomes active never serve as
//! predecessors, so the first beat lands on the earliest strong onset instead
//! of on leading silence.
//!
//! # Reference
//!
//! Ellis, D. P. W. (2007). Beat Tracking by Dynamic Programming.
//! *Journal of New Music Research*, 36(1), 51-60.
//!
//! # Example
//!
//! ```no_run
//! use sonance_dsp::features::beat_tracking::dynamic_programming::DpBeatTracker;
//!
//! let onset_curve: Vec<f32> = (0..1000).map(|t| if t % 22 == 0 { 1.0 } else { 0.0 }).collect();
//! let tracker = DpBeatTracker::new(120.0, 100.0, true);
//! let beats = tracker.track(&onset_curve, 22050, 512)?;
//! println!("{} beats", beats.len());
//! # Ok::<(), sonance_dsp::AnalysisError>(())
//! ```

use super::BeatSequence;
use crate::error::AnalysisError;
use crate::features::spectrum::frames_to_time;

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Gaussian width of the local score, as a fraction of the beat period
const LOCAL_SCORE_RESOLUTION: f32 = 32.0;

/// Fraction of the peak local score that counts as the first active frame
const FIRST_BEAT_THRESHOLD: f32 = 0.01;

/// Dynamic programming beat tracker
#[derive(Debug, Clone)]
pub struct DpBeatTracker {
    /// Global tempo in BPM
    pub tempo_bpm: f32,

    /// Penalty weight for deviating from the beat period (typical: 100)
    pub tightness: f32,

    /// Drop weak beats at the start and end
    pub trim: bool,
}

impl DpBeatTracker {
    /// Create a new beat tracker
    ///
    /// # Arguments
    ///
    /// * `tempo_bpm` - Global tempo estimate
    /// * `tightness` - Tempo-consistency weight; higher values keep beats closer to the period
    /// * `trim` - Remove weak leading/trailing beats
    pub fn new(tempo_bpm: f32, tightness: f32, trim: bool) -> Self {
        Self {
            tempo_bpm,
            tightness,
            trim,
        }
    }

    /// Track beats on an onset strength curve
    ///
    /// # Arguments
    ///
    /// * `onset_curve` - Onset strength (one value per frame)
    /// * `sample_rate` - Sample rate in Hz
    /// * `hop_length` - Hop used for the spectrogram
    ///
    /// # Returns
    ///
    /// Beats in strictly increasing frame order
    ///
    /// # Errors
    ///
    /// - `EmptyInput` for an empty curve
    /// - `InvalidConfiguration` for a non-positive tempo or tightness, or a
    ///   beat period shorter than one frame
    /// - `NoOnsetsDetected` if the curve has no energy or no variation
    pub fn track(
        &self,
        onset_curve: &[f32],
        sample_rate: u32,
        hop_length: usize,
    ) -> Result<BeatSequence, AnalysisError> {
        if onset_curve.is_empty() {
            return Err(AnalysisError::EmptyInput(
                "Cannot track beats on an empty onset curve".to_string(),
            ));
        }
        if !(self.tempo_bpm > 0.0 && self.tempo_bpm.is_finite()) {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "Tempo must be positive, got {:.2}",
                self.tempo_bpm
            )));
        }
        if self.tightness <= 0.0 {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "Tightness must be positive, got {:.2}",
                self.tightness
            )));
        }

        let period = 60.0 * sample_rate as f32 / (hop_length as f32 * self.tempo_bpm);
        if period < 1.0 {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "Beat period of {:.3} frames is shorter than one frame",
                period
            )));
        }

        log::debug!(
            "Tracking beats: {} frames, tempo={:.2} BPM, period={:.2} frames, tightness={:.1}",
            onset_curve.len(),
            self.tempo_bpm,
            period,
            self.tightness
        );

        let peak = onset_curve.iter().copied().fold(0.0f32, f32::max);
        if peak <= EPSILON {
            return Err(AnalysisError::NoOnsetsDetected(
                "Onset curve has no energy, no beats to track".to_string(),
            ));
        }

        let std = standard_deviation(onset_curve);
        if std <= EPSILON {
            return Err(AnalysisError::NoOnsetsDetected(
                "Onset curve is constant, no beats to track".to_string(),
            ));
        }

        let normalized: Vec<f32> = onset_curve.iter().map(|&v| v / std).collect();
        let local = local_score(&normalized, period);

        let (cumulative, backlink) = self.forward_pass(&local, period);

        let mut terminal = 0;
        for (i, &score) in cumulative.iter().enumerate() {
            if score > cumulative[terminal] {
                terminal = i;
            }
        }

        let mut frames = Vec::new();
        let mut cursor = Some(terminal);
        while let Some(frame) = cursor {
            frames.push(frame);
            cursor = backlink[frame];
        }
        frames.reverse();

        if self.trim {
            let before = frames.len();
            frames = trim_beats(&local, frames);
            log::debug!("Trimmed {} weak edge beats", before - frames.len());
        }

        let times = frames
            .iter()
            .map(|&f| frames_to_time(f, sample_rate, hop_length))
            .collect();

        log::debug!("Tracked {} beats", frames.len());

        Ok(BeatSequence { frames, times })
    }

    /// Cumulative scores and best-predecessor links for every frame
    fn forward_pass(&self, local: &[f32], period: f32) -> (Vec<f32>, Vec<Option<usize>>) {
        let n = local.len();
        let max_back = (2.0 * period).round() as usize;
        let min_back = ((period / 2.0).round() as usize).max(1);

        let threshold = FIRST_BEAT_THRESHOLD * local.iter().copied().fold(0.0f32, f32::max);

        let mut cumulative = vec![0.0f32; n];
        let mut backlink: Vec<Option<usize>> = vec![None; n];
        let mut first_active: Option<usize> = None;

        for i in 0..n {
            if first_active.is_none() && local[i] >= threshold {
                first_active = Some(i);
            }

            let mut best: Option<(usize, f32)> = None;
            if let (Some(first), Some(end)) = (first_active, i.checked_sub(min_back)) {
                let start = i.saturating_sub(max_back).max(first);
                for prev in start..=end {
                    let ratio = (i - prev) as f32 / period;
                    let penalty = self.tightness * ratio.ln().powi(2);
                    let candidate = cumulative[prev] - penalty;
                    if best.map_or(true, |(_, score)| candidate > score) {
                        best = Some((prev, candidate));
                    }
                }
            }

            cumulative[i] = local[i] + best.map_or(0.0, |(_, score)| score);
            backlink[i] = best.map(|(prev, _)| prev);
        }

        (cumulative, backlink)
    }
}

/// Sample standard deviation (population form for a single value)
fn standard_deviation(values: &[f32]) -> f32 {
    let n = values.len();
    let mean = values.iter().sum::<f32>() / n as f32;
    let sum_sq: f32 = values.iter().map(|&v| (v - mean) * (v - mean)).sum();
    let dof = if n > 1 { n - 1 } else { 1 };
    (sum_sq / dof as f32).sqrt()
}

/// Onset curve convolved with a Gaussian spanning one period on each side
fn local_score(onset: &[f32], period: f32) -> Vec<f32> {
    let radius = period.round() as isize;
    let sigma = period / LOCAL_SCORE_RESOLUTION;
    let kernel: Vec<f32> = (-radius..=radius)
        .map(|offset| {
            let z = offset as f32 / sigma;
            (-0.5 * z * z).exp()
        })
        .collect();

    let n = onset.len() as isize;
    (0..n)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .filter_map(|(j, &weight)| {
                    let source = i + j as isize - radius;
                    (0..n).contains(&source).then(|| onset[source as usize] * weight)
                })
                .sum()
        })
        .collect()
}

/// Drop leading and trailing beats whose local score falls below half the
/// RMS local score of all beats
fn trim_beats(local: &[f32], frames: Vec<usize>) -> Vec<usize> {
    if frames.is_empty() {
        return frames;
    }

    let strengths: Vec<f32> = frames.iter().map(|&f| local[f]).collect();
    let rms = (strengths.iter().map(|s| s * s).sum::<f32>() / strengths.len() as f32).sqrt();
    let threshold = 0.5 * rms;

    let start = strengths.iter().position(|&s| s >= threshold);
    let end = strengths.iter().rposition(|&s| s >= threshold);

    match (start, end) {
        (Some(start), Some(end)) => frames[start..=end].to_vec(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Impulses every `period` frames starting at `offset`
    fn impulse_curve(period: usize, offset: usize, n_frames: usize) -> Vec<f32> {
        let mut curve = vec![0.0f32; n_frames];
        for t in (offset..n_frames).step_by(period) {
            curve[t] = 1.0;
        }
        curve
    }

    #[test]
    fn test_beats_land_on_impulses() {
        // 22050 / 512 * 60 / 20 frames -> ~129.2 BPM
        let curve = impulse_curve(20, 15, 400);
        let bpm = 60.0 * 22050.0 / (512.0 * 20.0);
        let tracker = DpBeatTracker::new(bpm, 100.0, true);
        let beats = tracker.track(&curve, 22050, 512).unwrap();

        let expected: Vec<usize> = (15..400).step_by(20).collect();
        assert_eq!(beats.frames, expected);
        assert_eq!(beats.times.len(), beats.frames.len());
        assert!((beats.times[0] - 15.0 * 512.0 / 22050.0).abs() < 1e-5);
    }

    #[test]
    fn test_beats_strictly_increasing() {
        let mut curve = impulse_curve(22, 10, 600);
        // Some off-beat clutter
        for t in (7..600).step_by(13) {
            curve[t] += 0.3;
        }
        let tracker = DpBeatTracker::new(120.0, 100.0, false);
        let beats = tracker.track(&curve, 22050, 512).unwrap();
        assert!(!beats.is_empty());
        assert!(beats.frames.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_first_beat_skips_leading_silence() {
        let curve = impulse_curve(20, 100, 500);
        let bpm = 60.0 * 22050.0 / (512.0 * 20.0);
        let beats = DpBeatTracker::new(bpm, 100.0, false)
            .track(&curve, 22050, 512)
            .unwrap();
        assert_eq!(beats.frames.first(), Some(&100));
    }

    #[test]
    fn test_silent_curve() {
        let tracker = DpBeatTracker::new(120.0, 100.0, true);
        let result = tracker.track(&vec![0.0; 300], 22050, 512);
        assert!(matches!(result, Err(AnalysisError::NoOnsetsDetected(_))));
    }

    #[test]
    fn test_invalid_parameters() {
        let curve = impulse_curve(20, 0, 100);
        assert!(matches!(
            DpBeatTracker::new(0.0, 100.0, true).track(&curve, 22050, 512),
            Err(AnalysisError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            DpBeatTracker::new(120.0, -1.0, true).track(&curve, 22050, 512),
            Err(AnalysisError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            DpBeatTracker::new(120.0, 100.0, true).track(&[], 22050, 512),
            Err(AnalysisError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_trim_removes_weak_edges() {
        let local = vec![0.1, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.05];
        let trimmed = trim_beats(&local, vec![0, 2, 4, 6, 8]);
        assert_eq!(trimmed, vec![2, 4, 6]);
    }

    #[test]
    fn test_local_score_peak_preserved() {
        let mut onset = vec![0.0f32; 50];
        onset[25] = 1.0;
        let local = local_score(&onset, 20.0);
        let argmax = local
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(argmax, 25);
    }
}
