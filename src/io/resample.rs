//! Sample-rate conversion
//!
//! Band-limited sinc interpolation via `rubato`. The anti-alias filter cuts
//! off just below the lower of the two Nyquist frequencies, so content above
//! the target Nyquist is attenuated instead of folding into the analysis band.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::AnalysisError;

/// Input frames fed to the resampler per call
const CHUNK_SIZE: usize = 4096;

fn interpolation_parameters() -> SincInterpolationParameters {
    SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    }
}

/// Resample mono `samples` from `from_rate` to `to_rate`
///
/// Output length is `round(len * to_rate / from_rate)` and the filter delay is
/// removed, so output sample `i` lines up with input time `i / to_rate`.
/// Equal rates return a copy.
///
/// # Errors
///
/// - `InvalidConfiguration` if either rate is 0 or the resampler rejects the ratio
/// - `InvalidInput` if resampling fails mid-stream
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AnalysisError> {
    if from_rate == 0 || to_rate == 0 {
        return Err(AnalysisError::InvalidConfiguration(format!(
            "Sample rates must be > 0 (got {} -> {})",
            from_rate, to_rate
        )));
    }
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let expected = ((samples.len() as f64) * ratio).round().max(1.0) as usize;

    log::debug!(
        "Resampling {} samples: {} Hz -> {} Hz ({} samples)",
        samples.len(),
        from_rate,
        to_rate,
        expected
    );

    let mut resampler =
        SincFixedIn::<f32>::new(ratio, 2.0, interpolation_parameters(), CHUNK_SIZE, 1)
            .map_err(|e| {
                AnalysisError::InvalidConfiguration(format!(
                    "Cannot resample {} Hz -> {} Hz: {}",
                    from_rate, to_rate, e
                ))
            })?;
    let delay = resampler.output_delay();
    let failed =
        |e: rubato::ResampleError| AnalysisError::InvalidInput(format!("Resampling failed: {}", e));

    let mut output: Vec<f32> = Vec::with_capacity(expected + delay + CHUNK_SIZE);
    let mut chunks = samples.chunks_exact(CHUNK_SIZE);
    for chunk in &mut chunks {
        let out = resampler.process(&[chunk][..], None).map_err(failed)?;
        output.extend_from_slice(&out[0]);
    }
    let rest = chunks.remainder();
    if !rest.is_empty() {
        let out = resampler
            .process_partial(Some(&[rest][..]), None)
            .map_err(failed)?;
        output.extend_from_slice(&out[0]);
    }

    // Flush the filter tail with silence until the delayed signal is complete
    while output.len() < expected + delay {
        let out = resampler
            .process_partial::<&[f32]>(None, None)
            .map_err(failed)?;
        if out[0].is_empty() {
            break;
        }
        output.extend_from_slice(&out[0]);
    }

    output.drain(..delay.min(output.len()));
    output.resize(expected, 0.0);
    Ok(output)
}
