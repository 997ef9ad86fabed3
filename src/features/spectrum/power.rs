//! Power and magnitude spectrograms

use super::{ComplexSpectrogram, Spectrogram};

/// Elementwise squared magnitude `|X|²`
pub fn power_spectrogram(stft: &ComplexSpectrogram) -> Spectrogram {
    map_bins(stft, |c| c.norm_sqr())
}

/// Elementwise magnitude `|X|`
pub fn magnitude_spectrogram(stft: &ComplexSpectrogram) -> Spectrogram {
    map_bins(stft, |c| c.norm())
}

fn map_bins(
    stft: &ComplexSpectrogram,
    f: impl Fn(&rustfft::num_complex::Complex<f32>) -> f32,
) -> Spectrogram {
    Spectrogram {
        frames: stft
            .frames
            .iter()
            .map(|frame| frame.iter().map(&f).collect())
            .collect(),
        sample_rate: stft.sample_rate,
        n_fft: stft.n_fft,
        hop_length: stft.hop_length,
    }
}

/// Total energy of a one-sided power spectrogram, counting mirrored bins twice
///
/// Bins `1..n_fft/2` stand for two bins of the full spectrum; DC and (for even
/// `n_fft`) Nyquist appear once.
pub fn one_sided_energy(power: &Spectrogram) -> f64 {
    let n_fft = power.n_fft;
    power
        .frames
        .iter()
        .map(|frame| {
            frame
                .iter()
                .enumerate()
                .map(|(k, &p)| {
                    let mirrored = k > 0 && !(n_fft % 2 == 0 && k == n_fft / 2);
                    if mirrored {
                        2.0 * p as f64
                    } else {
                        p as f64
                    }
                })
                .sum::<f64>()
        })
        .sum()
}
