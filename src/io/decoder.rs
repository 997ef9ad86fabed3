//! Audio decoding using Symphonia
//!
//! Probes the container, decodes the first audio track to interleaved `f32`,
//! downmixes to mono and resamples to the analysis sample rate.
//!
//! # Example
//!
//! ```no_run
//! use sonance_dsp::io::decoder::decode_file;
//!
//! let audio = decode_file("track.flac", 22050)?;
//! println!("{} samples at {} Hz", audio.samples.len(), audio.sample_rate);
//! # Ok::<(), sonance_dsp::AnalysisError>(())
//! ```

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::resample::resample;
use crate::error::AnalysisError;
use crate::preprocessing::channel_mixer::downmix_interleaved;

/// Decoded mono audio
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Mono samples at `sample_rate`
    pub samples: Vec<f32>,

    /// Sample rate of `samples` in Hz
    pub sample_rate: u32,

    /// Sample rate stored in the file
    pub source_sample_rate: u32,

    /// Channel count stored in the file
    pub source_channels: usize,
}

impl DecodedAudio {
    /// Duration in seconds
    pub fn duration_seconds(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Decode an audio file to mono samples at `target_sample_rate`
///
/// # Errors
///
/// - `FileNotFound` if the file cannot be opened
/// - `UnsupportedFormat` if no demuxer or codec handles the file
/// - `CorruptFile` if the stream fails mid-decode
/// - `EmptyInput` if the file decodes to zero samples
pub fn decode_file<P: AsRef<Path>>(
    path: P,
    target_sample_rate: u32,
) -> Result<DecodedAudio, AnalysisError> {
    let path = path.as_ref();
    log::debug!("Decoding audio file: {}", path.display());

    let file = File::open(path)
        .map_err(|e| AnalysisError::FileNotFound(format!("{}: {}", path.display(), e)))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| match e {
            SymphoniaError::Unsupported(what) => {
                AnalysisError::UnsupportedFormat(format!("{}: {}", path.display(), what))
            }
            other => AnalysisError::CorruptFile(format!("{}: {}", path.display(), other)),
        })?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| {
            AnalysisError::UnsupportedFormat(format!("{}: no audio track", path.display()))
        })?;

    let track_id = track.id;
    let channels = track.codec_params.channels.map_or(1, |c| c.count());
    let source_sample_rate = track.codec_params.sample_rate.ok_or_else(|| {
        AnalysisError::CorruptFile(format!("{}: unknown sample rate", path.display()))
    })?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AnalysisError::UnsupportedFormat(format!("{}: {}", path.display(), e)))?;

    let mut interleaved: Vec<f32> = Vec::new();
    let mut skipped_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(AnalysisError::CorruptFile(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(_)) => {
                skipped_packets += 1;
                continue;
            }
            Err(e) => {
                return Err(AnalysisError::CorruptFile(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let spec = *decoded.spec();
        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        interleaved.extend_from_slice(sample_buf.samples());
    }

    if skipped_packets > 0 {
        log::warn!(
            "{}: skipped {} undecodable packets",
            path.display(),
            skipped_packets
        );
    }

    let mono = downmix_interleaved(&interleaved, channels)?;
    if mono.is_empty() {
        return Err(AnalysisError::EmptyInput(format!(
            "{}: no audio samples decoded",
            path.display()
        )));
    }

    let samples = resample(&mono, source_sample_rate, target_sample_rate)?;

    log::info!(
        "Decoded audio: {} samples, {} Hz ({} ch @ {} Hz in file), {:.1}s",
        samples.len(),
        target_sample_rate,
        channels,
        source_sample_rate,
        samples.len() as f32 / target_sample_rate as f32
    );

    Ok(DecodedAudio {
        samples,
        sample_rate: target_sample_rate,
        source_sample_rate,
        source_channels: channels,
    })
}
