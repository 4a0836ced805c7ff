//! WAV clip encoding and decoding via `hound`.
//!
//! Clips are stored as mono 16-bit PCM.  [`write_clip`] converts the `f32`
//! capture samples to `i16`; [`read_clip`] converts back to `f32` and accepts
//! both integer and float WAV files so externally produced clips also play.

use std::path::Path;

use thiserror::Error;

use crate::audio::downmix_to_mono;

/// Errors raised while encoding or decoding a WAV clip.
#[derive(Debug, Error)]
pub enum WavError {
    #[error("WAV I/O failed: {0}")]
    Hound(#[from] hound::Error),

    #[error("unsupported WAV sample format: {bits} bit {format:?}")]
    UnsupportedFormat {
        bits: u16,
        format: hound::SampleFormat,
    },
}

/// Write mono `f32` samples in `[-1.0, 1.0]` to `path` as 16-bit PCM WAV.
pub fn write_clip(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), WavError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &s in samples {
        let clamped = s.clamp(-1.0, 1.0);
        writer.write_sample((clamped * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Read a WAV file into mono `f32` samples, returning `(samples, sample_rate)`.
///
/// Multi-channel files are downmixed to mono.  16-bit integer and 32-bit
/// float sample formats are accepted; anything else returns
/// [`WavError::UnsupportedFormat`].
pub fn read_clip(path: &Path) -> Result<(Vec<f32>, u32), WavError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
            .collect::<Result<_, _>>()?,
        (hound::SampleFormat::Float, 32) => {
            reader.samples::<f32>().collect::<Result<_, _>>()?
        }
        (format, bits) => return Err(WavError::UnsupportedFormat { bits, format }),
    };

    let mono = downmix_to_mono(&interleaved, spec.channels);
    Ok((mono, spec.sample_rate))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
