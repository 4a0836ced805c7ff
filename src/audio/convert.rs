//! Sample-format conversion: channel downmix and resampling.
//!
//! Recorded clips are stored as **16 kHz mono** WAV because that is the only
//! format the Whisper engine accepts.  Capture devices usually deliver
//! 44.1/48 kHz interleaved stereo, so every chunk goes through two steps:
//!
//! 1. [`downmix_to_mono`] — average interleaved channels into one.
//! 2. [`resample_to_16k`] — linear-interpolation resample to 16 000 Hz.

/// Target sample rate for stored clips and Whisper input (Hz).
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

// ---------------------------------------------------------------------------
// downmix_to_mono
// ---------------------------------------------------------------------------

/// Mix interleaved multi-channel audio down to a single channel.
///
/// Each output sample is the mean of one interleaved frame, so a full-scale
/// signal stays full-scale regardless of the channel count.  One frame per
/// `channels` input samples; a trailing partial frame is discarded.
///
/// Mono input is passed through untouched, and `channels == 0` (a degenerate
/// device report) yields an empty vector.
///
/// ```rust
/// use voicenote::audio::downmix_to_mono;
///
/// let quad = [0.8_f32, 0.4, 0.0, -0.4, 0.1, 0.1, 0.1, 0.1];
/// let mono = downmix_to_mono(&quad, 4);
/// assert_eq!(mono.len(), 2);
/// assert!((mono[0] - 0.2).abs() < 1e-6);
/// assert!((mono[1] - 0.1).abs() < 1e-6);
/// ```
pub fn downmix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels == 0 {
        return Vec::new();
    }
    if channels == 1 {
        return samples.to_vec();
    }

    let channels = channels as usize;
    let frames = samples.len() / channels;
    let scale = 1.0 / channels as f32;

    let mut mono = Vec::with_capacity(frames);
    for frame in 0..frames {
        let offset = frame * channels;
        let sum: f32 = samples[offset..offset + channels].iter().sum();
        mono.push(sum * scale);
    }
    mono
}

// ---------------------------------------------------------------------------
// resample_to_16k
// ---------------------------------------------------------------------------

/// Resample `samples` from `source_rate` Hz to 16 000 Hz.
///
/// Convenience wrapper over [`resample_linear`] for the capture path.
pub fn resample_to_16k(samples: &[f32], source_rate: u32) -> Vec<f32> {
    resample_linear(samples, source_rate, TARGET_SAMPLE_RATE)
}

/// Resample mono `samples` from `source_rate` to `target_rate` Hz using
/// linear interpolation.
///
/// * If the rates match the input is cloned and returned unchanged (no-op
///   fast path).
/// * If `samples` is empty an empty vector is returned.
///
/// The output length is approximately
/// `samples.len() * target_rate / source_rate`.
pub fn resample_linear(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if source_rate == target_rate {
        return samples.to_vec();
    }

    if samples.is_empty() {
        return Vec::new();
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 / ratio;
        let idx = src_pos as usize;
        let frac = src_pos - idx as f64;

        let sample = if idx + 1 < samples.len() {
            // Linear interpolation between adjacent samples
            samples[idx] * (1.0 - frac as f32) + samples[idx + 1] * frac as f32
        } else if idx < samples.len() {
            samples[idx]
        } else {
            0.0
        };

        output.push(sample);
    }

    output
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
