//! Playback façade — play/pause of the most recent recorded clip.
//!
//! [`Player`] is the object-safe interface the session controller holds
//! behind an `Arc<dyn Player>`.  [`ClipPlayer`] is the production
//! implementation: `replace` decodes a WAV clip into memory, `play` spawns a
//! short-lived thread that owns the cpal output stream (`cpal::Stream` is not
//! `Send`, so it never leaves that thread), and `pause` just clears the
//! shared playing flag — the playback thread notices and tears the stream
//! down, keeping the resume position in a shared atomic.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

use crate::audio::resample_linear;
use crate::recorder::{read_clip, WavError};

// ---------------------------------------------------------------------------
// PlayerError
// ---------------------------------------------------------------------------

/// Errors raised by the playback subsystem.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// `play` was called before any clip was loaded via `replace`.
    #[error("no clip loaded")]
    NoSource,

    /// The clip file could not be decoded.
    #[error(transparent)]
    Decode(#[from] WavError),

    /// No output device is available on the default audio host.
    #[error("no output device found on the default audio host")]
    NoDevice,

    /// The platform rejected the output stream configuration.
    #[error("failed to open output stream: {0}")]
    Stream(String),
}

// ---------------------------------------------------------------------------
// Player trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for clip playback.
///
/// The source is always replaced before playing, so the audible clip is
/// always the most recent recording.
pub trait Player: Send + Sync {
    /// Load `source` as the clip to play, resetting the playback position.
    ///
    /// If a clip is currently playing it is stopped first.
    fn replace(&self, source: &Path) -> Result<(), PlayerError>;

    /// Start (or resume) playing the loaded clip.  No-op when already
    /// playing.
    fn play(&self) -> Result<(), PlayerError>;

    /// Pause playback, keeping the position for a later `play`.
    fn pause(&self);

    /// Whether the clip is currently audible.
    fn is_playing(&self) -> bool;

    /// Path of the currently loaded clip, if any.
    fn source(&self) -> Option<PathBuf>;
}

// Compile-time assertion: Box<dyn Player> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn Player>) {}
};

// ---------------------------------------------------------------------------
// ClipPlayer
// ---------------------------------------------------------------------------

/// Production [`Player`] backed by a cpal output stream.
pub struct ClipPlayer {
    inner: Mutex<ClipPlayerInner>,
    /// Set while a playback thread is feeding the output stream.
    playing: Arc<AtomicBool>,
    /// Resume position in clip samples, written by the playback thread when
    /// it exits.
    position: Arc<AtomicUsize>,
    /// Bumped by every `replace`.  An exiting playback thread only writes
    /// its resume position back when the generation it started under is
    /// still current, so a stale thread cannot clobber the reset position
    /// of a freshly loaded clip.
    generation: Arc<AtomicUsize>,
}

struct ClipPlayerInner {
    source: Option<PathBuf>,
    /// Decoded mono samples at `sample_rate`.
    samples: Arc<Vec<f32>>,
    sample_rate: u32,
}

impl ClipPlayer {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ClipPlayerInner {
                source: None,
                samples: Arc::new(Vec::new()),
                sample_rate: crate::audio::TARGET_SAMPLE_RATE,
            }),
            playing: Arc::new(AtomicBool::new(false)),
            position: Arc::new(AtomicUsize::new(0)),
            generation: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Default for ClipPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Player for ClipPlayer {
    fn replace(&self, source: &Path) -> Result<(), PlayerError> {
        // Invalidate any in-flight playback thread, then stop it.
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.playing.store(false, Ordering::SeqCst);

        let (samples, sample_rate) = read_clip(source)?;

        let mut inner = self.inner.lock().unwrap();
        inner.source = Some(source.to_path_buf());
        inner.samples = Arc::new(samples);
        inner.sample_rate = sample_rate;
        self.position.store(0, Ordering::SeqCst);
        Ok(())
    }

    fn play(&self) -> Result<(), PlayerError> {
        if self.playing.load(Ordering::SeqCst) {
            return Ok(());
        }

        let (samples, sample_rate) = {
            let inner = self.inner.lock().unwrap();
            if inner.source.is_none() {
                return Err(PlayerError::NoSource);
            }
            (Arc::clone(&inner.samples), inner.sample_rate)
        };

        // Restart from the top after the clip ran to completion.
        let mut start = self.position.load(Ordering::SeqCst);
        if start >= samples.len() {
            start = 0;
            self.position.store(0, Ordering::SeqCst);
        }

        self.playing.store(true, Ordering::SeqCst);

        let playing = Arc::clone(&self.playing);
        let position = Arc::clone(&self.position);
        let generation = Arc::clone(&self.generation);
        let generation_at_start = generation.load(Ordering::SeqCst);

        // The cpal output stream must live on the thread that created it.
        std::thread::Builder::new()
            .name("clip-playback".into())
            .spawn(move || {
                match run_playback(samples, sample_rate, &playing, start) {
                    Ok(resume) => store_resume_if_current(
                        &position,
                        &generation,
                        generation_at_start,
                        resume,
                    ),
                    Err(e) => log::warn!("clip playback failed: {e}"),
                }
                playing.store(false, Ordering::SeqCst);
            })
            .map_err(|e| PlayerError::Stream(e.to_string()))?;

        Ok(())
    }

    fn pause(&self) {
        self.playing.store(false, Ordering::SeqCst);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    fn source(&self) -> Option<PathBuf> {
        self.inner.lock().unwrap().source.clone()
    }
}

/// Write the resume position back only when no `replace` happened since the
/// playback thread started.  A stale thread draining its last callback must
/// not overwrite the fresh clip's reset position.
fn store_resume_if_current(
    position: &AtomicUsize,
    generation: &AtomicUsize,
    generation_at_start: usize,
    resume: usize,
) {
    if generation.load(Ordering::SeqCst) == generation_at_start {
        position.store(resume, Ordering::SeqCst);
    }
}

/// Body of the playback thread: open the default output device, feed it the
/// clip (resampled to the device rate) from `start` (clip samples), and
/// return the resume position when the clip ends or `playing` is cleared.
fn run_playback(
    samples: Arc<Vec<f32>>,
    clip_rate: u32,
    playing: &Arc<AtomicBool>,
    start: usize,
) -> Result<usize, PlayerError> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(PlayerError::NoDevice)?;
    let config = device
        .default_output_config()
        .map_err(|e| PlayerError::Stream(e.to_string()))?;

    let device_rate = config.sample_rate().0;
    let channels = config.channels() as usize;

    // Resample the whole clip up front; clips are short (≤ 60 s).
    let buffer = Arc::new(resample_linear(&samples, clip_rate, device_rate));
    let total = buffer.len();

    // Translate the clip-sample start position into device-rate frames.
    let start_frame = start as u64 * device_rate as u64 / clip_rate.max(1) as u64;
    let frame_idx = Arc::new(AtomicUsize::new(start_frame as usize));

    let cb_buffer = Arc::clone(&buffer);
    let cb_frame = Arc::clone(&frame_idx);
    let cb_playing = Arc::clone(playing);

    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut idx = cb_frame.load(Ordering::Relaxed);
                for frame in data.chunks_mut(channels) {
                    let value = if cb_playing.load(Ordering::Relaxed) && idx < total {
                        let v = cb_buffer[idx];
                        idx += 1;
                        v
                    } else {
                        0.0
                    };
                    for sample in frame.iter_mut() {
                        *sample = value;
                    }
                }
                cb_frame.store(idx, Ordering::Relaxed);
            },
            |err| log::error!("audio output error: {err}"),
            None,
        )
        .map_err(|e| PlayerError::Stream(e.to_string()))?;

    stream.play().map_err(|e| PlayerError::Stream(e.to_string()))?;

    // Wait for pause or end-of-clip, then tear the stream down.
    while playing.load(Ordering::SeqCst) && frame_idx.load(Ordering::SeqCst) < total {
        std::thread::sleep(std::time::Duration::from_millis(20));
    }
    drop(stream);

    // Hand the resume point back in clip-sample units.
    let resume = frame_idx.load(Ordering::SeqCst) as u64 * clip_rate as u64
        / device_rate.max(1) as u64;
    Ok(resume.min(samples.len() as u64) as usize)
}

// ---------------------------------------------------------------------------
// MockPlayer  (test-only)
// ---------------------------------------------------------------------------

/// Test double that tracks the loaded source and playing flag without
/// touching the audio host.
#[cfg(test)]
pub struct MockPlayer {
    inner: Mutex<MockPlayerInner>,
}

#[cfg(test)]
#[derive(Default)]
struct MockPlayerInner {
    source: Option<PathBuf>,
    playing: bool,
    replace_calls: u32,
    play_calls: u32,
}

#[cfg(test)]
impl MockPlayer {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MockPlayerInner::default()),
        }
    }

    pub fn replace_calls(&self) -> u32 {
        self.inner.lock().unwrap().replace_calls
    }

    pub fn play_calls(&self) -> u32 {
        self.inner.lock().unwrap().play_calls
    }

    /// Simulate the clip running to its natural end: playback stops without
    /// anyone calling `pause`.
    pub fn finish_playback(&self) {
        self.inner.lock().unwrap().playing = false;
    }
}

#[cfg(test)]
impl Player for MockPlayer {
    fn replace(&self, source: &Path) -> Result<(), PlayerError> {
        let mut inner = self.inner.lock().unwrap();
        inner.source = Some(source.to_path_buf());
        inner.playing = false;
        inner.replace_calls += 1;
        Ok(())
    }

    fn play(&self) -> Result<(), PlayerError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.source.is_none() {
            return Err(PlayerError::NoSource);
        }
        inner.playing = true;
        inner.play_calls += 1;
        Ok(())
    }

    fn pause(&self) {
        self.inner.lock().unwrap().playing = false;
    }

    fn is_playing(&self) -> bool {
        self.inner.lock().unwrap().playing
    }

    fn source(&self) -> Option<PathBuf> {
        self.inner.lock().unwrap().source.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn clip_player_starts_with_no_source() {
        let player = ClipPlayer::new();
        assert!(player.source().is_none());
        assert!(!player.is_playing());
    }

    #[test]
    fn play_without_source_is_no_source_error() {
        let player = ClipPlayer::new();
        assert!(matches!(player.play().unwrap_err(), PlayerError::NoSource));
        assert!(!player.is_playing());
    }

    #[test]
    fn replace_loads_clip_and_resets_position() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("clip.wav");
        crate::recorder::write_clip(&path, &vec![0.1_f32; 1_600], 16_000).expect("write");

        let player = ClipPlayer::new();
        player.replace(&path).expect("replace");

        assert_eq!(player.source().as_deref(), Some(path.as_path()));
        assert!(!player.is_playing());
    }

    #[test]
    fn replace_missing_file_errors() {
        let player = ClipPlayer::new();
        let err = player.replace(Path::new("/nonexistent/clip.wav")).unwrap_err();
        assert!(matches!(err, PlayerError::Decode(_)));
        assert!(player.source().is_none());
    }

    #[test]
    fn pause_clears_playing_flag() {
        let player = ClipPlayer::new();
        player.playing.store(true, Ordering::SeqCst);
        player.pause();
        assert!(!player.is_playing());
    }

    #[test]
    fn stale_thread_does_not_clobber_reset_position() {
        let position = AtomicUsize::new(0);
        let generation = AtomicUsize::new(1);

        // Thread started under generation 0; a replace has happened since.
        store_resume_if_current(&position, &generation, 0, 12_345);
        assert_eq!(position.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn current_thread_stores_resume_position() {
        let position = AtomicUsize::new(0);
        let generation = AtomicUsize::new(3);

        store_resume_if_current(&position, &generation, 3, 12_345);
        assert_eq!(position.load(Ordering::SeqCst), 12_345);
    }

    #[test]
    fn replace_bumps_generation() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("clip.wav");
        crate::recorder::write_clip(&path, &vec![0.1_f32; 1_600], 16_000).expect("write");

        let player = ClipPlayer::new();
        let before = player.generation.load(Ordering::SeqCst);
        player.replace(&path).expect("replace");
        assert_eq!(player.generation.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn mock_player_play_pause_cycle() {
        let player = MockPlayer::new();
        player.replace(Path::new("/tmp/clip.wav")).expect("replace");

        player.play().expect("play");
        assert!(player.is_playing());

        player.pause();
        assert!(!player.is_playing());

        player.play().expect("resume");
        assert!(player.is_playing());
        assert_eq!(player.play_calls(), 2);
    }
}
