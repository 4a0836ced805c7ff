//! Recording façade — capture session producing WAV clips on disk.
//!
//! # Architecture
//!
//! ```text
//! cpal stream (main thread)
//!     │ AudioChunk (mpsc)
//!     ▼
//! chunk-feeder thread ──▶ SharedSampleSink (16 kHz mono, active flag)
//!                              ▲
//!                              │ start / stop
//!                        MicRecorder ──▶ clip-<epoch-ms>.wav (hound)
//! ```
//!
//! [`Recorder`] is the object-safe interface the session controller holds
//! behind an `Arc<dyn Recorder>`; [`MicRecorder`] is the production
//! implementation, `MockRecorder` the test double.

pub mod mic;
pub mod wav;

use std::path::PathBuf;

use thiserror::Error;

pub use mic::{new_sample_sink, spawn_chunk_feeder, MicRecorder, SampleSink, SharedSampleSink};
pub use wav::{read_clip, write_clip, WavError};

// ---------------------------------------------------------------------------
// RecordedClip
// ---------------------------------------------------------------------------

/// One finished recording: the WAV file on disk and its length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedClip {
    /// Path of the written WAV file.
    pub path: PathBuf,
    /// Clip length in milliseconds, derived from the sample count.
    pub duration_millis: u64,
}

// ---------------------------------------------------------------------------
// RecorderError
// ---------------------------------------------------------------------------

/// All errors that can arise from the recording subsystem.
#[derive(Debug, Error)]
pub enum RecorderError {
    /// `start` was called while a recording is already active.
    #[error("a recording is already in progress")]
    AlreadyRecording,

    /// `stop` was called with no active recording.
    #[error("no recording in progress")]
    NotRecording,

    /// The capture produced zero samples (no input device delivering audio).
    #[error("no audio was captured")]
    EmptyCapture,

    /// Filesystem error while resolving the recordings directory.
    #[error("recordings directory error: {0}")]
    Io(#[from] std::io::Error),

    /// WAV encoding failed.
    #[error(transparent)]
    Wav(#[from] WavError),
}

// ---------------------------------------------------------------------------
// Recorder trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for audio capture sessions.
///
/// One active session at a time; `stop` hands back the [`RecordedClip`]
/// whose path becomes the playback and transcription source.
pub trait Recorder: Send + Sync {
    /// Configure the recorder for capturing (resolve output directory,
    /// log the device configuration).  Idempotent.
    fn prepare(&self) -> Result<(), RecorderError>;

    /// Begin a new capture session.
    fn start(&self) -> Result<(), RecorderError>;

    /// End the active session and write the captured audio to disk.
    fn stop(&self) -> Result<RecordedClip, RecorderError>;

    /// Whether a capture session is currently active.
    fn is_recording(&self) -> bool;

    /// Length of the audio captured so far, in milliseconds.
    fn duration_millis(&self) -> u64;
}

// Compile-time assertion: Box<dyn Recorder> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn Recorder>) {}
};

// ---------------------------------------------------------------------------
// MockRecorder  (test-only)
// ---------------------------------------------------------------------------

/// Test double that tracks calls and fabricates clips without touching the
/// audio host or the filesystem.
#[cfg(test)]
pub struct MockRecorder {
    inner: std::sync::Mutex<MockRecorderInner>,
    /// Duration reported for every fabricated clip.
    clip_duration_millis: u64,
    /// When `true`, `start` fails with a fabricated device error.
    fail_start: bool,
}

#[cfg(test)]
#[derive(Default)]
struct MockRecorderInner {
    recording: bool,
    clips_produced: u32,
    prepare_calls: u32,
}

#[cfg(test)]
impl MockRecorder {
    /// A recorder whose clips are all `clip_duration_millis` long.
    pub fn new(clip_duration_millis: u64) -> Self {
        Self {
            inner: std::sync::Mutex::new(MockRecorderInner::default()),
            clip_duration_millis,
            fail_start: false,
        }
    }

    /// A recorder whose `start` always fails.
    pub fn failing_start() -> Self {
        Self {
            inner: std::sync::Mutex::new(MockRecorderInner::default()),
            clip_duration_millis: 0,
            fail_start: true,
        }
    }

    /// Number of clips this mock has produced via `stop`.
    pub fn clips_produced(&self) -> u32 {
        self.inner.lock().unwrap().clips_produced
    }

    /// Number of times `prepare` was called.
    pub fn prepare_calls(&self) -> u32 {
        self.inner.lock().unwrap().prepare_calls
    }
}

#[cfg(test)]
impl Recorder for MockRecorder {
    fn prepare(&self) -> Result<(), RecorderError> {
        self.inner.lock().unwrap().prepare_calls += 1;
        Ok(())
    }

    fn start(&self) -> Result<(), RecorderError> {
        if self.fail_start {
            return Err(RecorderError::Io(std::io::Error::other(
                "input device unavailable",
            )));
        }
        let mut inner = self.inner.lock().unwrap();
        if inner.recording {
            return Err(RecorderError::AlreadyRecording);
        }
        inner.recording = true;
        Ok(())
    }

    fn stop(&self) -> Result<RecordedClip, RecorderError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.recording {
            return Err(RecorderError::NotRecording);
        }
        inner.recording = false;
        inner.clips_produced += 1;
        Ok(RecordedClip {
            path: PathBuf::from(format!("/tmp/mock-clip-{}.wav", inner.clips_produced)),
            duration_millis: self.clip_duration_millis,
        })
    }

    fn is_recording(&self) -> bool {
        self.inner.lock().unwrap().recording
    }

    fn duration_millis(&self) -> u64 {
        if self.is_recording() {
            0
        } else {
            self.clip_duration_millis
        }
    }
}
