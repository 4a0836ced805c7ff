//! Core transcription engine trait and implementations.
//!
//! # Overview
//!
//! [`TranscriptionEngine`] is the public interface used by the session
//! controller.  It is object-safe and `Send + Sync` so it can be held behind
//! an `Arc<dyn TranscriptionEngine>`.
//!
//! [`WhisperEngine`] is the production implementation that wraps a
//! `whisper_rs::WhisperContext`.  Construct it with [`WhisperEngine::load`].
//!
//! `MockTranscriptionEngine` (available under `#[cfg(test)]`) is a stub that
//! returns a pre-configured response — useful for unit-testing the session
//! controller without a real GGML model file.

use std::path::Path;

use thiserror::Error;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio::{resample_to_16k, TARGET_SAMPLE_RATE};
use crate::recorder::{read_clip, WavError};
use crate::stt::transcribe::{TranscribeParams, Transcript};

// ---------------------------------------------------------------------------
// SttError
// ---------------------------------------------------------------------------

/// All errors that can arise from the transcription subsystem.
#[derive(Debug, Clone, Error)]
pub enum SttError {
    /// The GGML model file was not found at the given path.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// `whisper_rs` failed to initialise a `WhisperContext` or `WhisperState`.
    #[error("whisper context initialisation failed: {0}")]
    ContextInit(String),

    /// The clip file could not be read or decoded.
    #[error("failed to read clip: {0}")]
    ClipRead(String),

    /// An error occurred during the inference pass.
    #[error("transcription error: {0}")]
    Transcription(String),

    /// The clip is shorter than the minimum 0.5 s.
    #[error("clip too short — minimum 0.5 s of audio")]
    ClipTooShort,

    /// The clip exceeds the maximum 60 s.
    #[error("clip too long — maximum 60 s of audio")]
    ClipTooLong,
}

impl From<WavError> for SttError {
    fn from(e: WavError) -> Self {
        SttError::ClipRead(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// TranscriptionEngine trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for speech-to-text engines.
///
/// Implementations must be `Send + Sync` so that they can be held behind an
/// `Arc<dyn TranscriptionEngine>` and called from `spawn_blocking`.
///
/// # Contract
///
/// - `clip` is a WAV file on disk (any rate / channel count; it is converted
///   to 16 kHz mono before inference).
/// - Returns `Err(SttError::ClipTooShort)` for less than 0.5 s of audio.
/// - Returns `Err(SttError::ClipTooLong)` for more than 60 s of audio.
pub trait TranscriptionEngine: Send + Sync {
    /// Transcribe the WAV file at `clip` and return the transcript text.
    fn transcribe(&self, clip: &Path) -> Result<String, SttError>;
}

// Compile-time assertion: Box<dyn TranscriptionEngine> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn TranscriptionEngine>) {}
};

// ---------------------------------------------------------------------------
// Audio length constants (16 kHz mono f32)
// ---------------------------------------------------------------------------

/// Minimum clip length: 0.5 s × 16 000 Hz = 8 000 samples.
const MIN_CLIP_SAMPLES: usize = 8_000;
/// Maximum clip length: 60 s × 16 000 Hz = 960 000 samples.
const MAX_CLIP_SAMPLES: usize = 960_000;

// ---------------------------------------------------------------------------
// WhisperEngine
// ---------------------------------------------------------------------------

/// Production transcription engine that wraps a `whisper_rs::WhisperContext`.
///
/// A new `WhisperState` is created for every [`transcribe`] call so the
/// engine can be shared across threads without any locking.
///
/// [`transcribe`]: TranscriptionEngine::transcribe
pub struct WhisperEngine {
    ctx: WhisperContext,
    params: TranscribeParams,
}

impl std::fmt::Debug for WhisperEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperEngine")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

// `WhisperContext` holds a raw pointer internally but declares
// `unsafe impl Send` and `unsafe impl Sync` in whisper-rs — the model
// weights are read-only after loading.  `TranscribeParams` is fully owned
// and trivially Send+Sync.
// SAFETY: WhisperContext is Send+Sync as declared by whisper-rs.
unsafe impl Send for WhisperEngine {}
unsafe impl Sync for WhisperEngine {}

impl WhisperEngine {
    /// Load a GGML model from `model_path` and prepare it for inference.
    ///
    /// # Errors
    ///
    /// - [`SttError::ModelNotFound`] — `model_path` does not exist.
    /// - [`SttError::ContextInit`]  — whisper-rs failed to load the file.
    pub fn load(
        model_path: impl AsRef<Path>,
        params: TranscribeParams,
    ) -> Result<Self, SttError> {
        let path = model_path.as_ref();

        if !path.exists() {
            return Err(SttError::ModelNotFound(path.display().to_string()));
        }

        let path_str = path.to_str().ok_or_else(|| {
            SttError::ModelNotFound(format!(
                "model path contains non-UTF-8 characters: {}",
                path.display()
            ))
        })?;

        let ctx_params = WhisperContextParameters::default();
        let ctx = WhisperContext::new_with_params(path_str, ctx_params)
            .map_err(|e| SttError::ContextInit(e.to_string()))?;

        Ok(Self { ctx, params })
    }

    /// Transcribe the given clip and return a [`Transcript`] with inference
    /// timing.
    ///
    /// Prefer [`TranscriptionEngine::transcribe`] when only the text is
    /// needed.
    pub fn transcribe_clip(&self, clip: &Path) -> Result<Transcript, SttError> {
        // ── Decode + convert the clip ─────────────────────────────────────
        let (samples, rate) = read_clip(clip)?;
        let audio = if rate == TARGET_SAMPLE_RATE {
            samples
        } else {
            resample_to_16k(&samples, rate)
        };

        // ── Audio length guards ───────────────────────────────────────────
        if audio.len() < MIN_CLIP_SAMPLES {
            return Err(SttError::ClipTooShort);
        }
        if audio.len() > MAX_CLIP_SAMPLES {
            return Err(SttError::ClipTooLong);
        }

        // ── Build FullParams ──────────────────────────────────────────────
        let mut fp = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        // set_language takes an Option<&str> whose lifetime is tied to fp.
        // Both `fp` and the borrow of `self.params.language` remain alive
        // until state.full() returns, so the borrow is valid.
        let lang: Option<&str> = if self.params.language == "auto" {
            None
        } else {
            Some(self.params.language.as_str())
        };
        fp.set_language(lang);
        fp.set_n_threads(self.params.n_threads);

        if self.params.suppress_progress {
            fp.set_print_progress(false);
            fp.set_print_realtime(false);
        }

        // ── Create per-call state and run inference ───────────────────────
        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| SttError::ContextInit(e.to_string()))?;

        let wall_start = std::time::Instant::now();

        state
            .full(fp, &audio)
            .map_err(|e| SttError::Transcription(e.to_string()))?;

        // ── Collect segment text ──────────────────────────────────────────
        let n_segments = state
            .full_n_segments()
            .map_err(|e| SttError::Transcription(e.to_string()))?;

        let mut text = String::new();
        for i in 0..n_segments {
            let seg_text = state
                .full_get_segment_text(i)
                .map_err(|e| SttError::Transcription(format!("segment {i}: {e}")))?;
            text.push_str(&seg_text);
        }

        Ok(Transcript {
            text: text.trim().to_string(),
            inference_ms: wall_start.elapsed().as_millis(),
        })
    }
}

impl TranscriptionEngine for WhisperEngine {
    fn transcribe(&self, clip: &Path) -> Result<String, SttError> {
        self.transcribe_clip(clip).map(|t| t.text)
    }
}

// ---------------------------------------------------------------------------
// MockTranscriptionEngine  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured response without loading any
/// model file or reading the clip from disk.
#[cfg(test)]
pub struct MockTranscriptionEngine {
    response: Result<String, SttError>,
    calls: std::sync::Mutex<Vec<std::path::PathBuf>>,
}

#[cfg(test)]
impl MockTranscriptionEngine {
    /// Create a mock that always returns `Ok(text)`.
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            response: Ok(text.into()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that always returns `Err(error)`.
    pub fn err(error: SttError) -> Self {
        Self {
            response: Err(error),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Clip paths this mock has been asked to transcribe, in order.
    pub fn calls(&self) -> Vec<std::path::PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl TranscriptionEngine for MockTranscriptionEngine {
    fn transcribe(&self, clip: &Path) -> Result<String, SttError> {
        self.calls.lock().unwrap().push(clip.to_path_buf());
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
