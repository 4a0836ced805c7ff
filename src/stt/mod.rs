//! Transcription façade — on-device speech-to-text via whisper-rs.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │            TranscriptionEngine (trait)              │
//! │                                                    │
//! │   ┌─────────────┐    ┌──────────────┐             │
//! │   │  ModelPaths  │    │ WhisperEngine│             │
//! │   │ - resolve    │───▶│ - ctx        │             │
//! │   │ - exists?    │    │ - params     │             │
//! │   └─────────────┘    └──────┬───────┘             │
//! │                              │                     │
//! │                              ▼                     │
//! │                    ┌──────────────────┐            │
//! │                    │  transcribe()    │            │
//! │                    │  WAV clip → text │            │
//! │                    └──────────────────┘            │
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use voicenote::stt::{WhisperEngine, TranscribeParams, TranscriptionEngine};
//!
//! let params = TranscribeParams::default(); // language = "en"
//! let engine = WhisperEngine::load("models/ggml-tiny-q8_0.bin", params)
//!     .expect("model file not found");
//!
//! let text = engine.transcribe("recordings/clip-1.wav".as_ref()).unwrap();
//! println!("{text}");
//! ```

pub mod engine;
pub mod model;
pub mod transcribe;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use engine::{SttError, TranscriptionEngine, WhisperEngine};
pub use model::ModelPaths;
pub use transcribe::{TranscribeParams, Transcript};

// test-only re-export so the session test module can import the mock
// without `use voicenote::stt::engine::MockTranscriptionEngine`.
#[cfg(test)]
pub use engine::MockTranscriptionEngine;
