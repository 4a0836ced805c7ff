//! voicenote — record a voice memo, transcribe it on-device, play it back.
//!
//! # Architecture
//!
//! ```text
//! Microphone → cpal callback → AudioChunk (mpsc) → MicRecorder sink
//!                                                      │ stop()
//!                                                      ▼
//!                                              WAV clip on disk
//!                                                      │
//! SessionCommand (mpsc) ──▶ SessionController ──▶ WhisperEngine::transcribe
//!                                │                     │
//!                                ▼                     ▼
//!                    SharedState (Arc<Mutex<…>>)   transcript text
//!                                │
//!                                ▼
//!                    egui update() each frame  +  ClipPlayer (cpal output)
//! ```
//!
//! The crate is a library plus one binary (`main.rs`): the library holds the
//! façades ([`permission`], [`recorder`], [`player`], [`stt`]) and the
//! session core ([`session`]); the binary wires them together and runs the
//! egui shell ([`app`]).

pub mod app;
pub mod audio;
pub mod config;
pub mod permission;
pub mod player;
pub mod recorder;
pub mod session;
pub mod stt;
