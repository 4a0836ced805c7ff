//! Session orchestration — the core of the app.
//!
//! [`SessionController`] consumes [`SessionCommand`]s from the UI and drives
//! the recorder, transcription engine, player, and permission gate through
//! one record → transcribe → playback cycle, publishing every observable
//! effect into [`SharedState`].

pub mod controller;
pub mod state;

pub use controller::{SessionCommand, SessionController};
pub use state::{
    format_duration, new_shared_state, PlaybackState, RecordingSession, SessionPhase,
    SessionState, SharedState, Transcription,
};
