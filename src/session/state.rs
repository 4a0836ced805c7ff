//! Session state machine and shared application state.
//!
//! [`SessionPhase`] drives the record → transcribe cycle.  The UI reads it
//! via [`SharedState`] to render the appropriate view.
//!
//! [`SessionState`] is the single source of truth for everything the UI
//! needs: permission flag, current recording, transcription progress,
//! playback state, and any pending alert.
//!
//! [`SharedState`] is a type alias for `Arc<Mutex<SessionState>>` — cheap to
//! clone and safe to share across threads.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// Phases of one record → transcribe cycle.
///
/// The state machine transitions are:
///
/// ```text
/// Idle ──toggle──▶ Recording ──toggle──▶ Transcribing
///                                          ├──engine ok──▶ Transcribed
///                                          └──engine err─▶ TranscriptionFailed
/// Transcribed / TranscriptionFailed ──toggle (new cycle)──▶ Recording
/// ```
///
/// Playback is independent of the phase — it only requires a finished clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// No recording yet in this cycle.
    Idle,

    /// Microphone is active; audio is being captured.
    Recording,

    /// The clip is on disk; Whisper is running on the blocking thread pool.
    Transcribing,

    /// The transcript is ready and displayed.
    Transcribed,

    /// Transcription failed.  Recoverable by starting a new recording.
    TranscriptionFailed,
}

impl SessionPhase {
    /// Returns `true` while the session is capturing or transcribing.
    ///
    /// The UI uses this to disable conflicting controls.
    ///
    /// ```
    /// use voicenote::session::SessionPhase;
    ///
    /// assert!(!SessionPhase::Idle.is_busy());
    /// assert!(SessionPhase::Recording.is_busy());
    /// assert!(SessionPhase::Transcribing.is_busy());
    /// assert!(!SessionPhase::Transcribed.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionPhase::Recording | SessionPhase::Transcribing)
    }

    /// A short human-readable label suitable for the UI status line.
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "Ready",
            SessionPhase::Recording => "Recording",
            SessionPhase::Transcribing => "Transcribing",
            SessionPhase::Transcribed => "Done",
            SessionPhase::TranscriptionFailed => "Failed",
        }
    }
}

impl Default for SessionPhase {
    fn default() -> Self {
        SessionPhase::Idle
    }
}

// ---------------------------------------------------------------------------
// Transcription
// ---------------------------------------------------------------------------

/// Progress of the transcription for the current clip.
///
/// Transitions: `Idle` → `InProgress` on a transcribe call, then → `Done`
/// or `Failed` on completion.  A new recording resets it to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcription {
    /// No transcription requested for the current clip.
    Idle,

    /// The engine is running.
    InProgress,

    /// The engine returned this transcript.
    Done(String),

    /// The engine failed with this message.
    Failed(String),
}

impl Transcription {
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Transcription::InProgress)
    }

    /// The transcript text when available.
    pub fn text(&self) -> Option<&str> {
        match self {
            Transcription::Done(text) => Some(text),
            _ => None,
        }
    }
}

impl Default for Transcription {
    fn default() -> Self {
        Transcription::Idle
    }
}

// ---------------------------------------------------------------------------
// RecordingSession
// ---------------------------------------------------------------------------

/// The current (or most recently finished) capture session.
///
/// One active session at a time; `clip` is populated on stop.
#[derive(Debug, Clone, Default)]
pub struct RecordingSession {
    /// Whether capture is active right now.
    pub is_recording: bool,

    /// Clip length in milliseconds (final value set on stop).
    pub duration_millis: u64,

    /// When the active capture started — the UI derives the live elapsed
    /// time from this.  `None` while not recording.
    pub started_at: Option<Instant>,

    /// Path of the finished WAV clip.  `None` until the first stop.
    pub clip: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// PlaybackState
// ---------------------------------------------------------------------------

/// Playback status of the most recent clip.
#[derive(Debug, Clone, Default)]
pub struct PlaybackState {
    /// Whether the clip is currently audible.
    pub is_playing: bool,

    /// Source the player was last pointed at — always the most recent
    /// recording's clip path.
    pub source: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Shared application state — the single source of truth for the UI.
///
/// Held behind [`SharedState`] (`Arc<Mutex<SessionState>>`).  The session
/// controller mutates it; the egui update loop reads it each frame.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Current phase of the record → transcribe cycle.
    pub phase: SessionPhase,

    /// Whether microphone access has been granted.  Mutated only by the
    /// permission request result.
    pub permission_granted: bool,

    /// The current capture session.
    pub recording: RecordingSession,

    /// Transcription progress for the current clip.
    pub transcription: Transcription,

    /// Playback status of the most recent clip.
    pub playback: PlaybackState,

    /// User-visible alert message, surfaced by the UI until dismissed.
    pub alert: Option<String>,
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`SessionState`].
///
/// Cheap to clone (`Arc` clone).  Lock with `.lock().unwrap()` for a short
/// critical section; do **not** hold the lock across `.await` points.
pub type SharedState = Arc<Mutex<SessionState>>;

/// Construct a new [`SharedState`] wrapping a default [`SessionState`].
pub fn new_shared_state() -> SharedState {
    Arc::new(Mutex::new(SessionState::default()))
}

// ---------------------------------------------------------------------------
// format_duration
// ---------------------------------------------------------------------------

/// Format a clip duration as `m:ss` (e.g. 3 200 ms → `"0:03"`).
pub fn format_duration(millis: u64) -> String {
    let total_secs = millis / 1_000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
