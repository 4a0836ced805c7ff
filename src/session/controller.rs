//! Session controller — orchestrates recorder, transcription engine,
//! player, and permission gate into a single user-facing flow.
//!
//! The controller owns no UI.  It consumes [`SessionCommand`]s from an mpsc
//! channel (sent by the egui layer) and publishes every observable effect
//! into [`SharedState`], which the UI renders each frame.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::permission::PermissionGate;
use crate::player::Player;
use crate::recorder::Recorder;
use crate::session::state::{
    PlaybackState, RecordingSession, SessionPhase, SharedState, Transcription,
};
use crate::stt::TranscriptionEngine;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Commands the UI sends to the session controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Start recording if idle, stop (and transcribe) if recording.
    ToggleRecording,

    /// Transcribe the most recent clip.  No-op without a clip, without a
    /// loaded model, or while a transcription is already running.
    Transcribe,

    /// Play the most recent clip if paused, pause if playing.
    TogglePlayback,

    /// Ask the platform for microphone access and record the outcome.
    RequestPermission,
}

// ---------------------------------------------------------------------------
// SessionController
// ---------------------------------------------------------------------------

/// Drives the record → transcribe → playback cycle.
///
/// All collaborators are trait objects so tests can substitute mocks.  The
/// engine is optional: when the Whisper model failed to load at startup the
/// app still records and plays back, and transcription quietly does nothing.
pub struct SessionController {
    state: SharedState,
    recorder: Arc<dyn Recorder>,
    player: Arc<dyn Player>,
    permission: Arc<dyn PermissionGate>,
    engine: Option<Arc<dyn TranscriptionEngine>>,
}

impl SessionController {
    pub fn new(
        state: SharedState,
        recorder: Arc<dyn Recorder>,
        player: Arc<dyn Player>,
        permission: Arc<dyn PermissionGate>,
        engine: Option<Arc<dyn TranscriptionEngine>>,
    ) -> Self {
        Self {
            state,
            recorder,
            player,
            permission,
            engine,
        }
    }

    /// Main command loop.  Runs until the command channel closes.
    ///
    /// Before consuming commands the gate is queried once, so the UI shows
    /// the actual microphone state instead of "not granted" when access was
    /// already available (e.g. granted in an earlier run).
    pub async fn run(self, mut commands: mpsc::Receiver<SessionCommand>) {
        let initial = self.permission.status().await;
        self.state.lock().unwrap().permission_granted = initial.granted;
        log::info!(
            "session: controller started (microphone granted={})",
            initial.granted
        );

        while let Some(command) = commands.recv().await {
            log::debug!("session: command {:?}", command);
            match command {
                SessionCommand::ToggleRecording => self.toggle_recording().await,
                SessionCommand::Transcribe => self.transcribe_current().await,
                SessionCommand::TogglePlayback => self.toggle_playback(),
                SessionCommand::RequestPermission => self.request_permission().await,
            }
        }

        log::info!("session: command channel closed, shutting down");
    }

    // -- recording ----------------------------------------------------------

    async fn toggle_recording(&self) {
        if self.recorder.is_recording() {
            self.stop_recording().await;
        } else {
            self.start_recording();
        }
    }

    fn start_recording(&self) {
        let permitted = self.state.lock().unwrap().permission_granted;
        if !permitted {
            log::warn!("session: recording requested without microphone permission");
            self.set_alert("Microphone access is not granted. Request permission first.");
            return;
        }

        match self.recorder.start() {
            Ok(()) => {
                let mut state = self.state.lock().unwrap();
                state.phase = SessionPhase::Recording;
                state.recording = RecordingSession {
                    is_recording: true,
                    duration_millis: 0,
                    started_at: Some(std::time::Instant::now()),
                    clip: None,
                };
                // A fresh recording invalidates the previous transcript.
                state.transcription = Transcription::Idle;
                state.alert = None;
                log::info!("session: recording started");
            }
            Err(err) => {
                log::error!("session: failed to start recording: {err}");
                self.set_alert(format!("Could not start recording: {err}"));
            }
        }
    }

    async fn stop_recording(&self) {
        match self.recorder.stop() {
            Ok(clip) => {
                log::info!(
                    "session: recording stopped, {} ms -> {}",
                    clip.duration_millis,
                    clip.path.display()
                );
                {
                    let mut state = self.state.lock().unwrap();
                    state.recording.is_recording = false;
                    state.recording.started_at = None;
                    state.recording.duration_millis = clip.duration_millis;
                    state.recording.clip = Some(clip.path.clone());
                    state.phase = SessionPhase::Transcribing;
                }
                self.transcribe_clip(clip.path).await;
            }
            Err(err) => {
                log::error!("session: failed to stop recording: {err}");
                let mut state = self.state.lock().unwrap();
                state.recording.is_recording = false;
                state.recording.started_at = None;
                state.phase = SessionPhase::Idle;
                state.alert = Some(format!("Recording failed: {err}"));
            }
        }
    }

    // -- transcription ------------------------------------------------------

    async fn transcribe_current(&self) {
        let (clip, in_progress) = {
            let state = self.state.lock().unwrap();
            (
                state.recording.clip.clone(),
                state.transcription.is_in_progress(),
            )
        };

        let Some(clip) = clip else {
            log::debug!("session: transcribe requested with no recording, ignoring");
            return;
        };
        if in_progress {
            log::debug!("session: transcription already in progress, ignoring");
            return;
        }

        {
            let mut state = self.state.lock().unwrap();
            state.phase = SessionPhase::Transcribing;
        }
        self.transcribe_clip(clip).await;
    }

    /// Run the engine on `clip` and publish the result.
    ///
    /// Whisper inference is CPU-bound, so it runs on the blocking pool.
    async fn transcribe_clip(&self, clip: PathBuf) {
        let Some(engine) = self.engine.as_ref() else {
            // Model never loaded; the rest of the app keeps working.
            log::debug!("session: no transcription engine, skipping");
            let mut state = self.state.lock().unwrap();
            state.phase = SessionPhase::Idle;
            state.transcription = Transcription::Idle;
            return;
        };

        self.state.lock().unwrap().transcription = Transcription::InProgress;

        let engine = Arc::clone(engine);
        let path = clip.clone();
        let outcome =
            tokio::task::spawn_blocking(move || engine.transcribe(&path)).await;

        let mut state = self.state.lock().unwrap();
        match outcome {
            Ok(Ok(text)) => {
                log::info!("session: transcribed {} chars", text.len());
                state.transcription = Transcription::Done(text);
                state.phase = SessionPhase::Transcribed;
            }
            Ok(Err(err)) => {
                log::error!("session: transcription failed: {err}");
                state.transcription = Transcription::Failed(err.to_string());
                state.phase = SessionPhase::TranscriptionFailed;
                state.alert = Some(format!("Transcription failed: {err}"));
            }
            Err(err) => {
                log::error!("session: transcription task panicked: {err}");
                state.transcription = Transcription::Failed("internal error".into());
                state.phase = SessionPhase::TranscriptionFailed;
                state.alert = Some("Transcription failed unexpectedly".into());
            }
        }
    }

    // -- playback -----------------------------------------------------------

    fn toggle_playback(&self) {
        let clip = self.state.lock().unwrap().recording.clip.clone();
        let Some(clip) = clip else {
            log::debug!("session: playback requested with no recording, ignoring");
            return;
        };

        if self.player.is_playing() {
            self.player.pause();
            self.state.lock().unwrap().playback.is_playing = false;
            log::info!("session: playback paused");
            return;
        }

        // Point the player at the latest clip; keep the current source (and
        // its resume position) when it already matches.
        if self.player.source().as_deref() != Some(clip.as_path()) {
            if let Err(err) = self.player.replace(&clip) {
                log::error!("session: failed to load clip for playback: {err}");
                self.set_alert(format!("Could not load recording: {err}"));
                return;
            }
        }

        match self.player.play() {
            Ok(()) => {
                {
                    let mut state = self.state.lock().unwrap();
                    state.playback = PlaybackState {
                        is_playing: true,
                        source: Some(clip),
                    };
                }
                self.spawn_playback_watcher();
                log::info!("session: playback started");
            }
            Err(err) => {
                log::error!("session: failed to start playback: {err}");
                self.set_alert(format!("Could not play recording: {err}"));
            }
        }
    }

    /// Keep the shared playing flag in sync with the player.
    ///
    /// The player stops on its own when the clip runs out (or its output
    /// stream fails), without any command passing through the loop, so a
    /// background task polls it and clears the shared flag once playback
    /// has ended.
    fn spawn_playback_watcher(&self) {
        let player = Arc::clone(&self.player);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            while player.is_playing() {
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }
            let mut state = state.lock().unwrap();
            if state.playback.is_playing {
                state.playback.is_playing = false;
                log::debug!("session: playback finished");
            }
        });
    }

    // -- permission ---------------------------------------------------------

    async fn request_permission(&self) {
        match self.permission.request().await {
            Ok(status) => {
                log::info!("session: microphone permission granted={}", status.granted);
                let mut state = self.state.lock().unwrap();
                state.permission_granted = status.granted;
                if !status.granted {
                    state.alert = Some(
                        "Microphone permission was denied. Enable it to record audio.".into(),
                    );
                }
            }
            Err(err) => {
                log::error!("session: permission request failed: {err}");
                self.set_alert(format!("Permission request failed: {err}"));
            }
        }

        // The audio path is configured whatever the outcome, so a later
        // grant works without restarting the app.
        if let Err(err) = self.recorder.prepare() {
            log::warn!("session: failed to prepare recorder: {err}");
        }
    }

    // -- helpers ------------------------------------------------------------

    fn set_alert(&self, message: impl Into<String>) {
        self.state.lock().unwrap().alert = Some(message.into());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::MockPermissionGate;
    use crate::player::MockPlayer;
    use crate::recorder::MockRecorder;
    use crate::session::state::{format_duration, new_shared_state};
    use crate::stt::{MockTranscriptionEngine, SttError};

    struct Harness {
        state: SharedState,
        recorder: Arc<MockRecorder>,
        player: Arc<MockPlayer>,
        tx: mpsc::Sender<SessionCommand>,
        handle: tokio::task::JoinHandle<()>,
    }

    /// Spawn a controller over mocks.  `grant` controls the permission gate,
    /// `clip_millis` the duration reported by the mock recorder.
    fn spawn_controller(
        grant: bool,
        clip_millis: u64,
        engine: Arc<MockTranscriptionEngine>,
    ) -> Harness {
        let state = new_shared_state();
        let recorder = Arc::new(MockRecorder::new(clip_millis));
        let player = Arc::new(MockPlayer::new());
        let permission = Arc::new(if grant {
            MockPermissionGate::granting()
        } else {
            MockPermissionGate::denying()
        });

        let controller = SessionController::new(
            Arc::clone(&state),
            Arc::clone(&recorder) as Arc<dyn Recorder>,
            Arc::clone(&player) as Arc<dyn Player>,
            permission as Arc<dyn PermissionGate>,
            Some(Arc::clone(&engine) as Arc<dyn TranscriptionEngine>),
        );

        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(controller.run(rx));

        Harness {
            state,
            recorder,
            player,
            tx,
            handle,
        }
    }

    /// Send commands, close the channel, and wait for the loop to drain.
    async fn drive(harness: &Harness, commands: &[SessionCommand]) {
        for command in commands {
            harness.tx.send(command.clone()).await.unwrap();
        }
    }

    /// Poll until `condition` holds, panicking after ~2 s.
    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("condition not reached within 2 s");
    }

    async fn finish(harness: Harness) -> SharedState {
        drop(harness.tx);
        harness.handle.await.unwrap();
        harness.state
    }

    // ---- permission ---

    #[tokio::test]
    async fn recording_without_permission_alerts_and_stays_idle() {
        let engine = Arc::new(MockTranscriptionEngine::ok("hello"));
        let harness = spawn_controller(false, 1_000, Arc::clone(&engine));

        drive(&harness, &[SessionCommand::ToggleRecording]).await;
        let recorder = Arc::clone(&harness.recorder);
        let state = finish(harness).await;

        let state = state.lock().unwrap();
        assert_eq!(state.phase, SessionPhase::Idle);
        assert!(!state.recording.is_recording);
        assert!(state.alert.is_some());
        assert_eq!(recorder.clips_produced(), 0);
    }

    #[tokio::test]
    async fn granted_permission_sets_flag_and_prepares_recorder() {
        let engine = Arc::new(MockTranscriptionEngine::ok("hello"));
        let harness = spawn_controller(true, 1_000, Arc::clone(&engine));

        drive(&harness, &[SessionCommand::RequestPermission]).await;
        let recorder = Arc::clone(&harness.recorder);
        let state = finish(harness).await;

        let state = state.lock().unwrap();
        assert!(state.permission_granted);
        assert!(state.alert.is_none());
        assert_eq!(recorder.prepare_calls(), 1);
    }

    #[tokio::test]
    async fn denied_permission_sets_alert_but_still_prepares_recorder() {
        let engine = Arc::new(MockTranscriptionEngine::ok("hello"));
        let harness = spawn_controller(false, 1_000, Arc::clone(&engine));

        drive(&harness, &[SessionCommand::RequestPermission]).await;
        let recorder = Arc::clone(&harness.recorder);
        let state = finish(harness).await;

        let state = state.lock().unwrap();
        assert!(!state.permission_granted);
        assert!(state.alert.is_some());
        assert_eq!(recorder.prepare_calls(), 1);
    }

    #[tokio::test]
    async fn startup_seeds_permission_from_gate() {
        let engine = Arc::new(MockTranscriptionEngine::ok("hello"));
        let state = new_shared_state();
        let recorder = Arc::new(MockRecorder::new(1_000));
        let controller = SessionController::new(
            Arc::clone(&state),
            Arc::clone(&recorder) as Arc<dyn Recorder>,
            Arc::new(MockPlayer::new()) as Arc<dyn Player>,
            Arc::new(MockPermissionGate::already_granted()) as Arc<dyn PermissionGate>,
            Some(engine as Arc<dyn TranscriptionEngine>),
        );

        let (tx, rx) = mpsc::channel(4);
        let handle = tokio::spawn(controller.run(rx));
        // No RequestPermission — recording must work straight away.
        tx.send(SessionCommand::ToggleRecording).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        let state = state.lock().unwrap();
        assert!(state.permission_granted);
        assert!(state.recording.is_recording);
        assert_eq!(state.phase, SessionPhase::Recording);
        assert!(state.alert.is_none());
    }

    // ---- record → transcribe cycle ---

    #[tokio::test]
    async fn full_cycle_transcribes_and_formats_duration() {
        let engine = Arc::new(MockTranscriptionEngine::ok("hello world"));
        let harness = spawn_controller(true, 3_200, Arc::clone(&engine));

        drive(
            &harness,
            &[
                SessionCommand::RequestPermission,
                SessionCommand::ToggleRecording,
                SessionCommand::ToggleRecording,
            ],
        )
        .await;
        let state = finish(harness).await;

        let state = state.lock().unwrap();
        assert_eq!(state.phase, SessionPhase::Transcribed);
        assert!(!state.recording.is_recording);
        assert_eq!(state.recording.duration_millis, 3_200);
        assert_eq!(format_duration(state.recording.duration_millis), "0:03");
        assert_eq!(
            state.transcription,
            Transcription::Done("hello world".into())
        );
        assert!(state.recording.clip.is_some());
    }

    #[tokio::test]
    async fn one_toggle_pair_produces_one_clip() {
        let engine = Arc::new(MockTranscriptionEngine::ok("hi"));
        let harness = spawn_controller(true, 500, Arc::clone(&engine));

        drive(
            &harness,
            &[
                SessionCommand::RequestPermission,
                SessionCommand::ToggleRecording,
                SessionCommand::ToggleRecording,
            ],
        )
        .await;
        let recorder = Arc::clone(&harness.recorder);
        finish(harness).await;

        assert_eq!(recorder.clips_produced(), 1);
        assert_eq!(engine.calls().len(), 1);
    }

    #[tokio::test]
    async fn new_recording_resets_transcription() {
        let engine = Arc::new(MockTranscriptionEngine::ok("first take"));
        let harness = spawn_controller(true, 1_000, Arc::clone(&engine));

        drive(
            &harness,
            &[
                SessionCommand::RequestPermission,
                SessionCommand::ToggleRecording,
                SessionCommand::ToggleRecording,
                // start a second take; the old transcript must be gone
                SessionCommand::ToggleRecording,
            ],
        )
        .await;
        let state = finish(harness).await;

        let state = state.lock().unwrap();
        assert_eq!(state.phase, SessionPhase::Recording);
        assert!(state.recording.is_recording);
        assert_eq!(state.transcription, Transcription::Idle);
    }

    #[tokio::test]
    async fn recorder_start_failure_sets_alert() {
        let engine = Arc::new(MockTranscriptionEngine::ok("hello"));
        let state = new_shared_state();
        let recorder = Arc::new(MockRecorder::failing_start());
        let player = Arc::new(MockPlayer::new());
        let controller = SessionController::new(
            Arc::clone(&state),
            Arc::clone(&recorder) as Arc<dyn Recorder>,
            player as Arc<dyn Player>,
            Arc::new(MockPermissionGate::granting()) as Arc<dyn PermissionGate>,
            Some(engine as Arc<dyn TranscriptionEngine>),
        );

        let (tx, rx) = mpsc::channel(4);
        let handle = tokio::spawn(controller.run(rx));
        tx.send(SessionCommand::RequestPermission).await.unwrap();
        tx.send(SessionCommand::ToggleRecording).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        let state = state.lock().unwrap();
        assert_eq!(state.phase, SessionPhase::Idle);
        assert!(!state.recording.is_recording);
        assert!(state.alert.is_some());
    }

    // ---- explicit transcribe ---

    #[tokio::test]
    async fn transcribe_without_recording_is_a_noop() {
        let engine = Arc::new(MockTranscriptionEngine::ok("hello"));
        let harness = spawn_controller(true, 1_000, Arc::clone(&engine));

        drive(&harness, &[SessionCommand::Transcribe]).await;
        let state = finish(harness).await;

        let state = state.lock().unwrap();
        assert_eq!(state.phase, SessionPhase::Idle);
        assert_eq!(state.transcription, Transcription::Idle);
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn transcribe_without_engine_is_a_noop() {
        let state = new_shared_state();
        let recorder = Arc::new(MockRecorder::new(1_000));
        let player = Arc::new(MockPlayer::new());
        let controller = SessionController::new(
            Arc::clone(&state),
            Arc::clone(&recorder) as Arc<dyn Recorder>,
            player as Arc<dyn Player>,
            Arc::new(MockPermissionGate::granting()) as Arc<dyn PermissionGate>,
            None,
        );

        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(controller.run(rx));
        for command in [
            SessionCommand::RequestPermission,
            SessionCommand::ToggleRecording,
            SessionCommand::ToggleRecording,
            SessionCommand::Transcribe,
        ] {
            tx.send(command).await.unwrap();
        }
        drop(tx);
        handle.await.unwrap();

        // Recording itself still works without a model.
        let state = state.lock().unwrap();
        assert_eq!(state.phase, SessionPhase::Idle);
        assert_eq!(state.transcription, Transcription::Idle);
        assert_eq!(state.recording.duration_millis, 1_000);
        assert!(state.recording.clip.is_some());
        assert!(state.alert.is_none());
    }

    #[tokio::test]
    async fn in_progress_transcription_is_not_restarted() {
        let engine = Arc::new(MockTranscriptionEngine::ok("hello"));
        let state = new_shared_state();
        // A clip exists and the engine is already running on it.
        {
            let mut state = state.lock().unwrap();
            state.recording.clip = Some(PathBuf::from("/tmp/clip.wav"));
            state.transcription = Transcription::InProgress;
            state.phase = SessionPhase::Transcribing;
        }
        let controller = SessionController::new(
            Arc::clone(&state),
            Arc::new(MockRecorder::new(1_000)) as Arc<dyn Recorder>,
            Arc::new(MockPlayer::new()) as Arc<dyn Player>,
            Arc::new(MockPermissionGate::granting()) as Arc<dyn PermissionGate>,
            Some(Arc::clone(&engine) as Arc<dyn TranscriptionEngine>),
        );

        let (tx, rx) = mpsc::channel(4);
        let handle = tokio::spawn(controller.run(rx));
        tx.send(SessionCommand::Transcribe).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        assert!(engine.calls().is_empty());
        assert_eq!(
            state.lock().unwrap().transcription,
            Transcription::InProgress
        );
    }

    #[tokio::test]
    async fn transcription_failure_sets_failed_state_and_alert() {
        let engine = Arc::new(MockTranscriptionEngine::err(SttError::Transcription(
            "decoder state exhausted".into(),
        )));
        let harness = spawn_controller(true, 1_000, Arc::clone(&engine));

        drive(
            &harness,
            &[
                SessionCommand::RequestPermission,
                SessionCommand::ToggleRecording,
                SessionCommand::ToggleRecording,
            ],
        )
        .await;
        let state = finish(harness).await;

        let state = state.lock().unwrap();
        assert_eq!(state.phase, SessionPhase::TranscriptionFailed);
        assert!(matches!(state.transcription, Transcription::Failed(_)));
        assert!(state.alert.is_some());
        // The clip survives; playback still works after a failure.
        assert!(state.recording.clip.is_some());
    }

    // ---- playback ---

    #[tokio::test]
    async fn playback_without_recording_is_a_noop() {
        let engine = Arc::new(MockTranscriptionEngine::ok("hello"));
        let harness = spawn_controller(true, 1_000, Arc::clone(&engine));

        drive(&harness, &[SessionCommand::TogglePlayback]).await;
        let player = Arc::clone(&harness.player);
        let state = finish(harness).await;

        let state = state.lock().unwrap();
        assert!(!state.playback.is_playing);
        assert!(state.playback.source.is_none());
        assert_eq!(player.replace_calls(), 0);
        assert_eq!(player.play_calls(), 0);
    }

    #[tokio::test]
    async fn playback_points_at_latest_clip() {
        let engine = Arc::new(MockTranscriptionEngine::ok("hello"));
        let harness = spawn_controller(true, 1_000, Arc::clone(&engine));

        drive(
            &harness,
            &[
                SessionCommand::RequestPermission,
                SessionCommand::ToggleRecording,
                SessionCommand::ToggleRecording,
                SessionCommand::TogglePlayback,
            ],
        )
        .await;
        let player = Arc::clone(&harness.player);
        let state = finish(harness).await;

        let state = state.lock().unwrap();
        assert!(state.playback.is_playing);
        assert_eq!(state.playback.source, state.recording.clip);
        assert_eq!(player.replace_calls(), 1);
        assert_eq!(player.play_calls(), 1);
    }

    #[tokio::test]
    async fn playback_flag_clears_when_clip_runs_out() {
        let engine = Arc::new(MockTranscriptionEngine::ok("hello"));
        let harness = spawn_controller(true, 1_000, Arc::clone(&engine));

        drive(
            &harness,
            &[
                SessionCommand::RequestPermission,
                SessionCommand::ToggleRecording,
                SessionCommand::ToggleRecording,
                SessionCommand::TogglePlayback,
            ],
        )
        .await;
        wait_until(|| harness.state.lock().unwrap().playback.is_playing).await;

        // The clip ends on its own; no pause command is ever sent.
        harness.player.finish_playback();
        wait_until(|| !harness.state.lock().unwrap().playback.is_playing).await;

        assert!(!harness.player.is_playing());
        let state = finish(harness).await;
        assert!(!state.lock().unwrap().playback.is_playing);
    }

    #[tokio::test]
    async fn second_playback_toggle_pauses() {
        let engine = Arc::new(MockTranscriptionEngine::ok("hello"));
        let harness = spawn_controller(true, 1_000, Arc::clone(&engine));

        drive(
            &harness,
            &[
                SessionCommand::RequestPermission,
                SessionCommand::ToggleRecording,
                SessionCommand::ToggleRecording,
                SessionCommand::TogglePlayback,
                SessionCommand::TogglePlayback,
            ],
        )
        .await;
        let player = Arc::clone(&harness.player);
        let state = finish(harness).await;

        let state = state.lock().unwrap();
        assert!(!state.playback.is_playing);
        // Played once, then paused; the clip was loaded exactly once.
        assert_eq!(player.play_calls(), 1);
        assert_eq!(player.replace_calls(), 1);
    }
}
