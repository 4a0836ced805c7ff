//! Voicenote window — egui/eframe application.
//!
//! # Architecture
//!
//! [`VoicenoteApp`] is the top-level [`eframe::App`].  It owns two handles:
//!
//! * `command_tx` — sends [`SessionCommand`] to the session controller.
//! * `state`      — [`SharedState`] mutated by the controller; the app takes
//!   a snapshot of it each frame and renders from the snapshot so the lock
//!   is never held while drawing.
//!
//! The window shows the permission status, a record toggle with a live
//! elapsed timer, the transcript (or a spinner / error for the in-flight and
//! failed phases), a play/pause button for the finished clip, and a
//! dismissable alert banner.

use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::session::{
    format_duration, SessionCommand, SessionPhase, SharedState, Transcription,
};

// ---------------------------------------------------------------------------
// Frame snapshot
// ---------------------------------------------------------------------------

/// Everything the UI needs for one frame, copied out of [`SharedState`].
struct Snapshot {
    phase: SessionPhase,
    permission_granted: bool,
    is_recording: bool,
    elapsed_millis: u64,
    has_clip: bool,
    transcription: Transcription,
    is_playing: bool,
    alert: Option<String>,
}

// ---------------------------------------------------------------------------
// VoicenoteApp
// ---------------------------------------------------------------------------

/// eframe application — the voicenote demo window.
pub struct VoicenoteApp {
    /// Shared session state, written by the controller task.
    state: SharedState,
    /// Send commands to the background session controller.
    command_tx: mpsc::Sender<SessionCommand>,
    /// Spinner animation phase (increases each frame).
    spinner_phase: f32,
    /// Application configuration (read-only after startup).
    config: AppConfig,
}

impl VoicenoteApp {
    pub fn new(
        state: SharedState,
        command_tx: mpsc::Sender<SessionCommand>,
        config: AppConfig,
    ) -> Self {
        Self {
            state,
            command_tx,
            spinner_phase: 0.0,
            config,
        }
    }

    /// Copy the fields the UI renders out of the shared state.
    fn snapshot(&self) -> Snapshot {
        let state = self.state.lock().unwrap();
        let elapsed_millis = if state.recording.is_recording {
            state
                .recording
                .started_at
                .map(|t| t.elapsed().as_millis() as u64)
                .unwrap_or(0)
        } else {
            state.recording.duration_millis
        };
        Snapshot {
            phase: state.phase.clone(),
            permission_granted: state.permission_granted,
            is_recording: state.recording.is_recording,
            elapsed_millis,
            has_clip: state.recording.clip.is_some(),
            transcription: state.transcription.clone(),
            is_playing: state.playback.is_playing,
            alert: state.alert.clone(),
        }
    }

    fn send(&self, command: SessionCommand) {
        if self.command_tx.try_send(command).is_err() {
            log::warn!("ui: session controller is not accepting commands");
        }
    }

    // ── Sections ─────────────────────────────────────────────────────────

    /// Permission status row: granted/denied label plus the request button.
    fn draw_permission(&self, ui: &mut egui::Ui, snapshot: &Snapshot) {
        ui.horizontal(|ui| {
            let (label, color) = if snapshot.permission_granted {
                ("Microphone: granted", egui::Color32::from_rgb(80, 200, 120))
            } else {
                ("Microphone: not granted", egui::Color32::from_rgb(255, 136, 68))
            };
            ui.label(egui::RichText::new(label).color(color).size(12.0));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if !snapshot.permission_granted
                    && ui.button(egui::RichText::new("Request access").size(11.0)).clicked()
                {
                    self.send(SessionCommand::RequestPermission);
                }
            });
        });
    }

    /// Record toggle plus the elapsed / final duration readout.
    fn draw_recorder(&self, ui: &mut egui::Ui, snapshot: &Snapshot) {
        ui.horizontal(|ui| {
            let label = if snapshot.is_recording {
                "Stop"
            } else {
                "Record"
            };
            let enabled =
                snapshot.permission_granted && snapshot.phase != SessionPhase::Transcribing;
            if ui
                .add_enabled(enabled, egui::Button::new(egui::RichText::new(label).size(13.0)))
                .clicked()
            {
                self.send(SessionCommand::ToggleRecording);
            }

            let duration_color = if snapshot.is_recording {
                egui::Color32::from_rgb(255, 80, 80)
            } else {
                egui::Color32::from_rgb(160, 160, 160)
            };
            ui.label(
                egui::RichText::new(format_duration(snapshot.elapsed_millis))
                    .color(duration_color)
                    .size(13.0),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let play_label = if snapshot.is_playing { "Pause" } else { "Play" };
                if ui
                    .add_enabled(
                        snapshot.has_clip,
                        egui::Button::new(egui::RichText::new(play_label).size(13.0)),
                    )
                    .clicked()
                {
                    self.send(SessionCommand::TogglePlayback);
                }
            });
        });
    }

    /// Transcript area — contents depend on the transcription progress.
    fn draw_transcript(&self, ui: &mut egui::Ui, snapshot: &Snapshot) {
        ui.add_space(4.0);
        match &snapshot.transcription {
            Transcription::Idle => {
                let hint = if snapshot.has_clip {
                    "Transcribing is unavailable"
                } else {
                    "Record a clip to get a transcript"
                };
                ui.label(
                    egui::RichText::new(hint)
                        .color(egui::Color32::from_rgb(120, 120, 120))
                        .size(12.0),
                );
            }
            Transcription::InProgress => {
                ui.label(
                    egui::RichText::new(format!("{} Transcribing...", self.spinner_char()))
                        .color(egui::Color32::from_rgb(68, 136, 255))
                        .size(13.0),
                );
            }
            Transcription::Done(text) => {
                ui.label(
                    egui::RichText::new(text.as_str())
                        .color(egui::Color32::from_rgb(80, 200, 120))
                        .size(13.0),
                );
            }
            Transcription::Failed(reason) => {
                ui.label(
                    egui::RichText::new(format!("Transcription failed: {reason}"))
                        .color(egui::Color32::from_rgb(255, 136, 68))
                        .size(12.0),
                );
            }
        }
    }

    /// Alert banner with a dismiss button.  Dismissal clears the shared
    /// alert directly; it is a pure UI concern.
    fn draw_alert(&self, ui: &mut egui::Ui, message: &str) {
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(message)
                    .color(egui::Color32::from_rgb(255, 136, 68))
                    .size(12.0),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button(egui::RichText::new("Dismiss").size(11.0)).clicked() {
                    self.state.lock().unwrap().alert = None;
                }
            });
        });
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    /// A simple rotating ASCII spinner character driven by `spinner_phase`.
    fn spinner_char(&self) -> char {
        let chars = ['|', '/', '-', '\\'];
        let idx = (self.spinner_phase as usize) % chars.len();
        chars[idx]
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for VoicenoteApp {
    /// Called every frame by eframe.  Snapshots the shared state, advances
    /// the spinner, then renders the window.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let snapshot = self.snapshot();

        self.spinner_phase += 0.08;
        if self.spinner_phase >= 4.0 {
            self.spinner_phase = 0.0;
        }

        // Keep repainting while something is animated; otherwise egui only
        // repaints on input and the timer / spinner would freeze.
        match snapshot.phase {
            SessionPhase::Recording => {
                ctx.request_repaint_after(Duration::from_millis(100));
            }
            SessionPhase::Transcribing => {
                ctx.request_repaint_after(Duration::from_millis(66));
            }
            _ if snapshot.is_playing => {
                ctx.request_repaint_after(Duration::from_millis(250));
            }
            _ => {}
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(
                egui::RichText::new("Voicenote")
                    .color(egui::Color32::from_rgb(200, 200, 200))
                    .size(16.0),
            );
            ui.label(
                egui::RichText::new(format!(
                    "{}  ·  model: {}",
                    snapshot.phase.label(),
                    self.config.stt.model
                ))
                .color(egui::Color32::from_rgb(120, 120, 120))
                .size(11.0),
            );

            ui.separator();
            self.draw_permission(ui, &snapshot);
            ui.separator();
            self.draw_recorder(ui, &snapshot);
            self.draw_transcript(ui, &snapshot);

            if let Some(message) = &snapshot.alert {
                ui.separator();
                self.draw_alert(ui, message);
            }
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::info!("voicenote window closing");
    }
}
