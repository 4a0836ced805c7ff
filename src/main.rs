//! Application entry point — Voicenote.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Load the Whisper model (degrades to no transcription if missing).
//! 5. Start the cpal capture stream and the chunk-feeder thread.
//! 6. Build the recorder, player, and permission gate façades.
//! 7. Spawn the session controller on the tokio runtime.
//! 8. Run [`eframe::run_native`] — blocks the main thread until the window
//!    is closed.

use std::sync::Arc;

use tokio::sync::mpsc;
use voicenote::{
    app::VoicenoteApp,
    audio::{AudioCapture, AudioChunk},
    config::{AppConfig, AppPaths},
    permission::DeviceProbeGate,
    player::ClipPlayer,
    recorder::{new_sample_sink, spawn_chunk_feeder, MicRecorder},
    session::{new_shared_state, SessionCommand, SessionController},
    stt::{ModelPaths, TranscribeParams, TranscriptionEngine, WhisperEngine},
};

use eframe::egui;

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let mut vp = egui::ViewportBuilder::default()
        .with_inner_size([380.0, 240.0])
        .with_min_inner_size([320.0, 200.0]);

    if config.ui.always_on_top {
        vp = vp.with_always_on_top();
    }

    if let Some((x, y)) = config.ui.window_position {
        vp = vp.with_position(egui::pos2(x, y));
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Whisper engine loading
// ---------------------------------------------------------------------------

/// Load the Whisper model named in the config.
///
/// Returns `None` when the model cannot be loaded; the app still records
/// and plays back, and transcription quietly does nothing.
fn load_engine(config: &AppConfig, paths: &AppPaths) -> Option<Arc<dyn TranscriptionEngine>> {
    let model_path = ModelPaths::from_app_paths(paths).model_path(&config.stt.model);

    let mut params = TranscribeParams {
        language: config.stt.language.clone(),
        ..TranscribeParams::default()
    };
    if let Some(n_threads) = config.stt.n_threads {
        params.n_threads = n_threads;
    }

    match WhisperEngine::load(&model_path, params) {
        Ok(engine) => {
            log::info!("Whisper model loaded: {}", model_path.display());
            Some(Arc::new(engine))
        }
        Err(e) => {
            log::warn!(
                "Could not load Whisper model ({}): {e}. Transcription is disabled.",
                model_path.display()
            );
            None
        }
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Voicenote starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    let paths = AppPaths::new();

    // 3. Tokio runtime (2 worker threads — controller + blocking STT)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. Whisper engine (may be absent)
    let engine = load_engine(&config, &paths);

    // 5. cpal audio capture — the stream is owned by main because cpal
    //    streams are not Send.  Captured chunks flow through a std channel
    //    to the chunk-feeder thread, which fills the recorder's sample sink
    //    while a recording is active.
    let sink = new_sample_sink();
    let _stream_handle = match AudioCapture::new(config.audio.input_device.as_deref()) {
        Ok(capture) => {
            let (chunk_tx, chunk_rx) = std::sync::mpsc::channel::<AudioChunk>();
            spawn_chunk_feeder(chunk_rx, Arc::clone(&sink));

            match capture.start(chunk_tx) {
                Ok(handle) => {
                    log::info!(
                        "Audio capture started ({} Hz, {} ch)",
                        capture.sample_rate(),
                        capture.channels()
                    );
                    Some(handle)
                }
                Err(e) => {
                    log::warn!("Failed to start audio stream: {e}");
                    None
                }
            }
        }
        Err(e) => {
            log::warn!("Audio capture unavailable: {e}");
            None
        }
    };

    // 6. Façades
    let recorder = Arc::new(MicRecorder::new(
        sink,
        paths.recordings_dir.clone(),
        config.audio.max_recording_secs,
    ));
    let player = Arc::new(ClipPlayer::new());
    let permission = Arc::new(DeviceProbeGate::new());

    // 7. Session controller on the tokio runtime
    let state = new_shared_state();
    let (command_tx, command_rx) = mpsc::channel::<SessionCommand>(16);
    {
        let controller = SessionController::new(
            Arc::clone(&state),
            recorder,
            player,
            permission,
            engine,
        );
        rt.spawn(controller.run(command_rx));
    }

    // 8. Build the egui app and run it (blocks until the window is closed)
    let app = VoicenoteApp::new(state, command_tx, config.clone());
    let options = native_options(&config);

    eframe::run_native("Voicenote", options, Box::new(move |_cc| Ok(Box::new(app))))
}
