//! Production recorder backed by the cpal capture stream.
//!
//! The cpal stream itself is owned by `main()` — `cpal::Stream` is not `Send`
//! on every platform, so it never crosses into the async world.  Instead the
//! stream feeds [`AudioChunk`]s into a converter thread
//! ([`spawn_chunk_feeder`]) which appends 16 kHz mono samples to a shared
//! [`SampleSink`] whenever a recording is active.  [`MicRecorder`] only flips
//! the sink's `active` flag and, on stop, drains the samples into a WAV file.

use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::audio::{downmix_to_mono, resample_to_16k, AudioChunk, TARGET_SAMPLE_RATE};

use super::{RecordedClip, Recorder, RecorderError};

// ---------------------------------------------------------------------------
// SampleSink
// ---------------------------------------------------------------------------

/// Accumulates converted capture samples while a recording is active.
#[derive(Debug)]
pub struct SampleSink {
    /// 16 kHz mono samples captured so far.
    pub samples: Vec<f32>,
    /// Whether the feeder should append incoming chunks.
    pub active: bool,
    /// Sample cap for the current recording; the feeder drops audio past it.
    /// Set by [`MicRecorder::start`] from the configured maximum length.
    pub max_samples: usize,
}

impl Default for SampleSink {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
            active: false,
            max_samples: usize::MAX,
        }
    }
}

/// Thread-safe handle to the sample sink, shared between the converter
/// thread and the [`MicRecorder`].
pub type SharedSampleSink = Arc<Mutex<SampleSink>>;

/// Construct an empty, inactive [`SharedSampleSink`].
pub fn new_sample_sink() -> SharedSampleSink {
    Arc::new(Mutex::new(SampleSink::default()))
}

/// Spawn the converter thread: drains cpal chunks, downmixes and resamples
/// them to 16 kHz mono, and appends to `sink` while a recording is active.
/// Audio past the sink's `max_samples` cap is dropped.
///
/// The thread exits when the sending side of `chunk_rx` is dropped.
pub fn spawn_chunk_feeder(chunk_rx: mpsc::Receiver<AudioChunk>, sink: SharedSampleSink) {
    std::thread::Builder::new()
        .name("chunk-feeder".into())
        .spawn(move || {
            while let Ok(chunk) = chunk_rx.recv() {
                // Check the active flag under a brief lock before converting.
                if !sink.lock().unwrap().active {
                    continue;
                }

                let mono = downmix_to_mono(&chunk.samples, chunk.channels);
                let resampled = resample_to_16k(&mono, chunk.sample_rate);

                let mut sink = sink.lock().unwrap();
                let room = sink.max_samples.saturating_sub(sink.samples.len());
                if room == 0 {
                    continue;
                }
                let take = resampled.len().min(room);
                sink.samples.extend_from_slice(&resampled[..take]);
            }
            log::debug!("chunk feeder: capture channel closed, exiting");
        })
        .expect("failed to spawn chunk-feeder thread");
}

// ---------------------------------------------------------------------------
// MicRecorder
// ---------------------------------------------------------------------------

/// [`Recorder`] implementation that produces WAV clips from the microphone.
///
/// One recording session at a time: `start` while active returns
/// [`RecorderError::AlreadyRecording`], `stop` while inactive returns
/// [`RecorderError::NotRecording`].
pub struct MicRecorder {
    sink: SharedSampleSink,
    recordings_dir: PathBuf,
    /// Per-recording sample cap, derived from the configured maximum length.
    max_samples: usize,
}

impl MicRecorder {
    /// Create a recorder writing clips into `recordings_dir`, capped at
    /// `max_recording_secs` of audio per clip.
    ///
    /// `sink` must be the same handle passed to [`spawn_chunk_feeder`].
    pub fn new(sink: SharedSampleSink, recordings_dir: PathBuf, max_recording_secs: f32) -> Self {
        let max_samples = (max_recording_secs.max(0.0) * TARGET_SAMPLE_RATE as f32) as usize;
        Self {
            sink,
            recordings_dir,
            max_samples,
        }
    }

    /// Epoch-millis based clip filename, e.g. `clip-1724900000000.wav`.
    fn next_clip_path(&self) -> PathBuf {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        self.recordings_dir.join(format!("clip-{millis}.wav"))
    }
}

impl Recorder for MicRecorder {
    /// Resolve the recordings directory.  Called after a permission request
    /// to configure the session for recording.
    fn prepare(&self) -> Result<(), RecorderError> {
        std::fs::create_dir_all(&self.recordings_dir)?;
        log::debug!(
            "recorder prepared: clips go to {}",
            self.recordings_dir.display()
        );
        Ok(())
    }

    fn start(&self) -> Result<(), RecorderError> {
        let mut sink = self.sink.lock().unwrap();
        if sink.active {
            return Err(RecorderError::AlreadyRecording);
        }
        sink.samples.clear();
        sink.max_samples = self.max_samples;
        sink.active = true;
        Ok(())
    }

    fn stop(&self) -> Result<RecordedClip, RecorderError> {
        let samples = {
            let mut sink = self.sink.lock().unwrap();
            if !sink.active {
                return Err(RecorderError::NotRecording);
            }
            sink.active = false;
            std::mem::take(&mut sink.samples)
        };

        if samples.is_empty() {
            return Err(RecorderError::EmptyCapture);
        }

        let duration_millis = samples.len() as u64 * 1_000 / TARGET_SAMPLE_RATE as u64;

        std::fs::create_dir_all(&self.recordings_dir)?;
        let path = self.next_clip_path();
        super::wav::write_clip(&path, &samples, TARGET_SAMPLE_RATE)?;

        log::info!(
            "recorded clip: {} ({} ms, {} samples)",
            path.display(),
            duration_millis,
            samples.len()
        );

        Ok(RecordedClip {
            path,
            duration_millis,
        })
    }

    fn is_recording(&self) -> bool {
        self.sink.lock().unwrap().active
    }

    fn duration_millis(&self) -> u64 {
        let sink = self.sink.lock().unwrap();
        sink.samples.len() as u64 * 1_000 / TARGET_SAMPLE_RATE as u64
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn recorder_with_dir(dir: &std::path::Path) -> (MicRecorder, SharedSampleSink) {
        let sink = new_sample_sink();
        let rec = MicRecorder::new(Arc::clone(&sink), dir.to_path_buf(), 60.0);
        (rec, sink)
    }

    #[test]
    fn start_activates_sink_and_clears_samples() {
        let dir = tempdir().expect("temp dir");
        let (rec, sink) = recorder_with_dir(dir.path());

        sink.lock().unwrap().samples = vec![0.1; 100]; // leftover from last cycle

        rec.start().expect("start");
        let s = sink.lock().unwrap();
        assert!(s.active);
        assert!(s.samples.is_empty());
    }

    #[test]
    fn start_twice_is_rejected() {
        let dir = tempdir().expect("temp dir");
        let (rec, _sink) = recorder_with_dir(dir.path());

        rec.start().expect("start");
        assert!(matches!(
            rec.start().unwrap_err(),
            RecorderError::AlreadyRecording
        ));
    }

    #[test]
    fn stop_without_start_is_rejected() {
        let dir = tempdir().expect("temp dir");
        let (rec, _sink) = recorder_with_dir(dir.path());

        assert!(matches!(
            rec.stop().unwrap_err(),
            RecorderError::NotRecording
        ));
    }

    #[test]
    fn stop_with_no_samples_is_empty_capture() {
        let dir = tempdir().expect("temp dir");
        let (rec, _sink) = recorder_with_dir(dir.path());

        rec.start().expect("start");
        assert!(matches!(
            rec.stop().unwrap_err(),
            RecorderError::EmptyCapture
        ));
    }

    #[test]
    fn stop_writes_clip_and_reports_duration() {
        let dir = tempdir().expect("temp dir");
        let (rec, sink) = recorder_with_dir(dir.path());

        rec.start().expect("start");
        // 3.2 s of 16 kHz audio
        sink.lock().unwrap().samples = vec![0.25_f32; 51_200];

        let clip = rec.stop().expect("stop");
        assert_eq!(clip.duration_millis, 3_200);
        assert!(clip.path.exists());
        assert!(!rec.is_recording());

        let (decoded, rate) = super::super::wav::read_clip(&clip.path).expect("read back");
        assert_eq!(rate, TARGET_SAMPLE_RATE);
        assert_eq!(decoded.len(), 51_200);
    }

    #[test]
    fn consecutive_sessions_produce_distinct_files() {
        let dir = tempdir().expect("temp dir");
        let (rec, sink) = recorder_with_dir(dir.path());

        rec.start().expect("start 1");
        sink.lock().unwrap().samples = vec![0.1_f32; 16_000];
        let first = rec.stop().expect("stop 1");

        // Clip names are epoch-millis; make sure the clock ticks over.
        std::thread::sleep(std::time::Duration::from_millis(2));

        rec.start().expect("start 2");
        sink.lock().unwrap().samples = vec![0.2_f32; 16_000];
        let second = rec.stop().expect("stop 2");

        assert_ne!(first.path, second.path);
        assert!(first.path.exists() && second.path.exists());
    }

    #[test]
    fn live_duration_tracks_sink_length() {
        let dir = tempdir().expect("temp dir");
        let (rec, sink) = recorder_with_dir(dir.path());

        rec.start().expect("start");
        assert_eq!(rec.duration_millis(), 0);

        sink.lock().unwrap().samples = vec![0.0_f32; 8_000]; // 0.5 s
        assert_eq!(rec.duration_millis(), 500);
    }

    #[test]
    fn feeder_ignores_chunks_while_inactive() {
        let sink = new_sample_sink();
        let (tx, rx) = mpsc::channel();
        spawn_chunk_feeder(rx, Arc::clone(&sink));

        tx.send(AudioChunk {
            samples: vec![0.5_f32; 480],
            sample_rate: 48_000,
            channels: 1,
        })
        .expect("send");
        drop(tx);

        // Give the feeder thread a moment to drain the channel.
        std::thread::sleep(std::time::Duration::from_millis(50));
        assert!(sink.lock().unwrap().samples.is_empty());
    }

    #[test]
    fn feeder_drops_audio_past_the_length_cap() {
        let dir = tempdir().expect("temp dir");
        let sink = new_sample_sink();
        // 10 ms cap → 160 samples at 16 kHz
        let rec = MicRecorder::new(Arc::clone(&sink), dir.path().to_path_buf(), 0.01);

        let (tx, rx) = mpsc::channel();
        spawn_chunk_feeder(rx, Arc::clone(&sink));
        rec.start().expect("start");

        // 30 ms of mono 16 kHz audio, well past the cap
        for _ in 0..3 {
            tx.send(AudioChunk {
                samples: vec![0.5_f32; 160],
                sample_rate: 16_000,
                channels: 1,
            })
            .expect("send");
        }
        drop(tx);

        std::thread::sleep(std::time::Duration::from_millis(50));
        assert_eq!(sink.lock().unwrap().samples.len(), 160);

        let clip = rec.stop().expect("stop");
        assert_eq!(clip.duration_millis, 10);
    }

    #[test]
    fn feeder_appends_resampled_chunks_while_active() {
        let sink = new_sample_sink();
        sink.lock().unwrap().active = true;

        let (tx, rx) = mpsc::channel();
        spawn_chunk_feeder(rx, Arc::clone(&sink));

        // 10 ms of stereo 48 kHz → 160 mono samples at 16 kHz
        tx.send(AudioChunk {
            samples: vec![0.5_f32; 960],
            sample_rate: 48_000,
            channels: 2,
        })
        .expect("send");
        drop(tx);

        std::thread::sleep(std::time::Duration::from_millis(50));
        assert_eq!(sink.lock().unwrap().samples.len(), 160);
    }
}
