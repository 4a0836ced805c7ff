//! Microphone access gate.
//!
//! Desktop platforms have no central permission broker the way mobile OSes
//! do, so "permission" here means: can we actually open an input stream?
//! [`DeviceProbeGate`] answers that by probing the default cpal input device.
//!
//! [`PermissionGate`] is an async trait (the probe may block on the audio
//! host, and callers await it from the session command loop) implemented by
//! [`DeviceProbeGate`] and, in tests, by `MockPermissionGate`.

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait};
use thiserror::Error;

// ---------------------------------------------------------------------------
// PermissionStatus
// ---------------------------------------------------------------------------

/// Outcome of a permission check or request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionStatus {
    /// `true` when microphone capture is available to the process.
    pub granted: bool,
}

impl PermissionStatus {
    /// A granted status.
    pub fn granted() -> Self {
        Self { granted: true }
    }

    /// A denied status.
    pub fn denied() -> Self {
        Self { granted: false }
    }
}

// ---------------------------------------------------------------------------
// PermissionError
// ---------------------------------------------------------------------------

/// Errors raised while querying microphone availability.
#[derive(Debug, Clone, Error)]
pub enum PermissionError {
    /// The audio host rejected the probe (device busy, backend missing, …).
    #[error("microphone probe failed: {0}")]
    Probe(String),
}

// ---------------------------------------------------------------------------
// PermissionGate trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for the microphone access gate.
///
/// `status` answers "can we record right now?" — the session controller
/// queries it once at startup so the UI reflects microphone availability
/// before the user presses anything.  `request` actively (re-)probes the
/// platform and records the outcome.
#[async_trait]
pub trait PermissionGate: Send + Sync {
    /// Current permission state.  Implementations may probe the platform on
    /// the first call and answer from a cache afterwards.
    async fn status(&self) -> PermissionStatus;

    /// Actively request / re-probe microphone access.
    async fn request(&self) -> Result<PermissionStatus, PermissionError>;
}

// Compile-time assertion: Box<dyn PermissionGate> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn PermissionGate>) {}
};

// ---------------------------------------------------------------------------
// DeviceProbeGate
// ---------------------------------------------------------------------------

/// Production gate: microphone access is "granted" when the default input
/// device exists and reports a usable stream configuration.
///
/// The probe result is cached, so only the first `status` (or any `request`)
/// touches the audio host.
pub struct DeviceProbeGate {
    cached: std::sync::Mutex<Option<PermissionStatus>>,
}

impl DeviceProbeGate {
    pub fn new() -> Self {
        Self {
            cached: std::sync::Mutex::new(None),
        }
    }

    /// Synchronous probe of the default input device.
    fn probe() -> Result<PermissionStatus, PermissionError> {
        let host = cpal::default_host();
        let Some(device) = host.default_input_device() else {
            return Ok(PermissionStatus::denied());
        };

        match device.default_input_config() {
            Ok(config) => {
                log::debug!(
                    "input device probe ok: {} Hz, {} ch",
                    config.sample_rate().0,
                    config.channels()
                );
                Ok(PermissionStatus::granted())
            }
            Err(cpal::DefaultStreamConfigError::DeviceNotAvailable) => {
                Ok(PermissionStatus::denied())
            }
            Err(e) => Err(PermissionError::Probe(e.to_string())),
        }
    }
}

impl Default for DeviceProbeGate {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PermissionGate for DeviceProbeGate {
    async fn status(&self) -> PermissionStatus {
        if let Some(status) = *self.cached.lock().unwrap() {
            return status;
        }

        // First query: probe the audio host and remember the answer.  A
        // failed probe reads as denied but is not cached, so a later call
        // can still succeed.
        match tokio::task::spawn_blocking(Self::probe).await {
            Ok(Ok(status)) => {
                *self.cached.lock().unwrap() = Some(status);
                status
            }
            Ok(Err(e)) => {
                log::warn!("microphone probe failed: {e}");
                PermissionStatus::denied()
            }
            Err(e) => {
                log::warn!("microphone probe task failed: {e}");
                PermissionStatus::denied()
            }
        }
    }

    async fn request(&self) -> Result<PermissionStatus, PermissionError> {
        // The probe talks to the audio host; run it off the async executor.
        let status = tokio::task::spawn_blocking(Self::probe)
            .await
            .map_err(|e| PermissionError::Probe(e.to_string()))??;

        *self.cached.lock().unwrap() = Some(status);
        Ok(status)
    }
}

// ---------------------------------------------------------------------------
// MockPermissionGate  (test-only)
// ---------------------------------------------------------------------------

/// Test double with a fixed request outcome.
#[cfg(test)]
pub struct MockPermissionGate {
    outcome: Result<PermissionStatus, PermissionError>,
    granted: std::sync::Mutex<bool>,
}

#[cfg(test)]
impl MockPermissionGate {
    /// A gate whose `request` always grants.
    pub fn granting() -> Self {
        Self {
            outcome: Ok(PermissionStatus::granted()),
            granted: std::sync::Mutex::new(false),
        }
    }

    /// A gate whose `request` always denies.
    pub fn denying() -> Self {
        Self {
            outcome: Ok(PermissionStatus::denied()),
            granted: std::sync::Mutex::new(false),
        }
    }

    /// A gate that already reports granted before any `request` — the
    /// returning-user case where access was granted in an earlier run.
    pub fn already_granted() -> Self {
        Self {
            outcome: Ok(PermissionStatus::granted()),
            granted: std::sync::Mutex::new(true),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl PermissionGate for MockPermissionGate {
    async fn status(&self) -> PermissionStatus {
        if *self.granted.lock().unwrap() {
            PermissionStatus::granted()
        } else {
            PermissionStatus::denied()
        }
    }

    async fn request(&self) -> Result<PermissionStatus, PermissionError> {
        let status = self.outcome.clone()?;
        *self.granted.lock().unwrap() = status.granted;
        Ok(status)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
