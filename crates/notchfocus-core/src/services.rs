//! Collaborator contracts consumed by the session engine.
//!
//! Ambient-audio synthesis, notification delivery, and completion-sound
//! playback are platform services; the engine only speaks to them through
//! these traits. Failures are logged by the caller and never block
//! session timing.

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::session::SessionKind;

/// Generated ambient tracks offered during focus sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbientTrack {
    BrownNoise,
    Rain,
    Forest,
}

/// Ambient audio playback. `stop()` halts playback but does not clear
/// the track selection -- the selection survives so a later `play` of
/// the same track can resume the user's choice.
pub trait AmbientAudio {
    fn play(&mut self, track: AmbientTrack) -> Result<(), ServiceError>;
    fn stop(&mut self);
    /// Volume is clamped to `[0.0, 1.0]`.
    fn set_volume(&mut self, volume: f32);
    fn is_playing(&self) -> bool;
    fn selected_track(&self) -> Option<AmbientTrack>;
}

/// Session-completion notification delivery.
pub trait NotificationSink {
    fn send_session_completion(&self, kind: SessionKind) -> Result<(), ServiceError>;
}

/// The short chime played when an interval completes.
pub trait CompletionSound {
    fn play(&self) -> Result<(), ServiceError>;
}

/// Audio implementation with no DSP backend. Tracks playback state and
/// selection so the engine behaves identically headless.
#[derive(Debug, Default)]
pub struct NullAudio {
    playing: bool,
    track: Option<AmbientTrack>,
    volume: f32,
}

impl AmbientAudio for NullAudio {
    fn play(&mut self, track: AmbientTrack) -> Result<(), ServiceError> {
        self.track = Some(track);
        self.playing = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn selected_track(&self) -> Option<AmbientTrack> {
        self.track
    }
}

/// Notification sink that only logs.
#[derive(Debug, Default)]
pub struct NullNotifier;

impl NotificationSink for NullNotifier {
    fn send_session_completion(&self, kind: SessionKind) -> Result<(), ServiceError> {
        tracing::debug!(?kind, "session completion notification (no sink attached)");
        Ok(())
    }
}

/// Completion sound that does nothing.
#[derive(Debug, Default)]
pub struct NullChime;

impl CompletionSound for NullChime {
    fn play(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}

/// The collaborator bundle handed to the session engine at assembly.
pub struct Collaborators {
    pub audio: Box<dyn AmbientAudio>,
    pub notifier: Box<dyn NotificationSink>,
    pub chime: Box<dyn CompletionSound>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            audio: Box::new(NullAudio::default()),
            notifier: Box::new(NullNotifier),
            chime: Box::new(NullChime),
        }
    }
}
