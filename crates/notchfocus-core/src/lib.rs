//! # NotchFocus Core Library
//!
//! Core business logic for NotchFocus, a notch-anchored Pomodoro-style
//! focus companion. Everything lives here; the CLI binary (and any GUI
//! shell) is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Session engine**: a tick-driven state machine. The owning
//!   execution context calls `tick()` once per second; the engine never
//!   spawns timers of its own.
//! - **Settings**: TOML-backed preferences with clamped validation and
//!   change publication.
//! - **Progress**: SQLite-backed daily focus history with streak
//!   computation.
//! - **Services**: narrow traits for ambient audio, notifications, and
//!   the completion chime -- platform backends plug in at assembly.
//!
//! ## Key components
//!
//! - [`FocusSession`]: the session state machine
//! - [`SettingsStore`]: validated, persisted preferences
//! - [`ProgressStore`]: daily history and [`DailyStats`]
//! - [`UpdateChecker`]: release-metadata polling

pub mod error;
pub mod events;
pub mod progress;
pub mod services;
pub mod session;
pub mod settings;
pub mod storage;
pub mod update;

pub use error::{CoreError, ServiceError, SettingsError, StorageError, UpdateError};
pub use events::Event;
pub use progress::{Clock, DailyStats, ProgressStore, SystemClock};
pub use services::{
    AmbientAudio, AmbientTrack, Collaborators, CompletionSound, NotificationSink, NullAudio,
    NullChime, NullNotifier,
};
pub use session::{
    format_clock, FocusSession, PersistedSession, Preset, SessionKind, SessionState,
};
pub use settings::{CountdownStyle, DisplayTarget, SettingsSnapshot, SettingsStore};
pub use storage::{Database, ProgressRecord};
pub use update::{ReleaseInfo, UpdateChecker};
