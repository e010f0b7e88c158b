use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progress::DailyStats;
use crate::session::{Preset, SessionKind, SessionState};

/// Every state change in the engine produces an Event, delivered to
/// registered listeners and returned to the calling command. This is the
/// subscription surface a UI layer binds to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        kind: SessionKind,
        preset: Preset,
        duration_secs: u32,
        /// True when the auto-start countdown (not the user) started it.
        auto: bool,
        at: DateTime<Utc>,
    },
    SessionPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    SessionResumed {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        kind: SessionKind,
        rounds_completed: u32,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    /// Auto-start countdown decremented; fires once per second while a
    /// completed session waits to chain into the next one.
    AutoStartTick {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// A completed work session was added to the progress history.
    ProgressRecorded {
        stats: DailyStats,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: SessionState,
        preset: Preset,
        rounds_completed: u32,
        scheduled_secs: u32,
        display_time: String,
        progress: f64,
        auto_start_remaining: Option<u32>,
        at: DateTime<Utc>,
    },
}
