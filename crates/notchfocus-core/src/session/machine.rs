//! The focus-session state machine.
//!
//! ## State transitions
//!
//! ```text
//! Idle -> Running -> (Paused <-> Running) -> Completed -> Running(next) -> ...
//!          |                                    |
//!          +------------- reset ---------------+--> Idle
//! ```
//!
//! The engine has no internal timer. The owning execution context calls
//! `tick()` once per second; everything else (auto-start countdown, the
//! completion flash, interval completion) derives from that single tick
//! source, so no two timers can ever coexist.
//!
//! Every operation is a total function over the state space: calls from
//! an invalid source state return `None` and change nothing. Callers
//! gate UI affordances with the `can_*` predicates.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::progress::ProgressStore;
use crate::services::{AmbientAudio, Collaborators, CompletionSound, NotificationSink};
use crate::settings::SettingsStore;

use super::state::{format_clock, Preset, SessionKind, SessionState};

/// Seconds the auto-start countdown runs after a completion.
pub const AUTO_START_SECS: u32 = 10;
/// Completed work sessions before the next break becomes a long break.
pub const ROUNDS_PER_LONG_BREAK: u32 = 4;

const COMPLETION_FLASH_MS: u32 = 1500;
const TICK_MS: u32 = 1000;

/// The transient machine state that survives across process restarts.
/// Settings and progress have their own stores; this is everything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub state: SessionState,
    pub preset: Preset,
    pub rounds_completed: u32,
    pub scheduled_secs: u32,
    pub auto_start_remaining: Option<u32>,
}

/// Focus-session engine: lifecycle, work/break sequencing, round
/// counting, and the auto-start countdown. Owns the settings and
/// progress stores and speaks to platform services through the
/// collaborator traits.
pub struct FocusSession {
    state: SessionState,
    preset: Preset,
    rounds_completed: u32,
    /// Originally scheduled duration of the current (or just-completed)
    /// interval, in seconds.
    scheduled_secs: u32,
    auto_start_remaining: Option<u32>,
    /// Completion-flash countdown in milliseconds, drained by ticks.
    flash_remaining_ms: u32,
    settings: SettingsStore,
    progress: ProgressStore,
    audio: Box<dyn AmbientAudio>,
    notifier: Box<dyn NotificationSink>,
    chime: Box<dyn CompletionSound>,
    listeners: Vec<Box<dyn Fn(&Event)>>,
}

impl FocusSession {
    pub fn new(settings: SettingsStore, progress: ProgressStore, services: Collaborators) -> Self {
        Self {
            state: SessionState::Idle,
            preset: Preset::default(),
            rounds_completed: 0,
            scheduled_secs: 0,
            auto_start_remaining: None,
            flash_remaining_ms: 0,
            settings,
            progress,
            audio: services.audio,
            notifier: services.notifier,
            chime: services.chime,
            listeners: Vec::new(),
        }
    }

    /// Rebuild the engine from a persisted snapshot.
    pub fn restore(
        persisted: PersistedSession,
        settings: SettingsStore,
        progress: ProgressStore,
        services: Collaborators,
    ) -> Self {
        let mut session = Self::new(settings, progress, services);
        session.state = persisted.state;
        session.preset = persisted.preset;
        session.rounds_completed = persisted.rounds_completed;
        session.scheduled_secs = persisted.scheduled_secs;
        session.auto_start_remaining = persisted.auto_start_remaining;
        session
    }

    pub fn persisted(&self) -> PersistedSession {
        PersistedSession {
            state: self.state,
            preset: self.preset,
            rounds_completed: self.rounds_completed,
            scheduled_secs: self.scheduled_secs,
            auto_start_remaining: self.auto_start_remaining,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    pub fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }

    pub fn scheduled_secs(&self) -> u32 {
        self.scheduled_secs
    }

    pub fn auto_start_remaining(&self) -> Option<u32> {
        self.auto_start_remaining
    }

    /// Brief completion flag for UI feedback; clears itself 1.5 s after
    /// an interval completes.
    pub fn is_session_complete(&self) -> bool {
        self.flash_remaining_ms > 0
    }

    pub fn can_start(&self) -> bool {
        self.state.is_idle()
    }

    pub fn can_pause(&self) -> bool {
        self.state.is_running()
    }

    pub fn can_resume(&self) -> bool {
        self.state.is_paused()
    }

    pub fn can_start_next(&self) -> bool {
        self.state.is_completed()
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsStore {
        &mut self.settings
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn audio(&self) -> &dyn AmbientAudio {
        self.audio.as_ref()
    }

    pub fn audio_mut(&mut self) -> &mut dyn AmbientAudio {
        self.audio.as_mut()
    }

    /// Seconds the countdown display shows for the current state:
    /// the work duration while idle, the live remainder while running or
    /// paused, and the *next* interval's duration once completed.
    pub fn display_secs(&self) -> u32 {
        match self.state {
            SessionState::Idle => self.settings.work_minutes(self.preset) * 60,
            SessionState::Running { remaining_secs, .. }
            | SessionState::Paused { remaining_secs, .. } => remaining_secs,
            SessionState::Completed { .. } => {
                self.next_plan().map(|(_, secs)| secs).unwrap_or(0)
            }
        }
    }

    /// `MM:SS` rendering of [`display_secs`](Self::display_secs).
    pub fn display_time(&self) -> String {
        format_clock(self.display_secs())
    }

    /// Progress-ring fill in `[0, 1]`; exactly 1.0 once completed.
    pub fn progress_fraction(&self) -> f64 {
        match self.state {
            SessionState::Completed { .. } => 1.0,
            SessionState::Running { remaining_secs, .. }
            | SessionState::Paused { remaining_secs, .. } => {
                if self.scheduled_secs == 0 {
                    0.0
                } else {
                    (1.0 - remaining_secs as f64 / self.scheduled_secs as f64).clamp(0.0, 1.0)
                }
            }
            SessionState::Idle => 0.0,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            preset: self.preset,
            rounds_completed: self.rounds_completed,
            scheduled_secs: self.scheduled_secs,
            display_time: self.display_time(),
            progress: self.progress_fraction(),
            auto_start_remaining: self.auto_start_remaining,
            at: Utc::now(),
        }
    }

    /// Register a listener invoked on every published event.
    pub fn subscribe(&mut self, listener: impl Fn(&Event) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a fresh run with the given preset. Valid only from `Idle`;
    /// resets the round counter.
    pub fn start_session(&mut self, preset: Preset) -> Option<Event> {
        if !self.state.is_idle() {
            return None;
        }
        self.preset = preset;
        self.rounds_completed = 0;
        self.auto_start_remaining = None;
        self.scheduled_secs = self.settings.work_minutes(preset) * 60;
        self.state = SessionState::Running {
            remaining_secs: self.scheduled_secs,
            kind: SessionKind::Work,
        };
        let event = Event::SessionStarted {
            kind: SessionKind::Work,
            preset,
            duration_secs: self.scheduled_secs,
            auto: false,
            at: Utc::now(),
        };
        self.emit(&event);
        Some(event)
    }

    /// Valid only while running; preserves the remaining seconds.
    pub fn pause_session(&mut self) -> Option<Event> {
        let SessionState::Running {
            remaining_secs,
            kind,
        } = self.state
        else {
            return None;
        };
        self.state = SessionState::Paused {
            remaining_secs,
            kind,
        };
        let event = Event::SessionPaused {
            remaining_secs,
            at: Utc::now(),
        };
        self.emit(&event);
        Some(event)
    }

    /// Valid only while paused; resumes from the preserved remainder.
    pub fn resume_session(&mut self) -> Option<Event> {
        let SessionState::Paused {
            remaining_secs,
            kind,
        } = self.state
        else {
            return None;
        };
        self.state = SessionState::Running {
            remaining_secs,
            kind,
        };
        let event = Event::SessionResumed {
            remaining_secs,
            at: Utc::now(),
        };
        self.emit(&event);
        Some(event)
    }

    /// Back to `Idle` from any non-idle state: clears the round counter,
    /// any pending auto-start countdown, and stops ambient audio.
    pub fn reset_session(&mut self) -> Option<Event> {
        if self.state.is_idle() {
            return None;
        }
        self.state = SessionState::Idle;
        self.rounds_completed = 0;
        self.scheduled_secs = 0;
        self.auto_start_remaining = None;
        self.flash_remaining_ms = 0;
        self.audio.stop();
        let event = Event::SessionReset { at: Utc::now() };
        self.emit(&event);
        Some(event)
    }

    /// Advance from `Completed` into the next interval per the
    /// sequencing rule. Cancels any active auto-start countdown.
    pub fn start_next_session(&mut self) -> Option<Event> {
        self.advance(false)
    }

    /// One-second tick from the owning context. Decrements the running
    /// remainder (completing the interval at zero), drains the
    /// completion flash, and drives the auto-start countdown.
    pub fn tick(&mut self) -> Option<Event> {
        self.flash_remaining_ms = self.flash_remaining_ms.saturating_sub(TICK_MS);
        match self.state {
            SessionState::Running {
                remaining_secs,
                kind,
            } => {
                let remaining = remaining_secs.saturating_sub(1);
                if remaining == 0 {
                    self.complete_session(kind)
                } else {
                    self.state = SessionState::Running {
                        remaining_secs: remaining,
                        kind,
                    };
                    None
                }
            }
            SessionState::Completed { .. } => match self.auto_start_remaining {
                Some(n) if n <= 1 => self.advance(true),
                Some(n) => {
                    let remaining = n - 1;
                    self.auto_start_remaining = Some(remaining);
                    let event = Event::AutoStartTick {
                        remaining_secs: remaining,
                        at: Utc::now(),
                    };
                    self.emit(&event);
                    Some(event)
                }
                None => None,
            },
            _ => None,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// The next interval implied by the just-completed one: a break
    /// after work (long break once [`ROUNDS_PER_LONG_BREAK`] rounds have
    /// accumulated), work after any break.
    fn next_plan(&self) -> Option<(SessionKind, u32)> {
        let SessionState::Completed { kind } = self.state else {
            return None;
        };
        Some(match kind {
            SessionKind::Work => {
                let secs = if self.rounds_completed >= ROUNDS_PER_LONG_BREAK {
                    self.preset.long_break_min() * 60
                } else {
                    self.settings.break_minutes(self.preset) * 60
                };
                (SessionKind::Break, secs)
            }
            SessionKind::Break => (
                SessionKind::Work,
                self.settings.work_minutes(self.preset) * 60,
            ),
        })
    }

    fn advance(&mut self, auto: bool) -> Option<Event> {
        let SessionState::Completed { kind: completed } = self.state else {
            return None;
        };
        let (next_kind, duration_secs) = self.next_plan()?;
        // The round counter resets the moment a long break is entered.
        if completed.is_work() && self.rounds_completed >= ROUNDS_PER_LONG_BREAK {
            self.rounds_completed = 0;
        }
        self.auto_start_remaining = None;
        self.scheduled_secs = duration_secs;
        self.state = SessionState::Running {
            remaining_secs: duration_secs,
            kind: next_kind,
        };
        let event = Event::SessionStarted {
            kind: next_kind,
            preset: self.preset,
            duration_secs,
            auto,
            at: Utc::now(),
        };
        self.emit(&event);
        Some(event)
    }

    fn complete_session(&mut self, kind: SessionKind) -> Option<Event> {
        self.flash_remaining_ms = COMPLETION_FLASH_MS;

        if kind.is_work() {
            let minutes = self.scheduled_secs / 60;
            if minutes > 0 {
                match self.progress.record_session_completion(minutes) {
                    Ok(stats) => {
                        let event = Event::ProgressRecorded {
                            stats,
                            at: Utc::now(),
                        };
                        self.emit(&event);
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to record completed session")
                    }
                }
            }
            self.rounds_completed += 1;
        }

        self.audio.stop();

        if let Err(err) = self.notifier.send_session_completion(kind) {
            tracing::warn!(error = %err, "session completion notification failed");
        }
        if self.completion_sound_enabled(kind) {
            if let Err(err) = self.chime.play() {
                tracing::warn!(error = %err, "completion sound failed");
            }
        }

        self.state = SessionState::Completed { kind };
        if self.settings.snapshot().behavior.auto_start_next_interval {
            self.auto_start_remaining = Some(AUTO_START_SECS);
        }

        let event = Event::SessionCompleted {
            kind,
            rounds_completed: self.rounds_completed,
            at: Utc::now(),
        };
        self.emit(&event);
        Some(event)
    }

    fn completion_sound_enabled(&self, kind: SessionKind) -> bool {
        let sounds = &self.settings.snapshot().sounds;
        sounds.on_session_completion && (kind.is_work() || sounds.on_break_completion)
    }

    fn emit(&self, event: &Event) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}
