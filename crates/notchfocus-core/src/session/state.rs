use serde::{Deserialize, Serialize};

/// Whether an interval is focused work or rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Work,
    Break,
}

impl SessionKind {
    pub fn is_work(self) -> bool {
        matches!(self, SessionKind::Work)
    }
}

/// Session lifecycle state. `remaining_secs` is non-negative by
/// construction; transitions happen only through [`FocusSession`]
/// operations.
///
/// [`FocusSession`]: crate::session::FocusSession
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Running { remaining_secs: u32, kind: SessionKind },
    Paused { remaining_secs: u32, kind: SessionKind },
    Completed { kind: SessionKind },
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused { .. })
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// The interval kind, if a session is underway or just finished.
    pub fn kind(&self) -> Option<SessionKind> {
        match self {
            Self::Idle => None,
            Self::Running { kind, .. } | Self::Paused { kind, .. } | Self::Completed { kind } => {
                Some(*kind)
            }
        }
    }

    /// Remaining seconds while running or paused.
    pub fn remaining_secs(&self) -> Option<u32> {
        match self {
            Self::Running { remaining_secs, .. } | Self::Paused { remaining_secs, .. } => {
                Some(*remaining_secs)
            }
            _ => None,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Built-in interval presets. The durations here are compile-time
/// defaults; user overrides for work/break minutes live in the settings
/// store. The long-break duration is fixed per preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Short,
    Long,
}

impl Preset {
    pub const fn work_min(self) -> u32 {
        match self {
            Preset::Short => 25,
            Preset::Long => 50,
        }
    }

    pub const fn break_min(self) -> u32 {
        match self {
            Preset::Short => 5,
            Preset::Long => 10,
        }
    }

    pub const fn long_break_min(self) -> u32 {
        match self {
            Preset::Short => 15,
            Preset::Long => 20,
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Preset::Short
    }
}

/// Format a second count as `MM:SS` (minutes are not wrapped, so a
/// 3-hour session reads `180:00`).
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_defaults() {
        assert_eq!(Preset::Short.work_min(), 25);
        assert_eq!(Preset::Short.break_min(), 5);
        assert_eq!(Preset::Short.long_break_min(), 15);
        assert_eq!(Preset::Long.work_min(), 50);
        assert_eq!(Preset::Long.break_min(), 10);
        assert_eq!(Preset::Long.long_break_min(), 20);
    }

    #[test]
    fn state_predicates() {
        let running = SessionState::Running {
            remaining_secs: 60,
            kind: SessionKind::Work,
        };
        assert!(running.is_running());
        assert!(!running.is_idle());
        assert_eq!(running.kind(), Some(SessionKind::Work));
        assert_eq!(running.remaining_secs(), Some(60));

        assert!(SessionState::Idle.is_idle());
        assert_eq!(SessionState::Idle.kind(), None);
        assert_eq!(SessionState::Idle.remaining_secs(), None);
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(25 * 60), "25:00");
        assert_eq!(format_clock(180 * 60), "180:00");
        assert_eq!(format_clock(5 * 60 + 7), "05:07");
    }

    #[test]
    fn state_serializes_with_phase_tag() {
        let state = SessionState::Paused {
            remaining_secs: 90,
            kind: SessionKind::Break,
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"phase\":\"paused\""));
        assert!(json.contains("\"kind\":\"break\""));
        let back: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
