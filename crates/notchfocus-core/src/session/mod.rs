mod machine;
mod state;

pub use machine::{FocusSession, PersistedSession, AUTO_START_SECS, ROUNDS_PER_LONG_BREAK};
pub use state::{format_clock, Preset, SessionKind, SessionState};
