//! TOML-backed user preferences.
//!
//! Stored at `~/.config/notchfocus/settings.toml`. Every field has a
//! registered default, numeric inputs are clamped into their documented
//! ranges (never rejected), and each actual change persists immediately.
//! Listeners receive the full settings snapshot after each change;
//! writing a value equal to the current one publishes nothing.

use std::ops::RangeInclusive;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::session::Preset;
use crate::storage::data_dir;

/// Valid range for work-interval minutes.
pub const WORK_MINUTES: RangeInclusive<u32> = 1..=180;
/// Valid range for break-interval minutes.
pub const BREAK_MINUTES: RangeInclusive<u32> = 1..=90;

/// Which display the session window anchors to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayTarget {
    Main,
    Notched,
}

/// How the countdown is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownStyle {
    Number,
    Ring,
}

/// Per-preset interval durations, user-overridable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(default = "default_short_work")]
    pub short_work_min: u32,
    #[serde(default = "default_short_break")]
    pub short_break_min: u32,
    #[serde(default = "default_long_work")]
    pub long_work_min: u32,
    #[serde(default = "default_long_break")]
    pub long_break_min: u32,
}

/// Window/display preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_display_target")]
    pub target: DisplayTarget,
    /// Identifier of a preferred screen, when the user pinned one.
    #[serde(default)]
    pub preferred_screen: Option<String>,
    #[serde(default = "default_countdown_style")]
    pub countdown: CountdownStyle,
    #[serde(default = "default_true")]
    pub always_on_top: bool,
}

/// Session-chaining and launch behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorSettings {
    #[serde(default)]
    pub auto_start_next_interval: bool,
    #[serde(default)]
    pub launch_at_login: bool,
}

/// Completion-sound toggles. `on_break_completion` is a secondary gate
/// applied only when the completed interval was a break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundSettings {
    #[serde(default = "default_true")]
    pub on_session_completion: bool,
    #[serde(default = "default_true")]
    pub on_break_completion: bool,
}

/// The full settings snapshot. Owned exclusively by [`SettingsStore`];
/// mutation happens only through its setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    #[serde(default)]
    pub timers: TimerSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub behavior: BehaviorSettings,
    #[serde(default)]
    pub sounds: SoundSettings,
}

// Default functions
fn default_short_work() -> u32 {
    Preset::Short.work_min()
}
fn default_short_break() -> u32 {
    Preset::Short.break_min()
}
fn default_long_work() -> u32 {
    Preset::Long.work_min()
}
fn default_long_break() -> u32 {
    Preset::Long.break_min()
}
fn default_display_target() -> DisplayTarget {
    DisplayTarget::Notched
}
fn default_countdown_style() -> CountdownStyle {
    CountdownStyle::Number
}
fn default_true() -> bool {
    true
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            short_work_min: default_short_work(),
            short_break_min: default_short_break(),
            long_work_min: default_long_work(),
            long_break_min: default_long_break(),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            target: default_display_target(),
            preferred_screen: None,
            countdown: default_countdown_style(),
            always_on_top: true,
        }
    }
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        Self {
            auto_start_next_interval: false,
            launch_at_login: false,
        }
    }
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            on_session_completion: true,
            on_break_completion: true,
        }
    }
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        Self {
            timers: TimerSettings::default(),
            display: DisplaySettings::default(),
            behavior: BehaviorSettings::default(),
            sounds: SoundSettings::default(),
        }
    }
}

/// Clamp all numeric fields into their documented ranges. Returns true
/// if anything had to change (hand-edited or corrupted storage).
fn clamp_all(snapshot: &mut SettingsSnapshot) -> bool {
    let before = snapshot.clone();
    let t = &mut snapshot.timers;
    t.short_work_min = t.short_work_min.clamp(*WORK_MINUTES.start(), *WORK_MINUTES.end());
    t.long_work_min = t.long_work_min.clamp(*WORK_MINUTES.start(), *WORK_MINUTES.end());
    t.short_break_min = t.short_break_min.clamp(*BREAK_MINUTES.start(), *BREAK_MINUTES.end());
    t.long_break_min = t.long_break_min.clamp(*BREAK_MINUTES.start(), *BREAK_MINUTES.end());
    *snapshot != before
}

/// Validated, persisted user preferences.
pub struct SettingsStore {
    path: PathBuf,
    snapshot: SettingsSnapshot,
    listeners: Vec<Box<dyn Fn(&SettingsSnapshot)>>,
}

impl SettingsStore {
    /// Load from the default location, creating the file with defaults
    /// if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or if
    /// the default file cannot be written.
    pub fn load() -> Result<Self, SettingsError> {
        let path = data_dir()
            .map_err(|e| SettingsError::LoadFailed {
                path: PathBuf::new(),
                message: e.to_string(),
            })?
            .join("settings.toml");
        Self::load_from(path)
    }

    /// Load from an explicit path.
    ///
    /// # Errors
    /// Same conditions as [`SettingsStore::load`].
    pub fn load_from(path: PathBuf) -> Result<Self, SettingsError> {
        let snapshot = match std::fs::read_to_string(&path) {
            Ok(content) => {
                let mut snapshot: SettingsSnapshot = toml::from_str(&content)
                    .map_err(|e| SettingsError::ParseFailed(e.to_string()))?;
                if clamp_all(&mut snapshot) {
                    tracing::warn!(path = %path.display(), "settings file had out-of-range values, clamped");
                }
                snapshot
            }
            Err(_) => {
                let snapshot = SettingsSnapshot::default();
                write_snapshot(&path, &snapshot)?;
                snapshot
            }
        };
        Ok(Self {
            path,
            snapshot,
            listeners: Vec::new(),
        })
    }

    /// Load from the default location, falling back to in-memory
    /// defaults on any failure. Never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load settings, using defaults");
            Self {
                path: data_dir()
                    .map(|d| d.join("settings.toml"))
                    .unwrap_or_else(|_| PathBuf::from("settings.toml")),
                snapshot: SettingsSnapshot::default(),
                listeners: Vec::new(),
            }
        })
    }

    pub fn snapshot(&self) -> &SettingsSnapshot {
        &self.snapshot
    }

    /// Register a listener invoked with the new snapshot after each
    /// actual change.
    pub fn subscribe(&mut self, listener: impl Fn(&SettingsSnapshot) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // ── Typed getters ────────────────────────────────────────────────

    pub fn work_minutes(&self, preset: Preset) -> u32 {
        match preset {
            Preset::Short => self.snapshot.timers.short_work_min,
            Preset::Long => self.snapshot.timers.long_work_min,
        }
    }

    pub fn break_minutes(&self, preset: Preset) -> u32 {
        match preset {
            Preset::Short => self.snapshot.timers.short_break_min,
            Preset::Long => self.snapshot.timers.long_break_min,
        }
    }

    // ── Typed setters ────────────────────────────────────────────────
    //
    // Each setter clamps, skips storage and publication when the value
    // is unchanged, and otherwise mutates in memory, persists, and
    // publishes synchronously.

    pub fn set_work_minutes(&mut self, preset: Preset, minutes: u32) {
        let minutes = minutes.clamp(*WORK_MINUTES.start(), *WORK_MINUTES.end());
        let slot = match preset {
            Preset::Short => &mut self.snapshot.timers.short_work_min,
            Preset::Long => &mut self.snapshot.timers.long_work_min,
        };
        if *slot == minutes {
            return;
        }
        *slot = minutes;
        self.commit();
    }

    pub fn set_break_minutes(&mut self, preset: Preset, minutes: u32) {
        let minutes = minutes.clamp(*BREAK_MINUTES.start(), *BREAK_MINUTES.end());
        let slot = match preset {
            Preset::Short => &mut self.snapshot.timers.short_break_min,
            Preset::Long => &mut self.snapshot.timers.long_break_min,
        };
        if *slot == minutes {
            return;
        }
        *slot = minutes;
        self.commit();
    }

    pub fn set_display_target(&mut self, target: DisplayTarget) {
        if self.snapshot.display.target == target {
            return;
        }
        self.snapshot.display.target = target;
        self.commit();
    }

    pub fn set_preferred_screen(&mut self, screen: Option<String>) {
        if self.snapshot.display.preferred_screen == screen {
            return;
        }
        self.snapshot.display.preferred_screen = screen;
        self.commit();
    }

    pub fn set_countdown_style(&mut self, style: CountdownStyle) {
        if self.snapshot.display.countdown == style {
            return;
        }
        self.snapshot.display.countdown = style;
        self.commit();
    }

    pub fn set_always_on_top(&mut self, on: bool) {
        if self.snapshot.display.always_on_top == on {
            return;
        }
        self.snapshot.display.always_on_top = on;
        self.commit();
    }

    pub fn set_auto_start_next_interval(&mut self, on: bool) {
        if self.snapshot.behavior.auto_start_next_interval == on {
            return;
        }
        self.snapshot.behavior.auto_start_next_interval = on;
        self.commit();
    }

    pub fn set_launch_at_login(&mut self, on: bool) {
        if self.snapshot.behavior.launch_at_login == on {
            return;
        }
        self.snapshot.behavior.launch_at_login = on;
        self.commit();
    }

    pub fn set_sound_on_session_completion(&mut self, on: bool) {
        if self.snapshot.sounds.on_session_completion == on {
            return;
        }
        self.snapshot.sounds.on_session_completion = on;
        self.commit();
    }

    pub fn set_sound_on_break_completion(&mut self, on: bool) {
        if self.snapshot.sounds.on_break_completion == on {
            return;
        }
        self.snapshot.sounds.on_break_completion = on;
        self.commit();
    }

    /// Restore every field to its built-in default in one call and
    /// persist all of them.
    pub fn reset_to_default(&mut self) {
        self.snapshot = SettingsSnapshot::default();
        self.commit();
    }

    // ── Dot-path surface (CLI) ───────────────────────────────────────

    /// Get a settings value as a string by dot-separated key, e.g.
    /// `display.always_on_top`.
    pub fn get_by_key(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(&self.snapshot).ok()?;
        let value = lookup_path(&json, key)?;
        match value {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a settings value by dot-separated key. The parsed snapshot
    /// goes through the same clamp pass as the typed setters.
    ///
    /// # Errors
    /// Returns an error if the key is unknown or the value cannot be
    /// parsed as the field's type.
    pub fn set_by_key(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut json =
            serde_json::to_value(&self.snapshot).map_err(|e| SettingsError::ParseFailed(e.to_string()))?;
        assign_path(&mut json, key, value)?;
        let mut updated: SettingsSnapshot =
            serde_json::from_value(json).map_err(|e| SettingsError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        clamp_all(&mut updated);
        if updated == self.snapshot {
            return Ok(());
        }
        self.snapshot = updated;
        self.commit();
        Ok(())
    }

    fn commit(&mut self) {
        if let Err(e) = write_snapshot(&self.path, &self.snapshot) {
            // Degrade gracefully: the in-memory value is authoritative
            // for this process; the next successful write catches up.
            tracing::warn!(error = %e, "failed to persist settings");
        }
        for listener in &self.listeners {
            listener(&self.snapshot);
        }
    }
}

fn write_snapshot(path: &PathBuf, snapshot: &SettingsSnapshot) -> Result<(), SettingsError> {
    let content = toml::to_string_pretty(snapshot).map_err(|e| SettingsError::SaveFailed {
        path: path.clone(),
        message: e.to_string(),
    })?;
    std::fs::write(path, content).map_err(|e| SettingsError::SaveFailed {
        path: path.clone(),
        message: e.to_string(),
    })
}

fn lookup_path<'a>(root: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
    if key.is_empty() {
        return None;
    }
    let mut current = root;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn assign_path(
    root: &mut serde_json::Value,
    key: &str,
    value: &str,
) -> Result<(), SettingsError> {
    let unknown = || SettingsError::UnknownKey(key.to_string());
    let invalid = |message: String| SettingsError::InvalidValue {
        key: key.to_string(),
        message,
    };

    let Some((parents, leaf)) = split_leaf(key) else {
        return Err(unknown());
    };

    let mut current = root;
    for part in parents {
        current = current.get_mut(part).ok_or_else(unknown)?;
    }
    let obj = current.as_object_mut().ok_or_else(unknown)?;
    let existing = obj.get(leaf).ok_or_else(unknown)?;

    // Parse the incoming string according to the field's current type.
    let new_value = match existing {
        serde_json::Value::Bool(_) => serde_json::Value::Bool(
            value
                .parse::<bool>()
                .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
        ),
        serde_json::Value::Number(_) => {
            let n = value
                .parse::<u64>()
                .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
            serde_json::Value::Number(n.into())
        }
        serde_json::Value::Null | serde_json::Value::String(_) => {
            if value.is_empty() || value == "null" {
                serde_json::Value::Null
            } else {
                serde_json::Value::String(value.to_string())
            }
        }
        _ => return Err(invalid("unsupported field type".into())),
    };

    obj.insert(leaf.to_string(), new_value);
    Ok(())
}

fn split_leaf(key: &str) -> Option<(Vec<&str>, &str)> {
    let mut parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    let leaf = parts.pop()?;
    Some((parts, leaf))
}
