//! Settings snapshot read by the cleaner on every call.
//!
//! The snapshot is immutable. Changes arrive as a [`SettingsUpdate`] and
//! produce a fresh snapshot via [`Settings::apply`]; nothing is cached
//! between cleaning calls.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Options controlling how copied text is cleaned.
///
/// Serialized with the same camelCase keys the browser extension keeps in
/// sync storage, so a stored settings object can be loaded directly:
///
/// ```
/// use copyclean::{CleaningMode, Settings};
///
/// let settings = Settings::from_json(r#"{"mode":"conservative"}"#)?;
/// assert_eq!(settings.mode, CleaningMode::Conservative);
/// assert!(settings.protect_code_blocks);
/// # Ok::<(), copyclean::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Whether cleaning is active at all. Enforced by callers, not by [`crate::clean`].
    pub enabled: bool,

    /// Which rule set runs.
    pub mode: CleaningMode,

    /// Whether fenced and inline code spans are shielded from the rules.
    pub protect_code_blocks: bool,

    /// Whether cleaning events are reported at `info` level.
    pub show_notifications: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: CleaningMode::Aggressive,
            protect_code_blocks: true,
            show_notifications: true,
        }
    }
}

impl Settings {
    /// Creates new settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a settings snapshot from JSON. Missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the snapshot to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Sets the cleaning mode.
    pub fn with_mode(mut self, mode: CleaningMode) -> Self {
        self.mode = mode;
        self
    }

    /// Selects conservative mode (keep intentional links).
    pub fn conservative(self) -> Self {
        self.with_mode(CleaningMode::Conservative)
    }

    /// Selects aggressive mode (drop all links and URLs).
    pub fn aggressive(self) -> Self {
        self.with_mode(CleaningMode::Aggressive)
    }

    /// Lets the rules run over code spans too.
    pub fn without_code_protection(mut self) -> Self {
        self.protect_code_blocks = false;
        self
    }

    /// Silences cleaning notifications.
    pub fn quiet(mut self) -> Self {
        self.show_notifications = false;
        self
    }

    /// Marks the cleaner as switched off.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Returns a new snapshot with `update` applied on top of this one.
    pub fn apply(&self, update: &SettingsUpdate) -> Settings {
        Settings {
            enabled: update.enabled.unwrap_or(self.enabled),
            mode: update.mode.unwrap_or(self.mode),
            protect_code_blocks: update.protect_code_blocks.unwrap_or(self.protect_code_blocks),
            show_notifications: update.show_notifications.unwrap_or(self.show_notifications),
        }
    }
}

/// A partial change to the settings, as delivered by the storage change feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsUpdate {
    pub enabled: Option<bool>,
    pub mode: Option<CleaningMode>,
    pub protect_code_blocks: Option<bool>,
    pub show_notifications: Option<bool>,
}

impl SettingsUpdate {
    /// Builds an update from a loosely typed JSON payload.
    ///
    /// Fields carrying the wrong JSON type are ignored rather than rejected,
    /// so a malformed message can never knock the cleaner into a bad state.
    pub fn from_json_value(value: &serde_json::Value) -> Self {
        let flag = |key: &str| value.get(key).and_then(serde_json::Value::as_bool);

        Self {
            enabled: flag("enabled"),
            mode: value
                .get("mode")
                .and_then(serde_json::Value::as_str)
                .map(CleaningMode::from_name),
            protect_code_blocks: flag("protectCodeBlocks"),
            show_notifications: flag("showNotifications"),
        }
    }

    /// Returns true if the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.enabled.is_none()
            && self.mode.is_none()
            && self.protect_code_blocks.is_none()
            && self.show_notifications.is_none()
    }
}

/// Which rule set the cleaner runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CleaningMode {
    /// Remove citations plus every hyperlink and URL.
    #[default]
    Aggressive,
    /// Remove citation noise only; keep intentional inline links.
    Conservative,
}

impl CleaningMode {
    /// Resolves a mode name leniently: anything but "conservative" is aggressive.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("conservative") {
            CleaningMode::Conservative
        } else {
            CleaningMode::Aggressive
        }
    }

    /// Returns the canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CleaningMode::Aggressive => "aggressive",
            CleaningMode::Conservative => "conservative",
        }
    }
}

impl fmt::Display for CleaningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CleaningMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aggressive" => Ok(CleaningMode::Aggressive),
            "conservative" => Ok(CleaningMode::Conservative),
            other => Err(Error::UnknownMode(other.to_string())),
        }
    }
}

// Stored settings may carry mode names from other versions; those fall back
// to aggressive instead of failing the whole snapshot.
impl<'de> Deserialize<'de> for CleaningMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(CleaningMode::from_name(&name))
    }
}
