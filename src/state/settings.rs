//! User settings record

use serde::{Deserialize, Serialize};

/// Highest accepted warning threshold, in seconds
pub const MAX_WARNING_SECONDS: u32 = 60;

/// Colour theme of the display layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Flat settings record persisted alongside the queue.
///
/// Fields missing from a stored record take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    pub muted: bool,
    pub voice_enabled: bool,
    /// Voice identifier such as `en-US` or `nl-NL`
    pub voice: Option<String>,
    pub warning_seconds: u32,
}

impl Settings {
    /// Check host-side constraints before accepting an update
    pub fn validate(&self) -> Result<(), String> {
        if self.warning_seconds > MAX_WARNING_SECONDS {
            return Err(format!(
                "warning_seconds must be between 0 and {}, got {}",
                MAX_WARNING_SECONDS, self.warning_seconds
            ));
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            muted: false,
            voice_enabled: false,
            voice: None,
            warning_seconds: 5,
        }
    }
}
