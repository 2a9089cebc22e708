//! Per-user settings (a singleton on the server side)

use serde::{Deserialize, Serialize};

use crate::event::default_reminder;

/// The user's settings.
///
/// There is exactly one of these per user. Saves replace it wholesale: the client sends
/// every field, and takes its local copy back from the server's echo of the saved record
/// (the server may normalize fields, so the submitted payload is not trusted as-is).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_reminder")]
    pub default_reminder_minutes: u32,
    #[serde(default)]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub daily_summary_enabled: bool,
    /// Time of day for the daily summary, as `HH:MM`
    #[serde(default = "default_summary_time")]
    pub daily_summary_time: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            default_reminder_minutes: default_reminder(),
            notifications_enabled: false,
            daily_summary_enabled: false,
            daily_summary_time: default_summary_time(),
        }
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_summary_time() -> String {
    "08:00".to_string()
}
