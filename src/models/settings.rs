use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static REMINDER_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderCadence {
    #[default]
    Daily,
    Weekly,
}

/// The per-user settings document, stored as JSON in the `settings.data`
/// column. Wire names are camelCase to match the stored documents and the
/// API payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub send_reminders: bool,
    pub reminder_cadence: ReminderCadence,
    /// Local time-of-day "HH:MM". Only the hour is compared by the
    /// reminder evaluator; the minute is kept as configuration.
    pub reminder_time: String,
    /// IANA timezone identifier, e.g. "Europe/Paris".
    pub local_timezone: String,
    /// Watermark: the last local date for which a reminder was actually
    /// dispatched. Written by the scheduler after a confirmed send, and
    /// cleared when reminders are re-enabled.
    pub last_reminder_sent: Option<NaiveDate>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            send_reminders: false,
            reminder_cadence: ReminderCadence::Daily,
            reminder_time: "08:00".to_string(),
            local_timezone: "UTC".to_string(),
            last_reminder_sent: None,
        }
    }
}

/// A partial settings update from the settings endpoint. Unknown keys are
/// rejected at deserialization. `lastReminderSent` is deliberately not
/// patchable: the scheduler owns it, and the only user-driven write is the
/// reset performed by [`UserSettings::apply`] on re-enable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsPatch {
    pub send_reminders: Option<bool>,
    pub reminder_cadence: Option<ReminderCadence>,
    pub reminder_time: Option<String>,
    pub local_timezone: Option<String>,
}

impl SettingsPatch {
    /// Check field formats before the patch reaches the store.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref time) = self.reminder_time {
            if !REMINDER_TIME_RE.is_match(time) {
                return Err(format!("reminderTime must be \"HH:MM\", got {:?}", time));
            }
        }
        if let Some(ref tz) = self.local_timezone {
            if tz.parse::<chrono_tz::Tz>().is_err() {
                return Err(format!("localTimezone is not a known IANA zone: {:?}", tz));
            }
        }
        Ok(())
    }
}

impl UserSettings {
    /// Merge a partial update into this document. Fields absent from the
    /// patch keep their current values. Flipping `sendReminders` from
    /// false to true clears the watermark so the next qualifying period
    /// starts fresh.
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(enabled) = patch.send_reminders {
            if enabled && !self.send_reminders {
                self.last_reminder_sent = None;
            }
            self.send_reminders = enabled;
        }
        if let Some(cadence) = patch.reminder_cadence {
            self.reminder_cadence = cadence;
        }
        if let Some(time) = patch.reminder_time {
            self.reminder_time = time;
        }
        if let Some(tz) = patch.local_timezone {
            self.local_timezone = tz;
        }
    }
}
