use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;

use crate::models::settings::{ReminderCadence, UserSettings};
use crate::reminders::clock::{local_date, local_hour, reminder_hour};

/// What the scheduler should do for one user at one instant. `Daily` and
/// `Weekly` are tentative: the orchestrator still consults the rating
/// ledger (a rated day suppresses the daily send, an empty missed-date
/// window suppresses the weekly one), and in neither suppressed case is
/// the watermark advanced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Skip,
    Daily {
        date: NaiveDate,
    },
    /// Monday-start window of 7 local days ending on the designated
    /// week-end day (Sunday).
    Weekly {
        week_start: NaiveDate,
        week_end: NaiveDate,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum EvaluateError {
    #[error("Unrecognized timezone: {0:?}")]
    UnknownTimezone(String),
    #[error("Unparseable reminder time: {0:?}")]
    BadReminderTime(String),
}

/// Decide whether `now` falls in a qualifying period for this user.
///
/// Pure: the same instant and settings always produce the same decision.
/// Only the hour of `reminderTime` is compared against the local clock;
/// the scheduler ticks hourly, so a reminder fires within the top of the
/// matching local hour and the configured minute is ignored.
///
/// A user who changes timezone between ticks may see one period skipped
/// or doubled; bounded by the hourly granularity and accepted.
pub fn evaluate(now: DateTime<Utc>, settings: &UserSettings) -> Result<Decision, EvaluateError> {
    let tz: Tz = settings
        .local_timezone
        .parse()
        .map_err(|_| EvaluateError::UnknownTimezone(settings.local_timezone.clone()))?;

    let hour = reminder_hour(&settings.reminder_time)
        .ok_or_else(|| EvaluateError::BadReminderTime(settings.reminder_time.clone()))?;

    if local_hour(now, tz) != hour {
        return Ok(Decision::Skip);
    }

    let today = local_date(now, tz);

    match settings.reminder_cadence {
        ReminderCadence::Daily => {
            if settings.last_reminder_sent == Some(today) {
                return Ok(Decision::Skip);
            }
            Ok(Decision::Daily { date: today })
        }
        ReminderCadence::Weekly => {
            if today.weekday() != Weekday::Sun {
                return Ok(Decision::Skip);
            }
            if settings.last_reminder_sent == Some(today) {
                return Ok(Decision::Skip);
            }
            let week_start = today
                .checked_sub_days(Days::new(6))
                .expect("date arithmetic stays in range");
            Ok(Decision::Weekly {
                week_start,
                week_end: today,
            })
        }
    }
}
