use chrono::{DateTime, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;

/// The calendar date a user in `tz` would read off their wall clock at
/// instant `now`. Every local-date comparison in the reminder engine and
/// the rating ledger goes through this one function.
pub fn local_date(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// The wall-clock hour (0..=23) in `tz` at instant `now`.
pub fn local_hour(now: DateTime<Utc>, tz: Tz) -> u32 {
    now.with_timezone(&tz).hour()
}

/// Extract the hour from a "HH:MM" reminder time. The minute component is
/// accepted as configuration but not returned: the scheduler ticks once
/// an hour, so only the hour takes part in eligibility.
pub fn reminder_hour(reminder_time: &str) -> Option<u32> {
    let (hour, minute) = reminder_time.split_once(':')?;
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some(hour)
}
