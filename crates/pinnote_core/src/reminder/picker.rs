//! Time-of-day reminder selection.

use crate::clock::Clock;
use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone, Utc};

/// Resolves a picked `hour:minute` to the next matching instant.
///
/// Seconds and milliseconds are zeroed. When today's occurrence in `tz` is
/// not strictly after `now_ms`, the same time tomorrow is returned. Returns
/// `None` for an out-of-range hour/minute or an unrepresentable instant.
pub fn next_reminder_time<Tz: TimeZone>(
    now_ms: i64,
    hour: u32,
    minute: u32,
    tz: &Tz,
) -> Option<i64> {
    let picked = NaiveTime::from_hms_opt(hour, minute, 0)?;
    let now = DateTime::<Utc>::from_timestamp_millis(now_ms)?.with_timezone(tz);
    let today = now.date_naive();

    for day in [today, today.checked_add_signed(Duration::days(1))?] {
        let candidate = tz.from_local_datetime(&day.and_time(picked)).earliest();
        if let Some(candidate) = candidate {
            let candidate_ms = candidate.timestamp_millis();
            if candidate_ms > now_ms {
                return Some(candidate_ms);
            }
        }
    }
    None
}

/// [`next_reminder_time`] in the host's local time zone.
pub fn next_local_reminder_time(clock: &dyn Clock, hour: u32, minute: u32) -> Option<i64> {
    next_reminder_time(clock.now_ms(), hour, minute, &Local)
}
