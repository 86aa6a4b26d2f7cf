//! Recurrence evaluation: the predicate deciding whether an alarm fires now.
//!
//! `should_trigger` is a pure function of an alarm record and a wall-clock
//! instant. Every exit is fail-closed: disabled alarms, corrupt period
//! bounds, unrecognized recurrence kinds and empty time lists all evaluate to
//! "do not fire", so a damaged record can at worst stay silent. The scheduler
//! loop relies on that totality for its per-alarm isolation.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use log::warn;

use shared::{Alarm, Recurrence};

/// Format of `last_triggered` stamps (local time, second resolution).
pub const TRIGGER_STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render an instant into the stamp stored in `last_triggered`.
pub fn trigger_stamp(now: NaiveDateTime) -> String {
    now.format(TRIGGER_STAMP_FORMAT).to_string()
}

/// Decide whether `alarm` fires at `now`.
///
/// Checks run in short-circuit order: enabled flag, validity window,
/// time-of-day match, same-second dedup guard, then the recurrence rule
/// itself.
pub fn should_trigger(alarm: &Alarm, now: NaiveDateTime) -> bool {
    if !alarm.enabled {
        return false;
    }

    if let Some(raw) = alarm.period_start.as_deref() {
        match checked_bound(alarm, raw) {
            Some(start) if now < start => return false,
            Some(_) => {}
            None => return false,
        }
    }
    if let Some(raw) = alarm.period_end.as_deref() {
        match checked_bound(alarm, raw) {
            Some(end) if now > end => return false,
            Some(_) => {}
            None => return false,
        }
    }

    if alarm.times.is_empty() {
        return false;
    }
    let clock = now.format("%H:%M:%S").to_string();
    // Canonical specs are full 8-character times, making this an exact
    // comparison; the prefix form keeps hand-edited `HH:MM` entries in old
    // store files working.
    if !alarm.times.iter().any(|spec| clock.starts_with(spec.as_str())) {
        return false;
    }

    // One fire per alarm per second.
    if alarm.last_triggered == trigger_stamp(now) {
        return false;
    }

    match &alarm.schedule {
        Recurrence::Daily => true,
        Recurrence::Weekly { weekdays } => {
            weekdays.contains(&now.weekday().num_days_from_monday())
        }
        Recurrence::Monthly { day_of_month } => now.day() == *day_of_month,
        Recurrence::Yearly { month, day } => now.month() == *month && now.day() == *day,
        Recurrence::Interval {
            interval_days,
            interval_offsets,
        } => interval_position_matches(alarm, *interval_days, interval_offsets, now),
        Recurrence::Unknown => false,
    }
}

/// Interval rule: is `now` on an active position of the current window?
///
/// Windows are `interval_days` long and counted from the alarm's
/// `period_start` date. Positions are 1-based; an empty offset list means
/// "position 1 only". An interval alarm without any start date matches every
/// tick that survived the earlier checks.
fn interval_position_matches(
    alarm: &Alarm,
    interval_days: u32,
    offsets: &[u32],
    now: NaiveDateTime,
) -> bool {
    let interval = i64::from(interval_days.max(1));

    let raw_start = match alarm.period_start.as_deref() {
        Some(raw) => raw,
        None => return true,
    };
    let start = match checked_bound(alarm, raw_start) {
        Some(start) => start.date(),
        None => return false,
    };

    let delta_days = (now.date() - start).num_days();
    if delta_days < 0 {
        return false;
    }
    let position = delta_days % interval + 1;

    if offsets.is_empty() {
        position == 1
    } else {
        offsets.iter().any(|&offset| i64::from(offset) == position)
    }
}

/// Parse a period bound as a local naive timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, the `T`-separated variant, or a bare date
/// (taken as midnight).
pub(crate) fn parse_bound(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

fn checked_bound(alarm: &Alarm, raw: &str) -> Option<NaiveDateTime> {
    let parsed = parse_bound(raw);
    if parsed.is_none() {
        warn!(
            "Alarm {} has unparseable period bound {:?} - skipping it for this tick",
            alarm.id, raw
        );
    }
    parsed
}
