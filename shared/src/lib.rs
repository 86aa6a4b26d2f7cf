//! Shared types for the calendar alarm clock.
//!
//! Everything that crosses the boundary between the backend and a client
//! (REST consumer, future desktop shell) lives here: the persisted `Alarm`
//! record, its recurrence rule, and the request/response types of the alarm
//! API. The backend crate owns all behavior; this crate is data only.

use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

fn default_interval_days() -> u32 {
    1
}

/// A user-defined recurring alarm.
///
/// Serialized as a single flat JSON object: the `schedule` field is flattened
/// so the stored record carries a `recurrence` tag plus only the fields that
/// kind actually uses, which keeps the on-disk file hand-editable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alarm {
    /// Opaque UUID, generated once at creation and immutable afterwards.
    #[serde(default)]
    pub id: String,
    /// Display label shown in notifications.
    #[serde(default)]
    pub name: String,
    /// Recurrence rule deciding on which days this alarm may fire.
    #[serde(flatten)]
    pub schedule: Recurrence,
    /// Canonical `HH:MM:SS` trigger times. An empty list never fires.
    #[serde(default)]
    pub times: Vec<String>,
    /// Disabled alarms are skipped entirely by the scheduler.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Start of the validity window (local time, inclusive). `start_date` is
    /// accepted as a legacy spelling from older store files.
    #[serde(default, alias = "start_date", skip_serializing_if = "Option::is_none")]
    pub period_start: Option<String>,
    /// End of the validity window (local time, inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_end: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS` stamp of the most recent fire, or empty.
    /// This is the sole duplicate-fire guard, at one-second resolution.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_triggered: String,
}

/// Closed set of recurrence kinds.
///
/// Each case carries only the fields that kind evaluates. Stored data with an
/// unrecognized `recurrence` tag lands on `Unknown`, which never fires, so a
/// hand-edited record cannot take the rest of the store file down with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "recurrence", rename_all = "lowercase")]
pub enum Recurrence {
    /// Fire every day at the configured times.
    Daily,
    /// Fire on the listed weekdays (Monday = 0 .. Sunday = 6).
    Weekly {
        #[serde(default)]
        weekdays: Vec<u32>,
    },
    /// Fire on one day of every month (1-31).
    Monthly {
        #[serde(default)]
        day_of_month: u32,
    },
    /// Fire on one calendar date every year.
    Yearly {
        #[serde(default)]
        month: u32,
        #[serde(default)]
        day: u32,
    },
    /// Fire on selected positions inside a repeating window of
    /// `interval_days` days, counted from the alarm's `period_start`.
    Interval {
        #[serde(default = "default_interval_days")]
        interval_days: u32,
        /// 1-based positions inside the window. Empty means position 1 only.
        #[serde(default)]
        interval_offsets: Vec<u32>,
    },
    /// Catch-all for unrecognized tags in stored data. Never fires.
    #[serde(other)]
    Unknown,
}

impl Recurrence {
    /// Upper bound on distinct `interval_offsets` entries.
    pub const MAX_INTERVAL_OFFSETS: usize = 5;

    /// Stable lowercase label of this recurrence kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Recurrence::Daily => "daily",
            Recurrence::Weekly { .. } => "weekly",
            Recurrence::Monthly { .. } => "monthly",
            Recurrence::Yearly { .. } => "yearly",
            Recurrence::Interval { .. } => "interval",
            Recurrence::Unknown => "unknown",
        }
    }

    /// Check whether a weekday index is in the supported Monday=0..Sunday=6
    /// range.
    pub fn is_valid_weekday(value: u32) -> bool {
        value <= 6
    }
}

/// Draft submitted by a client to create a new alarm.
///
/// The draft is deliberately flat: a dialog or HTTP client fills in whichever
/// fields apply to the chosen recurrence kind, and the backend enforces the
/// typed `Recurrence` at construction time. `times` is a single
/// comma-separated string of `HH:MM` / `HH:MM:SS` tokens, exactly as a user
/// types them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAlarmRequest {
    #[serde(default)]
    pub name: String,
    pub recurrence: String,
    pub times: String,
    #[serde(default)]
    pub weekdays: Option<Vec<u32>>,
    #[serde(default)]
    pub day_of_month: Option<u32>,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub day: Option<u32>,
    #[serde(default)]
    pub interval_days: Option<u32>,
    #[serde(default)]
    pub interval_offsets: Option<Vec<u32>>,
    #[serde(default)]
    pub period_start: Option<String>,
    #[serde(default)]
    pub period_end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmListResponse {
    pub alarms: Vec<Alarm>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_alarm(schedule: Recurrence) -> Alarm {
        Alarm {
            id: "a2c3a9be-0000-4000-8000-000000000001".to_string(),
            name: "Medication".to_string(),
            schedule,
            times: vec!["09:00:00".to_string(), "21:30:00".to_string()],
            enabled: true,
            period_start: Some("2025-01-01 00:00:00".to_string()),
            period_end: None,
            last_triggered: String::new(),
        }
    }

    #[test]
    fn weekly_alarm_serializes_flat() {
        let alarm = sample_alarm(Recurrence::Weekly { weekdays: vec![0, 2] });
        let json = serde_json::to_value(&alarm).unwrap();

        assert_eq!(json["recurrence"], "weekly");
        assert_eq!(json["weekdays"], serde_json::json!([0, 2]));
        // Fields belonging to other recurrence kinds must not appear.
        assert!(json.get("day_of_month").is_none());
        assert!(json.get("interval_days").is_none());
        // Absent optional fields are omitted, not null.
        assert!(json.get("period_end").is_none());
        assert!(json.get("last_triggered").is_none());
    }

    #[test]
    fn alarm_round_trips_through_json() {
        let alarm = sample_alarm(Recurrence::Interval {
            interval_days: 5,
            interval_offsets: vec![1, 3],
        });
        let json = serde_json::to_string(&alarm).unwrap();
        let back: Alarm = serde_json::from_str(&json).unwrap();
        assert_eq!(back, alarm);
    }

    #[test]
    fn unknown_recurrence_tag_parses_to_unknown() {
        let json = r#"{
            "id": "x",
            "name": "mystery",
            "recurrence": "fortnightly",
            "times": ["12:00:00"],
            "enabled": true
        }"#;
        let alarm: Alarm = serde_json::from_str(json).unwrap();
        assert_eq!(alarm.schedule, Recurrence::Unknown);
    }

    #[test]
    fn legacy_start_date_field_is_accepted() {
        let json = r#"{
            "id": "x",
            "name": "old",
            "recurrence": "interval",
            "interval_days": 3,
            "times": ["08:00:00"],
            "start_date": "2025-01-01"
        }"#;
        let alarm: Alarm = serde_json::from_str(json).unwrap();
        assert_eq!(alarm.period_start.as_deref(), Some("2025-01-01"));
        assert!(alarm.enabled, "enabled defaults to true");
    }

    #[test]
    fn missing_variant_fields_fall_back_to_defaults() {
        let json = r#"{"id": "x", "name": "bare", "recurrence": "weekly", "times": []}"#;
        let alarm: Alarm = serde_json::from_str(json).unwrap();
        assert_eq!(alarm.schedule, Recurrence::Weekly { weekdays: vec![] });

        let json = r#"{"id": "x", "name": "bare", "recurrence": "interval", "times": []}"#;
        let alarm: Alarm = serde_json::from_str(json).unwrap();
        assert_eq!(
            alarm.schedule,
            Recurrence::Interval { interval_days: 1, interval_offsets: vec![] }
        );
    }

    #[test]
    fn recurrence_kind_labels() {
        assert_eq!(Recurrence::Daily.kind(), "daily");
        assert_eq!(Recurrence::Unknown.kind(), "unknown");
        assert!(Recurrence::is_valid_weekday(6));
        assert!(!Recurrence::is_valid_weekday(7));
    }
}
