//! Alarm management: the only mutation surface outside the scheduler loop.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use log::{error, info};
use uuid::Uuid;

use crate::domain::recurrence::parse_bound;
use crate::domain::time_spec::{parse_time_list, InvalidTimeFormat};
use crate::storage::AlarmRepository;
use shared::{Alarm, CreateAlarmRequest, Recurrence};

/// Display label for alarms created without a name.
const DEFAULT_ALARM_NAME: &str = "Alarm";

/// Rejected alarm drafts. All of these are reported to the caller; the alarm
/// is not created.
#[derive(Debug, thiserror::Error)]
pub enum AlarmValidationError {
    #[error(transparent)]
    InvalidTimeFormat(#[from] InvalidTimeFormat),
    #[error("unknown recurrence kind: {0:?}")]
    UnknownRecurrence(String),
    #[error("weekday {0} is out of range (0 = Monday .. 6 = Sunday)")]
    WeekdayOutOfRange(u32),
    #[error("day of month {0} is out of range (1-31)")]
    DayOfMonthOutOfRange(u32),
    #[error("month {month}, day {day} is not a valid calendar date")]
    InvalidYearlyDate { month: u32, day: u32 },
    #[error("interval length must be at least one day")]
    ZeroIntervalDays,
    #[error("interval offsets are 1-based, got {0}")]
    OffsetOutOfRange(u32),
    #[error("at most 5 interval offsets are allowed, got {0}")]
    TooManyOffsets(usize),
    #[error("period bound {0:?} is not a valid timestamp")]
    InvalidPeriodBound(String),
}

/// Service for creating, listing, deleting and toggling alarms.
///
/// Shares the in-memory alarm list with the scheduler; every mutation holds
/// the lock only for the read-modify-write and persists the full list through
/// the repository before returning.
#[derive(Clone)]
pub struct AlarmService {
    repository: AlarmRepository,
    alarms: Arc<Mutex<Vec<Alarm>>>,
}

impl AlarmService {
    pub fn new(repository: AlarmRepository, alarms: Arc<Mutex<Vec<Alarm>>>) -> Self {
        Self { repository, alarms }
    }

    /// Validate a draft and create the alarm.
    ///
    /// Time tokens are canonicalized, the recurrence rule is built from the
    /// draft's flat fields, and the record is appended and persisted. Returns
    /// the stored alarm.
    pub async fn create_alarm(
        &self,
        request: CreateAlarmRequest,
    ) -> Result<Alarm, AlarmValidationError> {
        info!("Creating alarm: {:?}", request);

        let times = parse_time_list(&request.times)?;
        let schedule = build_schedule(&request)?;
        let period_start = normalize_period_bound(request.period_start.as_deref())?;
        let period_end = normalize_period_bound(request.period_end.as_deref())?;

        let name = if request.name.trim().is_empty() {
            DEFAULT_ALARM_NAME.to_string()
        } else {
            request.name.trim().to_string()
        };

        let alarm = Alarm {
            id: Uuid::new_v4().to_string(),
            name,
            schedule,
            times,
            enabled: true,
            period_start,
            period_end,
            last_triggered: String::new(),
        };

        let snapshot = {
            let mut alarms = self.alarms.lock().expect("alarm list lock poisoned");
            alarms.push(alarm.clone());
            alarms.clone()
        };
        self.persist(&snapshot).await;

        info!("Created alarm {:?} ({})", alarm.name, alarm.id);
        Ok(alarm)
    }

    /// Snapshot of the current alarm list.
    pub fn list_alarms(&self) -> Vec<Alarm> {
        self.alarms.lock().expect("alarm list lock poisoned").clone()
    }

    /// Delete an alarm by id. Returns false when the id is unknown.
    pub async fn delete_alarm(&self, id: &str) -> bool {
        let snapshot = {
            let mut alarms = self.alarms.lock().expect("alarm list lock poisoned");
            let before = alarms.len();
            alarms.retain(|alarm| alarm.id != id);
            if alarms.len() == before {
                return false;
            }
            alarms.clone()
        };
        self.persist(&snapshot).await;

        info!("Deleted alarm {}", id);
        true
    }

    /// Flip an alarm's enabled flag. Returns the updated record, or `None`
    /// when the id is unknown.
    pub async fn toggle_alarm(&self, id: &str) -> Option<Alarm> {
        let (updated, snapshot) = {
            let mut alarms = self.alarms.lock().expect("alarm list lock poisoned");
            let alarm = match alarms.iter_mut().find(|alarm| alarm.id == id) {
                Some(alarm) => alarm,
                None => return None,
            };
            alarm.enabled = !alarm.enabled;
            let updated = alarm.clone();
            (updated, alarms.clone())
        };
        self.persist(&snapshot).await;

        info!("Toggled alarm {} -> enabled={}", id, updated.enabled);
        Some(updated)
    }

    /// Best-effort persistence: write failures are logged, never surfaced.
    async fn persist(&self, snapshot: &[Alarm]) {
        if let Err(e) = self.repository.save_alarms(snapshot).await {
            error!("Failed to persist alarms: {}", e);
        }
    }
}

/// Build the typed recurrence rule from the draft's flat fields.
fn build_schedule(request: &CreateAlarmRequest) -> Result<Recurrence, AlarmValidationError> {
    match request.recurrence.trim() {
        "daily" => Ok(Recurrence::Daily),
        "weekly" => {
            let weekdays = request.weekdays.clone().unwrap_or_default();
            for &day in &weekdays {
                if !Recurrence::is_valid_weekday(day) {
                    return Err(AlarmValidationError::WeekdayOutOfRange(day));
                }
            }
            Ok(Recurrence::Weekly { weekdays })
        }
        "monthly" => {
            let day_of_month = request.day_of_month.unwrap_or(0);
            if !(1..=31).contains(&day_of_month) {
                return Err(AlarmValidationError::DayOfMonthOutOfRange(day_of_month));
            }
            Ok(Recurrence::Monthly { day_of_month })
        }
        "yearly" => {
            let month = request.month.unwrap_or(0);
            let day = request.day.unwrap_or(0);
            // Probe against a leap year so February 29 stays representable.
            if NaiveDate::from_ymd_opt(2024, month, day).is_none() {
                return Err(AlarmValidationError::InvalidYearlyDate { month, day });
            }
            Ok(Recurrence::Yearly { month, day })
        }
        "interval" => {
            let interval_days = request.interval_days.unwrap_or(1);
            if interval_days == 0 {
                return Err(AlarmValidationError::ZeroIntervalDays);
            }
            let mut offsets: Vec<u32> = Vec::new();
            for &offset in request.interval_offsets.as_deref().unwrap_or(&[]) {
                if offset == 0 {
                    return Err(AlarmValidationError::OffsetOutOfRange(offset));
                }
                if !offsets.contains(&offset) {
                    offsets.push(offset);
                }
            }
            if offsets.len() > Recurrence::MAX_INTERVAL_OFFSETS {
                return Err(AlarmValidationError::TooManyOffsets(offsets.len()));
            }
            Ok(Recurrence::Interval {
                interval_days,
                interval_offsets: offsets,
            })
        }
        other => Err(AlarmValidationError::UnknownRecurrence(other.to_string())),
    }
}

/// Reject unparseable period bounds at creation time; the evaluator would
/// only fail closed on them later, silently.
fn normalize_period_bound(
    raw: Option<&str>,
) -> Result<Option<String>, AlarmValidationError> {
    let raw = match raw {
        Some(raw) => raw.trim(),
        None => return Ok(None),
    };
    if raw.is_empty() {
        return Ok(None);
    }
    if parse_bound(raw).is_none() {
        return Err(AlarmValidationError::InvalidPeriodBound(raw.to_string()));
    }
    Ok(Some(raw.to_string()))
}
