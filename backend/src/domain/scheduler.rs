//! Background scheduler loop.
//!
//! Spawned as a tokio task from `main`. On each 1-second tick it evaluates
//! every alarm against the current wall clock, stamps and persists the fired
//! ones, then hands each fire event to the notifier without waiting on it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use log::{debug, error, info};
use tokio::sync::watch;

use crate::domain::notifier::Notifier;
use crate::domain::recurrence::{should_trigger, trigger_stamp};
use crate::storage::AlarmRepository;
use shared::Alarm;

/// Seconds between ticks. One second is also the dedup resolution of
/// `last_triggered`; the two must move together.
const TICK_INTERVAL_SECS: u64 = 1;

/// Title carried by every fire event.
const NOTIFICATION_TITLE: &str = "Alarm";

/// Periodic evaluator of the shared alarm list.
///
/// Shares the list and repository with [`crate::domain::AlarmService`]; the
/// loop is the only writer of `last_triggered`, the service writes everything
/// else.
#[derive(Clone)]
pub struct SchedulerService {
    repository: AlarmRepository,
    alarms: Arc<Mutex<Vec<Alarm>>>,
    notifier: Arc<dyn Notifier>,
}

impl SchedulerService {
    pub fn new(
        repository: AlarmRepository,
        alarms: Arc<Mutex<Vec<Alarm>>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            repository,
            alarms,
            notifier,
        }
    }

    /// Run until the shutdown channel flips to `true`.
    ///
    /// The flag is raced against the ticker, so shutdown is cooperative and
    /// takes effect within one tick period, never mid-evaluation.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("Scheduler started ({}s tick)", TICK_INTERVAL_SECS);

        let mut interval = tokio::time::interval(Duration::from_secs(TICK_INTERVAL_SECS));
        interval.tick().await; // skip immediate tick

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    self.tick(Local::now().naive_local()).await;
                }
            }
        }

        info!("Scheduler stopped");
    }

    /// Evaluate a single tick at `now`. Returns the number of alarms fired.
    ///
    /// Fired alarms get their `last_triggered` stamp under the list lock, the
    /// full list is persisted before any notification goes out (so concurrent
    /// store readers already see the stamps), and each notification runs on a
    /// detached task.
    pub async fn tick(&self, now: NaiveDateTime) -> usize {
        let (fired, snapshot) = {
            let mut alarms = self.alarms.lock().expect("alarm list lock poisoned");
            let stamp = trigger_stamp(now);
            let mut fired = Vec::new();
            for alarm in alarms.iter_mut() {
                if should_trigger(alarm, now) {
                    alarm.last_triggered = stamp.clone();
                    fired.push(alarm.clone());
                }
            }
            if fired.is_empty() {
                return 0;
            }
            (fired, alarms.clone())
        };

        if let Err(e) = self.repository.save_alarms(&snapshot).await {
            error!("Failed to persist trigger stamps: {}", e);
        }

        let count = fired.len();
        for alarm in fired {
            let notifier = Arc::clone(&self.notifier);
            let message = fire_message(&alarm);
            // Fire-and-forget: a slow notifier must not stall the next tick.
            tokio::spawn(async move {
                notifier.fire(NOTIFICATION_TITLE, &message);
            });
        }

        debug!("Tick at {}: {} alarm(s) fired", now, count);
        count
    }
}

/// Body of a fire event: alarm name, recurrence kind, configured times.
fn fire_message(alarm: &Alarm) -> String {
    format!(
        "{}\n{} at {}",
        alarm.name,
        alarm.schedule.kind(),
        alarm.times.join(",")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JsonConnection;
    use chrono::NaiveDate;
    use shared::Recurrence;
    use tempfile::TempDir;

    /// Notifier that records every fire event it receives.
    #[derive(Clone, Default)]
    struct RecordingNotifier {
        events: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl RecordingNotifier {
        fn events(&self) -> Vec<(String, String)> {
            self.events.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn fire(&self, title: &str, message: &str) {
            self.events
                .lock()
                .unwrap()
                .push((title.to_string(), message.to_string()));
        }
    }

    fn daily_alarm(id: &str, time: &str) -> Alarm {
        Alarm {
            id: id.to_string(),
            name: format!("Alarm {}", id),
            schedule: Recurrence::Daily,
            times: vec![time.to_string()],
            enabled: true,
            period_start: None,
            period_end: None,
            last_triggered: String::new(),
        }
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    async fn setup_scheduler(
        alarms: Vec<Alarm>,
    ) -> (SchedulerService, AlarmRepository, RecordingNotifier, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = JsonConnection::new(temp_dir.path()).unwrap();
        let repository = AlarmRepository::new(connection);
        let notifier = RecordingNotifier::default();
        let scheduler = SchedulerService::new(
            repository.clone(),
            Arc::new(Mutex::new(alarms)),
            Arc::new(notifier.clone()),
        );
        (scheduler, repository, notifier, temp_dir)
    }

    /// Give detached notification tasks a moment to land.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn tick_fires_stamps_and_persists_before_notifying() {
        let (scheduler, repository, notifier, _temp_dir) =
            setup_scheduler(vec![daily_alarm("a1", "09:00:00")]).await;

        let fired = scheduler.tick(at(9, 0, 0)).await;
        assert_eq!(fired, 1);

        let stored = repository.load_alarms().await;
        assert_eq!(stored[0].last_triggered, "2025-06-02 09:00:00");

        settle().await;
        let events = notifier.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "Alarm");
        assert_eq!(events[0].1, "Alarm a1\ndaily at 09:00:00");
    }

    #[tokio::test]
    async fn same_second_retick_is_deduped() {
        let (scheduler, _repository, notifier, _temp_dir) =
            setup_scheduler(vec![daily_alarm("a1", "09:00:00")]).await;

        assert_eq!(scheduler.tick(at(9, 0, 0)).await, 1);
        assert_eq!(scheduler.tick(at(9, 0, 0)).await, 0);

        settle().await;
        assert_eq!(notifier.events().len(), 1);
    }

    #[tokio::test]
    async fn next_matching_second_fires_again() {
        let mut alarm = daily_alarm("a1", "09:00:00");
        alarm.times.push("09:00:01".to_string());
        let (scheduler, _repository, _notifier, _temp_dir) = setup_scheduler(vec![alarm]).await;

        assert_eq!(scheduler.tick(at(9, 0, 0)).await, 1);
        assert_eq!(scheduler.tick(at(9, 0, 1)).await, 1);
    }

    #[tokio::test]
    async fn disabled_alarms_never_notify() {
        let mut alarm = daily_alarm("a1", "09:00:00");
        alarm.enabled = false;
        let (scheduler, _repository, notifier, _temp_dir) = setup_scheduler(vec![alarm]).await;

        assert_eq!(scheduler.tick(at(9, 0, 0)).await, 0);

        settle().await;
        assert!(notifier.events().is_empty());
    }

    #[tokio::test]
    async fn one_bad_alarm_does_not_block_the_rest_of_the_tick() {
        let mut corrupt = daily_alarm("bad", "09:00:00");
        corrupt.period_start = Some("garbage".to_string());
        let healthy = daily_alarm("good", "09:00:00");
        let (scheduler, _repository, notifier, _temp_dir) =
            setup_scheduler(vec![corrupt, healthy]).await;

        assert_eq!(scheduler.tick(at(9, 0, 0)).await, 1);

        settle().await;
        let events = notifier.events();
        assert_eq!(events.len(), 1);
        assert!(events[0].1.starts_with("Alarm good"));
    }

    #[tokio::test]
    async fn quiet_tick_does_not_touch_the_store() {
        let (scheduler, _repository, _notifier, temp_dir) =
            setup_scheduler(vec![daily_alarm("a1", "09:00:00")]).await;

        assert_eq!(scheduler.tick(at(10, 0, 0)).await, 0);
        // No fire, no write: the store file was never created.
        assert!(!temp_dir.path().join("alarms.json").exists());
    }

    #[tokio::test]
    async fn run_stops_on_shutdown_signal() {
        let (scheduler, _repository, _notifier, _temp_dir) = setup_scheduler(vec![]).await;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(scheduler.run(shutdown_rx));
        shutdown_tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("scheduler did not stop in time")
            .unwrap();
    }
}
