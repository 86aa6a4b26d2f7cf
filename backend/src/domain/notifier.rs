//! Notification seam between the scheduler and the host platform.

use log::info;

/// Receives fire events from the scheduler.
///
/// Implementations render or sound the alarm however the platform allows.
/// `fire` must never surface a failure back into the scheduler; whatever can
/// go wrong stays inside the implementation.
pub trait Notifier: Send + Sync {
    fn fire(&self, title: &str, message: &str);
}

/// Fallback notifier that renders fire events into the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn fire(&self, title: &str, message: &str) {
        info!("NOTIFY: {} - {}", title, message);
    }
}
