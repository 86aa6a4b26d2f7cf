//! Domain layer: alarm business logic.
//!
//! Time-token parsing, the recurrence predicate, the alarm management
//! service and the scheduler loop all live here, independent of any
//! transport or storage detail.

pub mod alarm_service;
pub mod notifier;
pub mod recurrence;
pub mod scheduler;
pub mod time_spec;

pub use alarm_service::{AlarmService, AlarmValidationError};
pub use notifier::{LogNotifier, Notifier};
pub use recurrence::should_trigger;
pub use scheduler::SchedulerService;
pub use time_spec::{parse_time_list, parse_time_token, InvalidTimeFormat};
