//! Core domain logic for Taskminder.
//! This crate is the single source of truth for task and reminder invariants.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod reminder;
pub mod repo;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::reminder::{ReminderSettings, ReminderTime, ReminderTimeError};
pub use model::task::{format_timestamp, Task, TaskId, TaskValidationError};
pub use reminder::scheduler::{
    InMemoryReminderScheduler, PermissionStatus, ReminderContent, ReminderError,
    ReminderResult, ReminderScheduler, DAILY_REMINDER_CONTENT, DAILY_REMINDER_ID,
};
pub use repo::kv_repo::{KeyValueStore, KvError, MemoryKeyValueStore, SqliteKeyValueStore};
pub use service::task_query::{TaskCounts, TaskFilter, TaskListQuery, TaskSort};
pub use service::task_store::{
    StoreConfig, StoreError, StoreLifecycle, StoreResult, StoreSnapshot, TaskStore,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
