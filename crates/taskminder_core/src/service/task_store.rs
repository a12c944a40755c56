//! Task Store: canonical task list and reminder settings.
//!
//! # Responsibility
//! - Apply task and reminder mutations as sequential transitions.
//! - Persist each settled change and keep the daily alert in sync.
//!
//! # Invariants
//! - Lifecycle is `Uninitialized -> Loading -> Ready`, never backwards.
//! - Mutations are rejected with `StoreError::NotReady` before `Ready`.
//! - Task ids are unique; `updated_at` strictly increases on every mutation.
//! - Nothing is persisted while loading.
//! - Persistence and reminder-sync failures are logged, never returned; the
//!   in-memory snapshot stays authoritative.

use crate::clock::{next_stamp, truncate_millis, Clock, SystemClock};
use crate::model::reminder::ReminderSettings;
use crate::model::task::{normalize_description, normalize_title, Task, TaskId, TaskValidationError};
use crate::reminder::scheduler::{ReminderResult, ReminderScheduler};
use crate::reminder::sync::sync_daily_reminder;
use crate::repo::kv_repo::KeyValueStore;
use crate::repo::state_repo::{RecordKeys, StateRepository};
use crate::service::task_query::{list_tasks, TaskCounts, TaskListQuery};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Mutation issued before `initialize()` completed.
    NotReady,
    /// Input failed a required-field constraint.
    Validation(TaskValidationError),
    /// Reminders cannot be enabled without alert permission.
    PermissionDenied,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotReady => write!(f, "task store is not initialized"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::PermissionDenied => {
                write!(f, "notification permission is required to enable reminders")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotReady | Self::PermissionDenied => None,
        }
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Store lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreLifecycle {
    Uninitialized,
    Loading,
    Ready,
}

/// Store construction options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    pub record_keys: RecordKeys,
    /// Settings used when none are persisted.
    pub default_reminder: ReminderSettings,
}

/// Owned copy of the store state for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub tasks: Vec<Task>,
    pub reminder_settings: ReminderSettings,
    pub loading: bool,
}

/// Single source of truth for tasks and reminder settings.
pub struct TaskStore<K: KeyValueStore, S: ReminderScheduler, C: Clock = SystemClock> {
    repo: StateRepository<K>,
    scheduler: S,
    clock: C,
    default_reminder: ReminderSettings,
    lifecycle: StoreLifecycle,
    tasks: Vec<Task>,
    reminder_settings: ReminderSettings,
    tasks_dirty: bool,
    settings_dirty: bool,
    reminder_synced: bool,
}

impl<K: KeyValueStore, S: ReminderScheduler> TaskStore<K, S, SystemClock> {
    /// Creates an uninitialized store on the wall clock with default config.
    pub fn new(kv: K, scheduler: S) -> Self {
        Self::with_config(kv, scheduler, SystemClock, StoreConfig::default())
    }
}

impl<K: KeyValueStore, S: ReminderScheduler, C: Clock> TaskStore<K, S, C> {
    pub fn with_config(kv: K, scheduler: S, clock: C, config: StoreConfig) -> Self {
        Self {
            repo: StateRepository::new(kv, config.record_keys),
            scheduler,
            clock,
            default_reminder: config.default_reminder,
            lifecycle: StoreLifecycle::Uninitialized,
            tasks: Vec::new(),
            reminder_settings: config.default_reminder,
            tasks_dirty: false,
            settings_dirty: false,
            reminder_synced: false,
        }
    }

    /// Loads persisted state and enters `Ready`.
    ///
    /// Unreadable records fall back to defaults. The reminder registration
    /// is then reconciled with the loaded settings. Nothing is written.
    /// Calling again after the first load is a no-op.
    pub fn initialize(&mut self) {
        if self.lifecycle != StoreLifecycle::Uninitialized {
            debug!("event=store_init module=store status=skipped reason=already_initialized");
            return;
        }
        self.lifecycle = StoreLifecycle::Loading;
        info!("event=store_init module=store status=start");

        self.tasks = match self.repo.load_tasks() {
            Ok(Some(tasks)) => tasks,
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(
                    "event=state_load module=store status=fallback record=tasks error={err}"
                );
                Vec::new()
            }
        };
        self.reminder_settings = match self.repo.load_reminder_settings() {
            Ok(Some(settings)) => settings,
            Ok(None) => self.default_reminder,
            Err(err) => {
                warn!(
                    "event=state_load module=store status=fallback record=reminder_settings error={err}"
                );
                self.default_reminder
            }
        };

        self.lifecycle = StoreLifecycle::Ready;
        info!(
            "event=store_init module=store status=ok task_count={} reminder_enabled={}",
            self.tasks.len(),
            self.reminder_settings.enabled
        );

        self.sync_reminder();
    }

    pub fn lifecycle(&self) -> StoreLifecycle {
        self.lifecycle
    }

    /// True until `initialize()` has finished.
    pub fn is_loading(&self) -> bool {
        self.lifecycle != StoreLifecycle::Ready
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn reminder_settings(&self) -> ReminderSettings {
        self.reminder_settings
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            tasks: self.tasks.clone(),
            reminder_settings: self.reminder_settings,
            loading: self.is_loading(),
        }
    }

    pub fn get_task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn list_tasks(&self, query: &TaskListQuery) -> Vec<&Task> {
        list_tasks(&self.tasks, query)
    }

    pub fn counts(&self) -> TaskCounts {
        TaskCounts::from_tasks(&self.tasks)
    }

    /// Whether the last reminder sync attempt succeeded.
    pub fn reminder_in_sync(&self) -> bool {
        self.reminder_synced
    }

    pub fn repository(&self) -> &StateRepository<K> {
        &self.repo
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Creates a pending task and appends it to the collection.
    ///
    /// # Errors
    /// - `StoreError::NotReady` before initialization.
    /// - `StoreError::Validation` for a blank title; nothing changes.
    pub fn add_task(&mut self, title: &str, description: Option<&str>) -> StoreResult<Task> {
        self.ensure_ready()?;

        let id = self.fresh_id();
        let task = Task::new(id, title, description, self.now())?;
        self.tasks.push(task.clone());
        info!(
            "event=task_add module=store status=ok task_id={} task_count={}",
            task.id,
            self.tasks.len()
        );

        self.settle(true);
        Ok(task)
    }

    /// Replaces the task with the same id.
    ///
    /// Caller-supplied `created_at`/`updated_at` are ignored: creation time
    /// is kept and `updated_at` is restamped. Returns `Ok(false)` when no
    /// task has that id.
    pub fn update_task(&mut self, task: Task) -> StoreResult<bool> {
        self.ensure_ready()?;

        let title = normalize_title(&task.title)?;
        let now = self.now();
        let Some(current) = self.tasks.iter_mut().find(|current| current.id == task.id) else {
            debug!(
                "event=task_update module=store status=skipped reason=not_found task_id={}",
                task.id
            );
            self.settle(false);
            return Ok(false);
        };

        current.title = title;
        current.description = normalize_description(task.description.as_deref());
        current.completed = task.completed;
        current.updated_at = next_stamp(now, current.updated_at);
        info!(
            "event=task_update module=store status=ok task_id={}",
            current.id
        );

        self.settle(true);
        Ok(true)
    }

    /// Removes the task with `id`. Returns `Ok(false)` when absent.
    pub fn delete_task(&mut self, id: &TaskId) -> StoreResult<bool> {
        self.ensure_ready()?;

        let before = self.tasks.len();
        self.tasks.retain(|task| &task.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            info!(
                "event=task_delete module=store status=ok task_id={id} task_count={}",
                self.tasks.len()
            );
        } else {
            debug!("event=task_delete module=store status=skipped reason=not_found task_id={id}");
        }

        self.settle(removed);
        Ok(removed)
    }

    /// Flips completion of the task with `id`. Returns `Ok(false)` when absent.
    pub fn toggle_task(&mut self, id: &TaskId) -> StoreResult<bool> {
        self.ensure_ready()?;

        let now = self.now();
        let Some(task) = self.tasks.iter_mut().find(|task| &task.id == id) else {
            debug!("event=task_toggle module=store status=skipped reason=not_found task_id={id}");
            self.settle(false);
            return Ok(false);
        };

        task.completed = !task.completed;
        task.updated_at = next_stamp(now, task.updated_at);
        info!(
            "event=task_toggle module=store status=ok task_id={id} completed={}",
            task.completed
        );

        self.settle(true);
        Ok(true)
    }

    /// Replaces reminder settings, persists them and re-syncs the alert.
    ///
    /// Enabling requires delivery permission; on refusal nothing changes.
    /// Unchanged settings skip the write and only re-sync when the previous
    /// sync failed. Sync failures are logged and do not roll back.
    ///
    /// # Errors
    /// - `StoreError::NotReady` before initialization.
    /// - `StoreError::PermissionDenied` when enabling without permission.
    pub fn update_reminder_settings(&mut self, settings: ReminderSettings) -> StoreResult<()> {
        self.ensure_ready()?;

        if settings.enabled {
            match self.scheduler.request_permission() {
                Ok(status) if status.allows_delivery() => {}
                Ok(_) => {
                    warn!(
                        "event=reminder_update module=store status=error error_code=permission_denied"
                    );
                    return Err(StoreError::PermissionDenied);
                }
                Err(err) => {
                    warn!(
                        "event=reminder_update module=store status=error error_code=permission_check_failed error={err}"
                    );
                    return Err(StoreError::PermissionDenied);
                }
            }
        }

        let changed = settings != self.reminder_settings;
        if changed {
            self.reminder_settings = settings;
            self.settings_dirty = true;
            info!(
                "event=reminder_update module=store status=ok enabled={} time={}",
                settings.enabled, settings.time
            );
        }
        self.settle(false);

        if changed || !self.reminder_synced {
            self.sync_reminder();
        }
        Ok(())
    }

    /// Re-applies the current settings to the scheduler.
    ///
    /// Returns whether the registration now matches the settings.
    pub fn resync_reminder(&mut self) -> StoreResult<bool> {
        self.ensure_ready()?;
        self.sync_reminder();
        Ok(self.reminder_synced)
    }

    /// Records the outcome of a sync the host applied to the platform.
    ///
    /// A failure leaves the store out of sync; the next `resync_reminder` or
    /// settings update re-attempts the registration.
    pub fn report_reminder_sync(&mut self, outcome: ReminderResult<()>) {
        match outcome {
            Ok(()) => {
                info!("event=reminder_report module=store status=ok");
                self.reminder_synced = true;
            }
            Err(err) => {
                error!("event=reminder_report module=store status=error error={err}");
                self.reminder_synced = false;
            }
        }
    }

    /// Current instant at record precision.
    fn now(&self) -> DateTime<Utc> {
        truncate_millis(self.clock.now())
    }

    fn ensure_ready(&self) -> StoreResult<()> {
        if self.lifecycle == StoreLifecycle::Ready {
            return Ok(());
        }
        warn!(
            "event=store_mutation module=store status=error error_code=not_ready lifecycle={:?}",
            self.lifecycle
        );
        Err(StoreError::NotReady)
    }

    fn fresh_id(&self) -> TaskId {
        loop {
            let id = TaskId::generate();
            if self.get_task(&id).is_none() {
                return id;
            }
        }
    }

    /// Writes every dirty record after a transition.
    fn settle(&mut self, tasks_changed: bool) {
        self.tasks_dirty |= tasks_changed;

        if self.tasks_dirty {
            match self.repo.save_tasks(&self.tasks) {
                Ok(()) => self.tasks_dirty = false,
                Err(err) => error!(
                    "event=state_save module=store status=error record=tasks task_count={} error={err}",
                    self.tasks.len()
                ),
            }
        }
        if self.settings_dirty {
            match self.repo.save_reminder_settings(&self.reminder_settings) {
                Ok(()) => self.settings_dirty = false,
                Err(err) => error!(
                    "event=state_save module=store status=error record=reminder_settings error={err}"
                ),
            }
        }
    }

    fn sync_reminder(&mut self) {
        self.reminder_synced = match sync_daily_reminder(&self.scheduler, &self.reminder_settings) {
            Ok(()) => true,
            Err(err) => {
                error!(
                    "event=reminder_sync module=store status=error enabled={} error={err}",
                    self.reminder_settings.enabled
                );
                false
            }
        };
    }
}
