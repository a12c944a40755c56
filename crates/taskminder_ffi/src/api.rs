//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the task store to Dart through an opaque handle.
//! - Flatten core types into plain strings/bools for the generated bindings.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Calls on one handle are serialized; the host never sees a half-applied
//!   transition.
//! - The host owns real notification delivery: it mirrors
//!   `store_reminder_registration` to the platform, reports the outcome
//!   through `store_report_reminder_sync` and reports permission changes
//!   through `store_set_notification_permission`.

use log::warn;
use std::sync::{Mutex, MutexGuard, PoisonError};
use taskminder_core::{
    core_version as core_version_inner, format_timestamp, init_logging as init_logging_inner,
    ping as ping_inner, InMemoryReminderScheduler, PermissionStatus, ReminderError,
    ReminderSettings, ReminderTime,
    SqliteKeyValueStore, Task, TaskFilter, TaskId, TaskListQuery, TaskSort, TaskStore,
    DAILY_REMINDER_CONTENT, DAILY_REMINDER_ID,
};
use taskminder_core::model::task::normalize_title;

type HostStore = TaskStore<SqliteKeyValueStore, InMemoryReminderScheduler>;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Opaque store handle held by Dart for the app's lifetime.
#[flutter_rust_bridge::frb(opaque)]
pub struct TaskStoreHandle {
    store: Mutex<HostStore>,
}

impl TaskStoreHandle {
    fn lock(&self) -> MutexGuard<'_, HostStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One task flattened for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// ISO-8601 UTC timestamp.
    pub created_at: String,
    /// ISO-8601 UTC timestamp.
    pub updated_at: String,
}

/// Full store state for one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshotView {
    pub tasks: Vec<TaskItem>,
    pub reminder_enabled: bool,
    /// `HH:MM`, 24-hour.
    pub reminder_time: String,
    /// 12-hour label, e.g. `9:00 AM`.
    pub reminder_time_label: String,
    pub loading: bool,
    pub pending_count: u32,
    pub completed_count: u32,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    /// Whether the operation was accepted.
    pub ok: bool,
    /// Affected task id, when one exists.
    pub task_id: Option<String>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task_id: Option<String>) -> Self {
        Self {
            ok: true,
            task_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            message: message.into(),
        }
    }
}

/// Alert content the host shows when the daily reminder fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderContentView {
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub screen: String,
}

/// Opens the store at `db_path` and loads persisted state.
///
/// # FFI contract
/// - Sync call; opens SQLite and runs migrations.
/// - The returned handle is already `Ready`.
/// - `notifications_granted` seeds the permission state the host observed.
#[flutter_rust_bridge::frb(sync)]
pub fn store_open(db_path: String, notifications_granted: bool) -> Result<TaskStoreHandle, String> {
    let db_path = db_path.trim();
    if db_path.is_empty() {
        return Err("store_open failed: db_path cannot be empty".to_string());
    }

    let kv = SqliteKeyValueStore::open(db_path).map_err(|err| format!("store_open failed: {err}"))?;
    let scheduler = InMemoryReminderScheduler::new(permission_from(notifications_granted));
    let mut store = TaskStore::new(kv, scheduler);
    store.initialize();

    Ok(TaskStoreHandle {
        store: Mutex::new(store),
    })
}

/// Returns the current snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn store_snapshot(handle: &TaskStoreHandle) -> StoreSnapshotView {
    let store = handle.lock();
    let snapshot = store.snapshot();
    let counts = store.counts();
    StoreSnapshotView {
        tasks: snapshot.tasks.iter().map(to_task_item).collect(),
        reminder_enabled: snapshot.reminder_settings.enabled,
        reminder_time: snapshot.reminder_settings.time.to_string(),
        reminder_time_label: snapshot.reminder_settings.time.display_12h(),
        loading: snapshot.loading,
        pending_count: saturating_u32(counts.pending),
        completed_count: saturating_u32(counts.completed),
    }
}

/// Lists tasks for one view.
///
/// `filter`: `all|pending|completed`; `sort`: `newest|oldest|alphabetical`.
/// Unknown values fall back to `all` / `newest`.
#[flutter_rust_bridge::frb(sync)]
pub fn store_list_tasks(handle: &TaskStoreHandle, filter: String, sort: String) -> Vec<TaskItem> {
    let query = TaskListQuery {
        filter: TaskFilter::parse(&filter).unwrap_or_default(),
        sort: TaskSort::parse(&sort).unwrap_or_default(),
    };
    let store = handle.lock();
    store
        .list_tasks(&query)
        .into_iter()
        .map(to_task_item)
        .collect()
}

#[flutter_rust_bridge::frb(sync)]
pub fn store_add_task(
    handle: &TaskStoreHandle,
    title: String,
    description: Option<String>,
) -> TaskActionResponse {
    let mut store = handle.lock();
    match store.add_task(&title, description.as_deref()) {
        Ok(task) => TaskActionResponse::success("Task created.", Some(task.id.to_string())),
        Err(err) => TaskActionResponse::failure(format!("store_add_task failed: {err}")),
    }
}

/// Edits title, description and completion of an existing task.
///
/// A blank title is rejected whether or not the task exists. A missing id
/// with a valid title is accepted as a no-op (the task may have been deleted).
#[flutter_rust_bridge::frb(sync)]
pub fn store_update_task(
    handle: &TaskStoreHandle,
    task_id: String,
    title: String,
    description: Option<String>,
    completed: bool,
) -> TaskActionResponse {
    if let Err(err) = normalize_title(&title) {
        return TaskActionResponse::failure(format!("store_update_task failed: {err}"));
    }
    let mut store = handle.lock();
    let id = TaskId::from(task_id);
    let Some(mut edited) = store.get_task(&id).cloned() else {
        return TaskActionResponse::success("Task not found; nothing changed.", None);
    };
    edited.title = title;
    edited.description = description;
    edited.completed = completed;

    match store.update_task(edited) {
        Ok(true) => TaskActionResponse::success("Task updated.", Some(id.to_string())),
        Ok(false) => TaskActionResponse::success("Task not found; nothing changed.", None),
        Err(err) => TaskActionResponse::failure(format!("store_update_task failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn store_delete_task(handle: &TaskStoreHandle, task_id: String) -> TaskActionResponse {
    let mut store = handle.lock();
    let id = TaskId::from(task_id);
    match store.delete_task(&id) {
        Ok(true) => TaskActionResponse::success("Task deleted.", Some(id.to_string())),
        Ok(false) => TaskActionResponse::success("Task not found; nothing changed.", None),
        Err(err) => TaskActionResponse::failure(format!("store_delete_task failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn store_toggle_task(handle: &TaskStoreHandle, task_id: String) -> TaskActionResponse {
    let mut store = handle.lock();
    let id = TaskId::from(task_id);
    match store.toggle_task(&id) {
        Ok(true) => TaskActionResponse::success("Task toggled.", Some(id.to_string())),
        Ok(false) => TaskActionResponse::success("Task not found; nothing changed.", None),
        Err(err) => TaskActionResponse::failure(format!("store_toggle_task failed: {err}")),
    }
}

/// Replaces reminder settings.
///
/// # FFI contract
/// - `time` must be `HH:MM`.
/// - Returns `ok=false` when enabling without permission; the host should
///   revert its toggle.
#[flutter_rust_bridge::frb(sync)]
pub fn store_update_reminder(
    handle: &TaskStoreHandle,
    enabled: bool,
    time: String,
) -> TaskActionResponse {
    let time = match time.parse::<ReminderTime>() {
        Ok(time) => time,
        Err(err) => return TaskActionResponse::failure(format!("store_update_reminder failed: {err}")),
    };
    let mut store = handle.lock();
    match store.update_reminder_settings(ReminderSettings { enabled, time }) {
        Ok(()) => TaskActionResponse::success("Reminder settings saved.", None),
        Err(err) => TaskActionResponse::failure(format!("store_update_reminder failed: {err}")),
    }
}

/// Records the host's current notification permission.
#[flutter_rust_bridge::frb(sync)]
pub fn store_set_notification_permission(handle: &TaskStoreHandle, granted: bool) {
    handle
        .lock()
        .scheduler()
        .set_permission(permission_from(granted));
}

/// Reports whether the host managed to apply the registration to the platform.
///
/// # FFI contract
/// - Call after mirroring `store_reminder_registration` to the platform.
/// - A failure keeps register/cancel failing until the host reports success,
///   so `store_resync_reminder` returns `false` meanwhile.
#[flutter_rust_bridge::frb(sync)]
pub fn store_report_reminder_sync(handle: &TaskStoreHandle, ok: bool, message: String) {
    let mut store = handle.lock();
    store.scheduler().set_fail_platform_calls(!ok);
    let outcome = if ok {
        Ok(())
    } else {
        Err(ReminderError::Platform(message))
    };
    store.report_reminder_sync(outcome);
}

/// Re-applies reminder settings (call on app foregrounding).
///
/// Returns whether the registration matches the settings afterwards.
#[flutter_rust_bridge::frb(sync)]
pub fn store_resync_reminder(handle: &TaskStoreHandle) -> bool {
    match handle.lock().resync_reminder() {
        Ok(in_sync) => in_sync,
        Err(err) => {
            warn!("event=ffi_resync module=ffi status=error error={err}");
            false
        }
    }
}

/// Time (`HH:MM`) of the daily alert the host should have scheduled, if any.
#[flutter_rust_bridge::frb(sync)]
pub fn store_reminder_registration(handle: &TaskStoreHandle) -> Option<String> {
    handle
        .lock()
        .scheduler()
        .registered()
        .map(|time| time.to_string())
}

#[flutter_rust_bridge::frb(sync)]
pub fn reminder_content() -> ReminderContentView {
    ReminderContentView {
        identifier: DAILY_REMINDER_ID.to_string(),
        title: DAILY_REMINDER_CONTENT.title.to_string(),
        body: DAILY_REMINDER_CONTENT.body.to_string(),
        screen: DAILY_REMINDER_CONTENT.screen.to_string(),
    }
}

/// Picker options at 30-minute steps, `HH:MM`.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_time_slots() -> Vec<String> {
    ReminderTime::half_hour_slots()
        .into_iter()
        .map(|time| time.to_string())
        .collect()
}

/// 12-hour label for an `HH:MM` value; `None` when unparsable.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_time_label(time: String) -> Option<String> {
    time.parse::<ReminderTime>()
        .ok()
        .map(ReminderTime::display_12h)
}

fn permission_from(granted: bool) -> PermissionStatus {
    if granted {
        PermissionStatus::Granted
    } else {
        PermissionStatus::Denied
    }
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id.to_string(),
        title: task.title.clone(),
        description: task.description.clone(),
        completed: task.completed,
        created_at: format_timestamp(task.created_at),
        updated_at: format_timestamp(task.updated_at),
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
