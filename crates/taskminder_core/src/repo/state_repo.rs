//! Typed task and reminder records on top of a `KeyValueStore`.
//!
//! # Responsibility
//! - Serialize the task collection and reminder settings as JSON blobs.
//! - Reject records that break model invariants on read.
//!
//! # Invariants
//! - The two records are independent; failure of one never affects the other.
//! - Task order is preserved across a write/read cycle.

use crate::model::reminder::ReminderSettings;
use crate::model::task::Task;
use crate::repo::kv_repo::{KeyValueStore, KvError, KvResult};
use std::collections::HashSet;

/// Record key for the task collection.
pub const TASKS_KEY: &str = "@todos";
/// Record key for reminder settings.
pub const REMINDER_SETTINGS_KEY: &str = "@reminder_settings";

/// Names of the persisted records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKeys {
    pub tasks: String,
    pub reminder_settings: String,
}

impl Default for RecordKeys {
    fn default() -> Self {
        Self {
            tasks: TASKS_KEY.to_string(),
            reminder_settings: REMINDER_SETTINGS_KEY.to_string(),
        }
    }
}

/// Reads and writes the store's two records.
pub struct StateRepository<K: KeyValueStore> {
    kv: K,
    keys: RecordKeys,
}

impl<K: KeyValueStore> StateRepository<K> {
    pub fn new(kv: K, keys: RecordKeys) -> Self {
        Self { kv, keys }
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Loads the task collection; `Ok(None)` when never written.
    ///
    /// # Errors
    /// - `KvError::Serialize` for unparsable blobs or invalid task fields.
    /// - `KvError::InvalidData` when two tasks share an id.
    pub fn load_tasks(&self) -> KvResult<Option<Vec<Task>>> {
        let Some(raw) = self.kv.get_item(&self.keys.tasks)? else {
            return Ok(None);
        };
        let tasks: Vec<Task> = serde_json::from_str(&raw)?;

        if let Some(duplicate) = first_duplicate_id(&tasks) {
            return Err(KvError::InvalidData(format!(
                "duplicate task id `{duplicate}` in {}",
                self.keys.tasks
            )));
        }
        Ok(Some(tasks))
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> KvResult<()> {
        let blob = serde_json::to_string(tasks)?;
        self.kv.set_item(&self.keys.tasks, &blob)
    }

    /// Loads reminder settings; `Ok(None)` when never written.
    pub fn load_reminder_settings(&self) -> KvResult<Option<ReminderSettings>> {
        match self.kv.get_item(&self.keys.reminder_settings)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn save_reminder_settings(&self, settings: &ReminderSettings) -> KvResult<()> {
        let blob = serde_json::to_string(settings)?;
        self.kv.set_item(&self.keys.reminder_settings, &blob)
    }
}

fn first_duplicate_id(tasks: &[Task]) -> Option<String> {
    let mut seen = HashSet::with_capacity(tasks.len());
    tasks
        .iter()
        .find(|task| !seen.insert(task.id.as_str()))
        .map(|task| task.id.to_string())
}
