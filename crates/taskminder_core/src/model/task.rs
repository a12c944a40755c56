//! Task domain model.
//!
//! # Responsibility
//! - Define the persisted task record and its wire field names.
//! - Normalize user input (trimmed title, collapsed empty description).
//!
//! # Invariants
//! - `id` is non-empty and never changes after creation.
//! - `title` is non-empty after trimming.
//! - `description` is either absent or non-empty after trimming.
//! - `updated_at >= created_at`.
//!
//! # Wire format
//! Field names are camelCase (`createdAt`, `updatedAt`) and timestamps are
//! ISO-8601 UTC strings with millisecond precision, e.g.
//! `2026-02-13T10:00:00.000Z`.

use crate::clock::truncate_millis;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque task identifier.
///
/// New ids are random UUIDs; any non-empty string is accepted on load so
/// records written by older clients keep their identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Validation errors for task records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Task id is empty.
    EmptyId,
    /// Title is empty after trimming.
    EmptyTitle,
    /// `updated_at` precedes `created_at`.
    TimestampsReversed {
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    },
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "task id must not be empty"),
            Self::EmptyTitle => write!(f, "task title is required"),
            Self::TimestampsReversed {
                created_at,
                updated_at,
            } => write!(
                f,
                "updatedAt ({}) must be >= createdAt ({})",
                updated_at.to_rfc3339(),
                created_at.to_rfc3339()
            ),
        }
    }
}

impl Error for TaskValidationError {}

/// One to-do entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TaskRecord")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated wire shape; `Task` deserializes through it.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: TaskId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    completed: bool,
    #[serde(with = "iso_millis")]
    created_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskValidationError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let task = Self {
            id: record.id,
            title: record.title,
            description: normalize_description(record.description.as_deref()),
            completed: record.completed,
            created_at: record.created_at,
            updated_at: record.updated_at,
        };
        task.validate()?;
        Ok(task)
    }
}

impl Task {
    /// Creates a pending task stamped at `now`.
    ///
    /// The title is trimmed, a blank description collapses to `None` and
    /// `now` is truncated to whole milliseconds.
    pub fn new(
        id: TaskId,
        title: &str,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, TaskValidationError> {
        let now = truncate_millis(now);
        let task = Self {
            id,
            title: normalize_title(title)?,
            description: normalize_description(description),
            completed: false,
            created_at: now,
            updated_at: now,
        };
        task.validate()?;
        Ok(task)
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(TaskValidationError::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if self.updated_at < self.created_at {
            return Err(TaskValidationError::TimestampsReversed {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }

    /// Returns whether the task still needs doing.
    pub fn is_pending(&self) -> bool {
        !self.completed
    }
}

/// Trims a title and rejects blank input.
pub fn normalize_title(title: &str) -> Result<String, TaskValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

/// Trims a description; blank input becomes `None`.
pub fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Formats a timestamp the way task records store it (`2026-02-13T10:00:00.000Z`).
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) mod iso_millis {
    use crate::clock::truncate_millis;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(raw.trim())
            .map(|value| truncate_millis(value.with_timezone(&Utc)))
            .map_err(|err| serde::de::Error::custom(format!("invalid timestamp `{raw}`: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_description, normalize_title, Task, TaskId, TaskValidationError};
    use chrono::{TimeZone, Timelike, Utc};

    #[test]
    fn normalize_title_trims_and_rejects_blank() {
        assert_eq!(normalize_title("  Buy milk ").unwrap(), "Buy milk");
        assert_eq!(
            normalize_title(" \t\n").unwrap_err(),
            TaskValidationError::EmptyTitle
        );
    }

    #[test]
    fn normalize_description_collapses_blank_to_none() {
        assert_eq!(normalize_description(None), None);
        assert_eq!(normalize_description(Some("   ")), None);
        assert_eq!(
            normalize_description(Some(" two liters ")).as_deref(),
            Some("two liters")
        );
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(TaskId::generate(), TaskId::generate());
    }

    #[test]
    fn validate_rejects_reversed_timestamps() {
        let created = Utc.with_ymd_and_hms(2026, 2, 13, 10, 0, 0).unwrap();
        let mut task = Task::new(TaskId::from("t-1"), "title", None, created).unwrap();
        task.updated_at = Utc.with_ymd_and_hms(2026, 2, 13, 9, 0, 0).unwrap();

        assert!(matches!(
            task.validate().unwrap_err(),
            TaskValidationError::TimestampsReversed { .. }
        ));
    }

    #[test]
    fn sub_millisecond_stamps_survive_a_record_round_trip() {
        let precise = Utc.timestamp_nanos(1_700_000_000_123_456_789);
        let task = Task::new(TaskId::from("t-2"), "precise", Some("notes"), precise).unwrap();
        assert_eq!(task.created_at.nanosecond(), 123_000_000);

        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains(r#""createdAt":"2023-11-14T22:13:20.123Z""#));
        let restored: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, task);
    }

    #[test]
    fn loaded_microsecond_stamps_are_truncated() {
        let restored: Task = serde_json::from_str(
            r#"{"id":"t-3","title":"legacy","completed":false,
                "createdAt":"2026-02-13T10:00:00.123456Z",
                "updatedAt":"2026-02-13T10:00:00.999999Z"}"#,
        )
        .unwrap();
        assert_eq!(restored.created_at.nanosecond(), 123_000_000);
        assert_eq!(restored.updated_at.nanosecond(), 999_000_000);

        let again: Task = serde_json::from_str(&serde_json::to_string(&restored).unwrap()).unwrap();
        assert_eq!(again, restored);
    }

    #[test]
    fn loaded_blank_description_collapses_to_none() {
        let restored: Task = serde_json::from_str(
            r#"{"id":"t-4","title":"t","description":"   ","completed":false,
                "createdAt":"2026-02-13T10:00:00.000Z",
                "updatedAt":"2026-02-13T10:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(restored.description, None);
    }
}
