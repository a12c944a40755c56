//! Read-only list views over a task snapshot.
//!
//! # Invariants
//! - Views never reorder or mutate the underlying collection.
//! - Sorting is total: ties fall back to id order, so output is deterministic.

use crate::model::task::Task;
use std::cmp::Ordering;

/// Completion filter for list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl TaskFilter {
    /// Parses `all|pending|completed` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

/// Display order for list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSort {
    /// Most recently created first.
    #[default]
    Newest,
    Oldest,
    /// Case-insensitive by title.
    Alphabetical,
}

impl TaskSort {
    /// Parses `newest|oldest|alphabetical` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "newest" => Some(Self::Newest),
            "oldest" => Some(Self::Oldest),
            "alphabetical" | "a-z" => Some(Self::Alphabetical),
            _ => None,
        }
    }

    /// Next option in the `Newest -> Oldest -> Alphabetical` cycle.
    pub fn next(self) -> Self {
        match self {
            Self::Newest => Self::Oldest,
            Self::Oldest => Self::Alphabetical,
            Self::Alphabetical => Self::Newest,
        }
    }

    fn compare(self, left: &Task, right: &Task) -> Ordering {
        let primary = match self {
            Self::Newest => right.created_at.cmp(&left.created_at),
            Self::Oldest => left.created_at.cmp(&right.created_at),
            Self::Alphabetical => left
                .title
                .to_lowercase()
                .cmp(&right.title.to_lowercase()),
        };
        primary.then_with(|| left.id.cmp(&right.id))
    }
}

/// Filter and order for one list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskListQuery {
    pub filter: TaskFilter,
    pub sort: TaskSort,
}

/// Pending/completed totals for a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskCounts {
    pub pending: usize,
    pub completed: usize,
}

impl TaskCounts {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|task| task.completed).count();
        Self {
            pending: tasks.len() - completed,
            completed,
        }
    }

    pub fn total(self) -> usize {
        self.pending + self.completed
    }
}

/// Returns the tasks matching `query.filter`, ordered by `query.sort`.
pub fn list_tasks<'a>(tasks: &'a [Task], query: &TaskListQuery) -> Vec<&'a Task> {
    let mut view: Vec<&Task> = tasks
        .iter()
        .filter(|task| query.filter.matches(task))
        .collect();
    view.sort_by(|left, right| query.sort.compare(left, right));
    view
}

#[cfg(test)]
mod tests {
    use super::{list_tasks, TaskCounts, TaskFilter, TaskListQuery, TaskSort};
    use crate::model::task::{Task, TaskId};
    use chrono::{Duration, TimeZone, Utc};

    fn fixture() -> Vec<Task> {
        let base = Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap();
        let mut banana = Task::new(TaskId::from("b"), "banana", None, base).unwrap();
        banana.completed = true;
        let apple = Task::new(
            TaskId::from("a"),
            "Apple",
            None,
            base + Duration::minutes(1),
        )
        .unwrap();
        let cherry = Task::new(
            TaskId::from("c"),
            "cherry",
            None,
            base + Duration::minutes(2),
        )
        .unwrap();
        vec![banana, apple, cherry]
    }

    fn ids(view: &[&Task]) -> Vec<String> {
        view.iter().map(|task| task.id.to_string()).collect()
    }

    #[test]
    fn default_query_lists_all_newest_first() {
        let tasks = fixture();
        let view = list_tasks(&tasks, &TaskListQuery::default());
        assert_eq!(ids(&view), ["c", "a", "b"]);
    }

    #[test]
    fn filters_and_sorts_combine() {
        let tasks = fixture();
        let pending_oldest = TaskListQuery {
            filter: TaskFilter::Pending,
            sort: TaskSort::Oldest,
        };
        assert_eq!(ids(&list_tasks(&tasks, &pending_oldest)), ["a", "c"]);

        let completed = TaskListQuery {
            filter: TaskFilter::Completed,
            sort: TaskSort::Newest,
        };
        assert_eq!(ids(&list_tasks(&tasks, &completed)), ["b"]);
    }

    #[test]
    fn alphabetical_ignores_case() {
        let tasks = fixture();
        let query = TaskListQuery {
            filter: TaskFilter::All,
            sort: TaskSort::Alphabetical,
        };
        assert_eq!(ids(&list_tasks(&tasks, &query)), ["a", "b", "c"]);
    }

    #[test]
    fn counts_split_pending_and_completed() {
        let counts = TaskCounts::from_tasks(&fixture());
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn parse_and_cycle_options() {
        assert_eq!(TaskFilter::parse(" Pending "), Some(TaskFilter::Pending));
        assert_eq!(TaskFilter::parse("done"), None);
        assert_eq!(TaskSort::parse("A-Z"), Some(TaskSort::Alphabetical));
        assert_eq!(TaskSort::Alphabetical.next(), TaskSort::Newest);
    }
}
