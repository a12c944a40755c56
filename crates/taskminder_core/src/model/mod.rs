//! Domain model for the task list and its daily reminder.
//!
//! # Responsibility
//! - Define the canonical task record and reminder configuration.
//! - Own field normalization and validation rules shared by every caller.
//!
//! # Invariants
//! - Every task has a non-empty trimmed title and `updated_at >= created_at`.
//! - Reminder times are always a valid 24-hour `HH:MM` value.

pub mod reminder;
pub mod task;
