//! Core use-case services.
//!
//! # Responsibility
//! - Own the task/reminder state machine and its side effects.
//! - Keep host (FFI/CLI) layers decoupled from storage and platform details.

pub mod task_query;
pub mod task_store;
