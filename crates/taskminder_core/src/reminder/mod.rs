//! Reminder scheduler adapter.
//!
//! # Responsibility
//! - Define the platform capability for one recurring daily alert.
//! - Reconcile that registration with the user's `ReminderSettings`.
//!
//! # Invariants
//! - At most one daily alert exists, under `DAILY_REMINDER_ID`.
//! - An alert is registered iff settings are enabled, at the configured time.

pub mod scheduler;
pub mod sync;
