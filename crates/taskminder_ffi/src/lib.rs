//! Flutter-facing bindings for Taskminder core.

pub mod api;
