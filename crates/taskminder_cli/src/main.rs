//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `taskminder_core` linkage without the Flutter/FFI runtime.
//! - Run one throwaway in-memory store round with deterministic output.

use taskminder_core::{
    InMemoryReminderScheduler, MemoryKeyValueStore, ReminderSettings, ReminderTime, TaskStore,
};

fn main() {
    println!("taskminder_core ping={}", taskminder_core::ping());
    println!("taskminder_core version={}", taskminder_core::core_version());

    let kv = MemoryKeyValueStore::new();
    let scheduler = InMemoryReminderScheduler::default();
    let mut store = TaskStore::new(&kv, &scheduler);
    store.initialize();

    let outcome = store
        .add_task("smoke task", None)
        .and_then(|task| store.toggle_task(&task.id))
        .and_then(|_| {
            store.update_reminder_settings(ReminderSettings::enabled_at(ReminderTime::default()))
        });
    if let Err(err) = outcome {
        eprintln!("taskminder_core store smoke failed: {err}");
        std::process::exit(1);
    }

    let counts = store.counts();
    println!(
        "taskminder_core store pending={} completed={} reminder={}",
        counts.pending,
        counts.completed,
        scheduler
            .registered()
            .map_or_else(|| "none".to_string(), |time| time.to_string())
    );
}
