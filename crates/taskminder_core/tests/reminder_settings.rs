use chrono::{TimeZone, Utc};
use taskminder_core::repo::state_repo::REMINDER_SETTINGS_KEY;
use taskminder_core::{
    InMemoryReminderScheduler, ManualClock, MemoryKeyValueStore, PermissionStatus, ReminderError,
    ReminderSettings, ReminderTime, StoreConfig, StoreError, TaskStore,
};

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2026, 8, 10, 6, 0, 0).unwrap())
}

fn at(hour: u32, minute: u32) -> ReminderTime {
    ReminderTime::new(hour, minute).unwrap()
}

#[test]
fn rescheduling_keeps_exactly_one_alert() {
    let kv = MemoryKeyValueStore::new();
    let scheduler = InMemoryReminderScheduler::default();
    let clock = clock();
    let mut store = TaskStore::with_config(&kv, &scheduler, &clock, StoreConfig::default());
    store.initialize();

    store
        .update_reminder_settings(ReminderSettings::enabled_at(at(7, 30)))
        .unwrap();
    store
        .update_reminder_settings(ReminderSettings::enabled_at(at(8, 0)))
        .unwrap();

    assert_eq!(scheduler.registration_count(), 1);
    assert_eq!(scheduler.registered(), Some(at(8, 0)));
    assert_eq!(
        kv.raw(REMINDER_SETTINGS_KEY).as_deref(),
        Some(r#"{"enabled":true,"time":"08:00"}"#)
    );
}

#[test]
fn disabling_removes_registration_from_any_prior_state() {
    let kv = MemoryKeyValueStore::new();
    let scheduler = InMemoryReminderScheduler::default();
    let clock = clock();
    let mut store = TaskStore::with_config(&kv, &scheduler, &clock, StoreConfig::default());
    store.initialize();

    store
        .update_reminder_settings(ReminderSettings::disabled_at(at(9, 0)))
        .unwrap();
    assert_eq!(scheduler.registered(), None);

    store
        .update_reminder_settings(ReminderSettings::enabled_at(at(6, 45)))
        .unwrap();
    store
        .update_reminder_settings(ReminderSettings::disabled_at(at(6, 45)))
        .unwrap();
    assert_eq!(scheduler.registered(), None);
    assert!(!store.reminder_settings().enabled);
}

#[test]
fn denied_permission_keeps_reminders_disabled() {
    let kv = MemoryKeyValueStore::new();
    let scheduler = InMemoryReminderScheduler::new(PermissionStatus::Denied);
    let clock = clock();
    let mut store = TaskStore::with_config(&kv, &scheduler, &clock, StoreConfig::default());
    store.initialize();
    let writes = kv.write_count();

    let err = store
        .update_reminder_settings(ReminderSettings::enabled_at(at(7, 0)))
        .unwrap_err();

    assert_eq!(err, StoreError::PermissionDenied);
    assert!(!store.reminder_settings().enabled);
    assert_eq!(scheduler.registered(), None);
    assert_eq!(kv.write_count(), writes);
}

#[test]
fn not_required_permission_allows_enabling() {
    let kv = MemoryKeyValueStore::new();
    let scheduler = InMemoryReminderScheduler::new(PermissionStatus::NotRequired);
    let clock = clock();
    let mut store = TaskStore::with_config(&kv, &scheduler, &clock, StoreConfig::default());
    store.initialize();

    store
        .update_reminder_settings(ReminderSettings::enabled_at(at(20, 0)))
        .unwrap();
    assert_eq!(scheduler.registered(), Some(at(20, 0)));
}

#[test]
fn sync_failure_keeps_settings_and_retries_on_repeat() {
    let kv = MemoryKeyValueStore::new();
    let scheduler = InMemoryReminderScheduler::default();
    let clock = clock();
    let mut store = TaskStore::with_config(&kv, &scheduler, &clock, StoreConfig::default());
    store.initialize();
    let settings = ReminderSettings::enabled_at(at(7, 15));

    scheduler.set_fail_platform_calls(true);
    store.update_reminder_settings(settings).unwrap();
    assert_eq!(store.reminder_settings(), settings);
    assert!(!store.reminder_in_sync());
    assert_eq!(scheduler.registered(), None);
    assert!(kv.raw(REMINDER_SETTINGS_KEY).is_some());

    scheduler.set_fail_platform_calls(false);
    store.update_reminder_settings(settings).unwrap();
    assert!(store.reminder_in_sync());
    assert_eq!(scheduler.registered(), Some(at(7, 15)));
}

#[test]
fn unchanged_settings_do_not_resync_when_in_sync() {
    let kv = MemoryKeyValueStore::new();
    let scheduler = InMemoryReminderScheduler::default();
    let clock = clock();
    let mut store = TaskStore::with_config(&kv, &scheduler, &clock, StoreConfig::default());
    store.initialize();
    let settings = ReminderSettings::enabled_at(at(10, 0));
    store.update_reminder_settings(settings).unwrap();
    let registers = scheduler.register_calls();
    let writes = kv.write_count();

    store.update_reminder_settings(settings).unwrap();
    assert_eq!(scheduler.register_calls(), registers);
    assert_eq!(kv.write_count(), writes);
}

#[test]
fn task_mutations_never_touch_the_scheduler() {
    let kv = MemoryKeyValueStore::new();
    let scheduler = InMemoryReminderScheduler::default();
    let clock = clock();
    let mut store = TaskStore::with_config(&kv, &scheduler, &clock, StoreConfig::default());
    store.initialize();
    let cancels = scheduler.cancel_calls();

    let task = store.add_task("no alerts please", None).unwrap();
    store.toggle_task(&task.id).unwrap();
    store.delete_task(&task.id).unwrap();

    assert_eq!(scheduler.cancel_calls(), cancels);
    assert_eq!(scheduler.register_calls(), 0);
}

#[test]
fn initialize_reconciles_registration_with_persisted_settings() {
    let kv = MemoryKeyValueStore::new();
    kv.insert_raw(REMINDER_SETTINGS_KEY, r#"{"enabled":true,"time":"06:30"}"#);
    let scheduler = InMemoryReminderScheduler::default();
    let clock = clock();
    let mut store = TaskStore::with_config(&kv, &scheduler, &clock, StoreConfig::default());

    store.initialize();

    assert_eq!(scheduler.registered(), Some(at(6, 30)));
    assert!(store.reminder_in_sync());
    assert_eq!(kv.write_count(), 0);
}

#[test]
fn resync_reapplies_after_permission_is_restored() {
    let kv = MemoryKeyValueStore::new();
    kv.insert_raw(REMINDER_SETTINGS_KEY, r#"{"enabled":true,"time":"06:30"}"#);
    let scheduler = InMemoryReminderScheduler::new(PermissionStatus::Denied);
    let clock = clock();
    let mut store = TaskStore::with_config(&kv, &scheduler, &clock, StoreConfig::default());

    store.initialize();
    assert!(!store.reminder_in_sync());
    assert_eq!(scheduler.registered(), None);

    scheduler.set_permission(PermissionStatus::Granted);
    assert!(store.resync_reminder().unwrap());
    assert_eq!(scheduler.registered(), Some(at(6, 30)));
}

#[test]
fn reported_platform_failure_marks_store_out_of_sync() {
    let kv = MemoryKeyValueStore::new();
    let scheduler = InMemoryReminderScheduler::default();
    let clock = clock();
    let mut store = TaskStore::with_config(&kv, &scheduler, &clock, StoreConfig::default());
    store.initialize();
    store
        .update_reminder_settings(ReminderSettings::enabled_at(at(7, 0)))
        .unwrap();
    assert!(store.reminder_in_sync());

    store.report_reminder_sync(Err(ReminderError::Platform("alarm service down".to_string())));
    assert!(!store.reminder_in_sync());
    assert_eq!(store.reminder_settings(), ReminderSettings::enabled_at(at(7, 0)));

    store.report_reminder_sync(Ok(()));
    assert!(store.reminder_in_sync());
}
