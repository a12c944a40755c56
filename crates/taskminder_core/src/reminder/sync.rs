//! Reconciles the scheduler's registration with reminder settings.

use crate::model::reminder::ReminderSettings;
use crate::reminder::scheduler::{ReminderError, ReminderResult, ReminderScheduler};
use log::{info, warn};

/// Applies `settings` to `scheduler`.
///
/// Enabled settings cancel any prior registration, confirm delivery
/// permission and register the alert at `settings.time`. Disabled settings
/// only cancel.
///
/// # Errors
/// - `ReminderError::PermissionDenied` when delivery permission is refused;
///   the prior registration is already cancelled at that point.
/// - `ReminderError::Platform` for adapter failures.
pub fn sync_daily_reminder<S: ReminderScheduler + ?Sized>(
    scheduler: &S,
    settings: &ReminderSettings,
) -> ReminderResult<()> {
    scheduler.cancel_daily()?;

    if !settings.enabled {
        info!("event=reminder_sync module=reminder status=ok action=cancel");
        return Ok(());
    }

    if !scheduler.request_permission()?.allows_delivery() {
        warn!("event=reminder_sync module=reminder status=error error_code=permission_denied");
        return Err(ReminderError::PermissionDenied);
    }

    scheduler.register_daily(settings.time)?;
    info!(
        "event=reminder_sync module=reminder status=ok action=register time={}",
        settings.time
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::sync_daily_reminder;
    use crate::model::reminder::{ReminderSettings, ReminderTime};
    use crate::reminder::scheduler::{InMemoryReminderScheduler, PermissionStatus, ReminderError};

    #[test]
    fn enabled_settings_register_single_alert() {
        let scheduler = InMemoryReminderScheduler::default();
        let first = ReminderSettings::enabled_at(ReminderTime::new(7, 30).unwrap());
        let second = ReminderSettings::enabled_at(ReminderTime::new(8, 0).unwrap());

        sync_daily_reminder(&scheduler, &first).unwrap();
        sync_daily_reminder(&scheduler, &second).unwrap();

        assert_eq!(scheduler.registration_count(), 1);
        assert_eq!(scheduler.registered(), Some(second.time));
        assert_eq!(scheduler.cancel_calls(), 2);
    }

    #[test]
    fn disabled_settings_cancel_existing_alert() {
        let scheduler = InMemoryReminderScheduler::default();
        let time = ReminderTime::new(7, 30).unwrap();
        sync_daily_reminder(&scheduler, &ReminderSettings::enabled_at(time)).unwrap();

        sync_daily_reminder(&scheduler, &ReminderSettings::disabled_at(time)).unwrap();
        assert_eq!(scheduler.registered(), None);
        assert_eq!(scheduler.register_calls(), 1);
    }

    #[test]
    fn denied_permission_leaves_nothing_registered() {
        let scheduler = InMemoryReminderScheduler::default();
        let settings = ReminderSettings::enabled_at(ReminderTime::default());
        sync_daily_reminder(&scheduler, &settings).unwrap();

        scheduler.set_permission(PermissionStatus::Denied);
        let err = sync_daily_reminder(&scheduler, &settings).unwrap_err();
        assert_eq!(err, ReminderError::PermissionDenied);
        assert_eq!(scheduler.registration_count(), 0);
    }

    #[test]
    fn platform_failure_is_reported() {
        let scheduler = InMemoryReminderScheduler::default();
        scheduler.set_fail_platform_calls(true);

        let err = sync_daily_reminder(&scheduler, &ReminderSettings::default()).unwrap_err();
        assert!(matches!(err, ReminderError::Platform(_)));
    }
}
