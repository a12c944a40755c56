//! Recurring-alert capability and its in-process implementation.

use crate::model::reminder::ReminderTime;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, PoisonError};

/// Logical identifier of the daily reminder registration.
pub const DAILY_REMINDER_ID: &str = "daily-reminder";

pub type ReminderResult<T> = Result<T, ReminderError>;

/// Registering or cancelling the alert failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderError {
    /// The user (or platform) refused alert delivery.
    PermissionDenied,
    /// Platform API failure.
    Platform(String),
}

impl Display for ReminderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "notification permission not granted"),
            Self::Platform(message) => write!(f, "reminder platform error: {message}"),
        }
    }
}

impl Error for ReminderError {}

/// Outcome of a notification permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    /// Platform delivers local alerts without asking.
    NotRequired,
    Denied,
}

impl PermissionStatus {
    pub fn allows_delivery(self) -> bool {
        matches!(self, Self::Granted | Self::NotRequired)
    }
}

/// Content shown when the daily alert fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderContent {
    pub title: &'static str,
    pub body: &'static str,
    /// Screen the host opens when the alert is tapped.
    pub screen: &'static str,
}

pub const DAILY_REMINDER_CONTENT: ReminderContent = ReminderContent {
    title: "Daily Task Reminder",
    body: "Don't forget to check your todo list!",
    screen: "todos",
};

/// Platform capability for a single recurring daily alert.
///
/// `register_daily` replaces any registration under the same logical id;
/// `cancel_daily` is a no-op when nothing is registered.
pub trait ReminderScheduler {
    fn request_permission(&self) -> ReminderResult<PermissionStatus>;
    fn register_daily(&self, time: ReminderTime) -> ReminderResult<()>;
    fn cancel_daily(&self) -> ReminderResult<()>;
}

impl<S: ReminderScheduler + ?Sized> ReminderScheduler for &S {
    fn request_permission(&self) -> ReminderResult<PermissionStatus> {
        (**self).request_permission()
    }

    fn register_daily(&self, time: ReminderTime) -> ReminderResult<()> {
        (**self).register_daily(time)
    }

    fn cancel_daily(&self) -> ReminderResult<()> {
        (**self).cancel_daily()
    }
}

/// Registration table kept in process.
///
/// Hosts that own the real notification API mirror `registered()` to the
/// platform and report the permission state through `set_permission`.
#[derive(Debug)]
pub struct InMemoryReminderScheduler {
    inner: Mutex<SchedulerState>,
}

#[derive(Debug)]
struct SchedulerState {
    permission: PermissionStatus,
    registrations: BTreeMap<&'static str, ReminderTime>,
    fail_platform_calls: bool,
    register_calls: usize,
    cancel_calls: usize,
}

impl Default for InMemoryReminderScheduler {
    fn default() -> Self {
        Self::new(PermissionStatus::Granted)
    }
}

impl InMemoryReminderScheduler {
    pub fn new(permission: PermissionStatus) -> Self {
        Self {
            inner: Mutex::new(SchedulerState {
                permission,
                registrations: BTreeMap::new(),
                fail_platform_calls: false,
                register_calls: 0,
                cancel_calls: 0,
            }),
        }
    }

    pub fn set_permission(&self, permission: PermissionStatus) {
        self.lock().permission = permission;
    }

    /// Makes register/cancel calls fail until cleared.
    pub fn set_fail_platform_calls(&self, fail: bool) {
        self.lock().fail_platform_calls = fail;
    }

    /// Currently registered daily alert time.
    pub fn registered(&self) -> Option<ReminderTime> {
        self.lock().registrations.get(DAILY_REMINDER_ID).copied()
    }

    /// Number of alerts currently registered.
    pub fn registration_count(&self) -> usize {
        self.lock().registrations.len()
    }

    pub fn register_calls(&self) -> usize {
        self.lock().register_calls
    }

    pub fn cancel_calls(&self) -> usize {
        self.lock().cancel_calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SchedulerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReminderScheduler for InMemoryReminderScheduler {
    fn request_permission(&self) -> ReminderResult<PermissionStatus> {
        Ok(self.lock().permission)
    }

    fn register_daily(&self, time: ReminderTime) -> ReminderResult<()> {
        let mut state = self.lock();
        state.register_calls += 1;
        if state.fail_platform_calls {
            return Err(ReminderError::Platform("register refused".to_string()));
        }
        if !state.permission.allows_delivery() {
            return Err(ReminderError::PermissionDenied);
        }
        state.registrations.insert(DAILY_REMINDER_ID, time);
        Ok(())
    }

    fn cancel_daily(&self) -> ReminderResult<()> {
        let mut state = self.lock();
        state.cancel_calls += 1;
        if state.fail_platform_calls {
            return Err(ReminderError::Platform("cancel refused".to_string()));
        }
        state.registrations.remove(DAILY_REMINDER_ID);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemoryReminderScheduler, PermissionStatus, ReminderError, ReminderScheduler};
    use crate::model::reminder::ReminderTime;

    #[test]
    fn register_replaces_previous_registration() {
        let scheduler = InMemoryReminderScheduler::default();
        scheduler.register_daily(ReminderTime::new(7, 30).unwrap()).unwrap();
        scheduler.register_daily(ReminderTime::new(8, 0).unwrap()).unwrap();

        assert_eq!(scheduler.registration_count(), 1);
        assert_eq!(scheduler.registered(), Some(ReminderTime::new(8, 0).unwrap()));
    }

    #[test]
    fn cancel_without_registration_is_noop() {
        let scheduler = InMemoryReminderScheduler::default();
        scheduler.cancel_daily().unwrap();
        assert_eq!(scheduler.registered(), None);
    }

    #[test]
    fn register_requires_permission() {
        let scheduler = InMemoryReminderScheduler::new(PermissionStatus::Denied);
        let err = scheduler
            .register_daily(ReminderTime::default())
            .unwrap_err();
        assert_eq!(err, ReminderError::PermissionDenied);
        assert_eq!(scheduler.registration_count(), 0);
    }

    #[test]
    fn not_required_permission_allows_delivery() {
        assert!(PermissionStatus::NotRequired.allows_delivery());
        assert!(PermissionStatus::Granted.allows_delivery());
        assert!(!PermissionStatus::Denied.allows_delivery());
    }
}
