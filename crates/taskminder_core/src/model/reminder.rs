//! Daily reminder configuration.
//!
//! # Responsibility
//! - Define `ReminderSettings` and the `ReminderTime` value type.
//! - Parse and format wall-clock times in 24-hour `HH:MM` form.
//!
//! # Invariants
//! - `ReminderTime` always holds `hour < 24` and `minute < 60`.
//! - Settings serialize as `{"enabled": bool, "time": "HH:MM"}`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static TIME_OF_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("valid time-of-day regex"));

/// Default reminder time used when nothing is persisted.
pub const DEFAULT_REMINDER_TIME: ReminderTime = ReminderTime { hour: 9, minute: 0 };

/// Invalid time-of-day input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderTimeError {
    /// Input is not shaped like `HH:MM`.
    Malformed(String),
    /// Hour or minute is outside the 24-hour clock.
    OutOfRange { hour: u32, minute: u32 },
}

impl Display for ReminderTimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(value) => write!(f, "reminder time must be HH:MM, got `{value}`"),
            Self::OutOfRange { hour, minute } => {
                write!(f, "reminder time {hour:02}:{minute:02} is outside 00:00-23:59")
            }
        }
    }
}

impl Error for ReminderTimeError {}

/// Wall-clock time of day, minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReminderTime {
    hour: u8,
    minute: u8,
}

impl ReminderTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, ReminderTimeError> {
        if hour > 23 || minute > 59 {
            return Err(ReminderTimeError::OutOfRange { hour, minute });
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    /// Formats as a 12-hour clock label, e.g. `9:00 AM` or `12:30 PM`.
    pub fn display_12h(self) -> String {
        let suffix = if self.hour >= 12 { "PM" } else { "AM" };
        let hour = match self.hour % 12 {
            0 => 12,
            other => other,
        };
        format!("{hour}:{:02} {suffix}", self.minute)
    }

    /// Picker choices at 30-minute steps, `00:00` through `23:30`.
    pub fn half_hour_slots() -> Vec<ReminderTime> {
        (0..24u8)
            .flat_map(|hour| [0u8, 30].map(|minute| ReminderTime { hour, minute }))
            .collect()
    }
}

impl Default for ReminderTime {
    fn default() -> Self {
        DEFAULT_REMINDER_TIME
    }
}

impl Display for ReminderTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ReminderTime {
    type Err = ReminderTimeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let captures = TIME_OF_DAY_RE
            .captures(trimmed)
            .ok_or_else(|| ReminderTimeError::Malformed(trimmed.to_string()))?;
        let hour = captures[1]
            .parse::<u32>()
            .map_err(|_| ReminderTimeError::Malformed(trimmed.to_string()))?;
        let minute = captures[2]
            .parse::<u32>()
            .map_err(|_| ReminderTimeError::Malformed(trimmed.to_string()))?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for ReminderTime {
    type Error = ReminderTimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReminderTime> for String {
    fn from(value: ReminderTime) -> Self {
        value.to_string()
    }
}

/// User configuration for the recurring daily alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReminderSettings {
    pub enabled: bool,
    pub time: ReminderTime,
}

impl ReminderSettings {
    pub fn enabled_at(time: ReminderTime) -> Self {
        Self {
            enabled: true,
            time,
        }
    }

    pub fn disabled_at(time: ReminderTime) -> Self {
        Self {
            enabled: false,
            time,
        }
    }
}
