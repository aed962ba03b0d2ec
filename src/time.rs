//! Calendar dates and wall-clock times for lab sessions.
//!
//! Sessions are booked on a calendar day between two clock times. Windows are
//! half-open: `[start, end)` ends exactly when the next may begin.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A calendar day.
///
/// Ordering is lexicographic by (year, month, day).
///
/// # Examples
///
/// ```
/// use labdesk::Date;
///
/// let a = Date::new(2024, 3, 10).unwrap();
/// let b = Date::new(2024, 3, 11).unwrap();
/// assert!(a < b);
/// assert!(Date::new(2024, 2, 30).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a date, rejecting days that do not exist in the calendar.
    pub fn new(year: u64, month: u64, day: u64) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidDate { year, month, day };
        let y = i32::try_from(year).map_err(|_| invalid())?;
        let m = u32::try_from(month).map_err(|_| invalid())?;
        let d = u32::try_from(day).map_err(|_| invalid())?;
        NaiveDate::from_ymd_opt(y, m, d).map(Self).ok_or_else(invalid)
    }

    #[must_use]
    pub const fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    #[must_use]
    pub const fn as_naive(&self) -> NaiveDate {
        self.0
    }

    #[must_use]
    pub fn year(&self) -> u64 {
        u64::try_from(self.0.year()).unwrap_or(0)
    }

    #[must_use]
    pub fn month(&self) -> u64 {
        u64::from(self.0.month())
    }

    #[must_use]
    pub fn day(&self) -> u64 {
        u64::from(self.0.day())
    }

    /// Day of the week, derived from the calendar rather than stored.
    #[must_use]
    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// Full English weekday name, e.g. "Sunday".
    #[must_use]
    pub fn weekday_name(&self) -> &'static str {
        match self.weekday() {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }

    /// ISO form used in file names, e.g. "2024-03-10".
    #[must_use]
    pub fn iso(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}/{}", self.day(), self.month(), self.0.year())
    }
}

/// A wall-clock time with minute resolution.
///
/// Ordering is lexicographic by (hour, minute).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Time {
    hour: u8,
    minute: u8,
}

impl Time {
    /// Midnight; also the value carried by unfilled actual times.
    pub const ZERO: Self = Self { hour: 0, minute: 0 };

    /// Creates a time, rejecting hours above 23 and minutes above 59.
    pub fn new(hour: u64, minute: u64) -> Result<Self, ValidationError> {
        if hour > 23 || minute > 59 {
            return Err(ValidationError::InvalidTime { hour, minute });
        }
        let hour = u8::try_from(hour).map_err(|_| ValidationError::InvalidTime { hour, minute })?;
        let minute = u8::try_from(minute)
            .map_err(|_| ValidationError::InvalidTime { hour: u64::from(hour), minute })?;
        Ok(Self { hour, minute })
    }

    #[must_use]
    pub const fn hour(&self) -> u64 {
        self.hour as u64
    }

    #[must_use]
    pub const fn minute(&self) -> u64 {
        self.minute as u64
    }

    #[must_use]
    pub const fn minutes_since_midnight(&self) -> i64 {
        self.hour as i64 * 60 + self.minute as i64
    }

    /// Hours elapsed from `self` to `end`; negative when `end` is earlier.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hours_until(&self, end: Self) -> f64 {
        (end.minutes_since_midnight() - self.minutes_since_midnight()) as f64 / 60.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Half-open overlap test: `[a_start, a_end)` and `[b_start, b_end)` overlap
/// iff `a_start < b_end && b_start < a_end`.
#[must_use]
pub fn windows_overlap(a_start: Time, a_end: Time, b_start: Time, b_end: Time) -> bool {
    a_start < b_end && b_start < a_end
}

/// Rejects windows whose start is not strictly before their end.
pub fn validate_window(start: Time, end: Time) -> Result<(), ValidationError> {
    if start >= end {
        return Err(ValidationError::InvertedWindow { start, end });
    }
    Ok(())
}
