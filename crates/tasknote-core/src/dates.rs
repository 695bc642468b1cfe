//! Calendar-date helpers.
//!
//! Recurrence works on plain local dates. Timestamps only show up at the
//! edges (`createdAt`, display), and are reduced to a date here.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::CoreError;
use crate::models::Task;

/// Wire format of every calendar date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a strict `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| CoreError::InvalidDate(value.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Reduces an ISO-8601 timestamp to the local calendar date it falls on.
///
/// Accepts RFC 3339 with an offset (converted to local time), a naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]`, or a bare date. Anything else is `None`.
pub fn timestamp_to_local_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Local).date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// First date from which the task's recurrence rule is evaluated:
/// `due_date`, or the local date of `created_at` when no due date is set.
pub fn resolve_anchor(task: &Task) -> Option<NaiveDate> {
    task.due_date
        .or_else(|| timestamp_to_local_date(&task.created_at))
}

/// Whole days from `from` to `to`; negative when `to` is earlier.
#[inline]
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Parses a `HH:MM` due time.
pub fn parse_time(value: &str) -> Result<NaiveTime, CoreError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| CoreError::InvalidInput(format!("Invalid time '{}', expected HH:MM", value)))
}

/// Combines a date with an optional `HH:MM` time for display. An
/// unparseable time is ignored rather than rejected.
pub fn to_local_datetime(date: NaiveDate, time: Option<&str>) -> NaiveDateTime {
    let time = time
        .and_then(|t| parse_time(t).ok())
        .unwrap_or(NaiveTime::MIN);
    date.and_time(time)
}
