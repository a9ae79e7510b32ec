//! Date slot parsing and speech formatting.

use chrono::{Datelike, NaiveDate};
use shared::calendar::{day_window, request_date_param};

use crate::session::SessionDate;

/// Parse an AMAZON.DATE slot value naming a single day (`YYYY-MM-DD`).
///
/// Week, weekend, month and decade values are not supported and yield `None`,
/// as do days too close to the end of the calendar to have a full query window.
pub fn parse_date_slot(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .ok()
        .filter(|date| day_window(*date).is_some())
}

/// Speech form of a date, e.g. "Monday June 20th".
pub fn display_date(date: NaiveDate) -> String {
    format!(
        "{} {}{}",
        date.format("%A %B"),
        date.day(),
        ordinal_suffix(date.day())
    )
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// All the forms of a date kept in the session.
pub fn session_date(date: NaiveDate) -> SessionDate {
    SessionDate {
        display_date: display_date(date),
        request_date_param: request_date_param(date),
        row_date: date,
    }
}
