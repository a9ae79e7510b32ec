//! Shared library for the birthday reminder skill Lambda.
//!
//! This crate provides configuration, error types, secrets lookup and the
//! reminder API client used by the skill handler.

pub mod calendar;
pub mod config;
pub mod error;
pub mod secrets;

pub use calendar::{
    ApiProfile, CalendarApi, CalendarClient, Reminder, ReminderQuery, QUERY_WINDOW_HOURS,
};
pub use config::Config;
pub use error::{Error, Result};
pub use secrets::{get_secret, resolve_api_key};
