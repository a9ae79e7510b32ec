//! Slot resolution: current turn, then session, then default.

use chrono::NaiveDate;
use tracing::debug;

use crate::dates::{parse_date_slot, session_date};
use crate::envelope::Intent;
use crate::session::{SessionAttributes, SessionDate};

pub const FIRST_NAME_SLOT: &str = "FirstName";
pub const DATE_SLOT: &str = "Date";
pub const REMINDER_SLOT: &str = "Reminder";

/// Outcome of resolving the date slot.
#[derive(Debug, Clone, PartialEq)]
pub enum DateResolution {
    Resolved(SessionDate),
    Missing,
    /// The user gave a date we could not understand.
    Invalid(String),
}

/// Slot values for one turn after applying precedence.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSlots {
    pub name: Option<String>,
    pub date: DateResolution,
    pub reminder_type: String,
}

impl ResolvedSlots {
    /// Neither a name nor a usable date is known.
    pub fn needs_name_or_date(&self) -> bool {
        self.name.is_none() && self.resolved_date().is_none()
    }

    pub fn resolved_date(&self) -> Option<&SessionDate> {
        match &self.date {
            DateResolution::Resolved(date) => Some(date),
            _ => None,
        }
    }

    pub fn row_date(&self) -> Option<NaiveDate> {
        self.resolved_date().map(|date| date.row_date)
    }
}

/// Resolve every slot and record the results in the session.
pub fn resolve(
    intent: &Intent,
    attributes: &mut SessionAttributes,
    default_reminder_type: &str,
) -> ResolvedSlots {
    let resolved = ResolvedSlots {
        name: resolve_first_name(intent, attributes),
        date: resolve_date(intent, attributes),
        reminder_type: resolve_reminder_type(intent, attributes, default_reminder_type),
    };
    debug!(
        name = ?resolved.name,
        date = ?resolved.date,
        reminder_type = %resolved.reminder_type,
        "Resolved slots"
    );
    resolved
}

pub fn resolve_first_name(intent: &Intent, attributes: &mut SessionAttributes) -> Option<String> {
    let first_name = intent
        .slot_value(FIRST_NAME_SLOT)
        .map(String::from)
        .or_else(|| non_empty(attributes.first_name.as_deref()));
    attributes.first_name = first_name.clone();
    first_name
}

/// The session keeps only what the user said; the default is applied on read.
pub fn resolve_reminder_type(
    intent: &Intent,
    attributes: &mut SessionAttributes,
    default_reminder_type: &str,
) -> String {
    let reminder_type = intent
        .slot_value(REMINDER_SLOT)
        .map(String::from)
        .or_else(|| non_empty(attributes.reminder_type.as_deref()));
    attributes.reminder_type = reminder_type.clone();
    reminder_type.unwrap_or_else(|| default_reminder_type.to_string())
}

/// An unparseable date slot leaves the stored date untouched.
pub fn resolve_date(intent: &Intent, attributes: &mut SessionAttributes) -> DateResolution {
    match intent.slot_value(DATE_SLOT) {
        Some(raw) => match parse_date_slot(raw) {
            Some(date) => {
                let resolved = session_date(date);
                attributes.date = Some(resolved.clone());
                DateResolution::Resolved(resolved)
            }
            None => DateResolution::Invalid(raw.to_string()),
        },
        None => match &attributes.date {
            Some(stored) => DateResolution::Resolved(stored.clone()),
            None => DateResolution::Missing,
        },
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Slot;

    fn intent(slots: &[(&str, &str)]) -> Intent {
        Intent {
            name: "DialogReminderIntent".to_string(),
            slots: slots
                .iter()
                .map(|(name, value)| {
                    (
                        name.to_string(),
                        Slot {
                            value: Some(value.to_string()),
                        },
                    )
                })
                .collect(),
        }
    }

    fn stored_session() -> SessionAttributes {
        SessionAttributes {
            first_name: Some("Arya".to_string()),
            reminder_type: Some("anniversaries".to_string()),
            date: Some(session_date(NaiveDate::from_ymd_opt(2016, 7, 4).unwrap())),
            ..SessionAttributes::default()
        }
    }

    #[test]
    fn test_current_turn_overrides_session() {
        let mut attributes = stored_session();
        let resolved = resolve(
            &intent(&[("FirstName", "John"), ("Date", "2016-06-20"), ("Reminder", "birthdays")]),
            &mut attributes,
            "reminders",
        );
        assert_eq!(resolved.name.as_deref(), Some("John"));
        assert_eq!(resolved.reminder_type, "birthdays");
        assert_eq!(resolved.row_date(), NaiveDate::from_ymd_opt(2016, 6, 20));
        assert_eq!(attributes.first_name.as_deref(), Some("John"));
        assert_eq!(attributes.reminder_type.as_deref(), Some("birthdays"));
        assert_eq!(
            attributes.date.as_ref().map(|d| d.display_date.as_str()),
            Some("Monday June 20th")
        );
    }

    #[test]
    fn test_session_used_when_slots_absent() {
        let mut attributes = stored_session();
        let resolved = resolve(&intent(&[]), &mut attributes, "reminders");
        assert_eq!(resolved.name.as_deref(), Some("Arya"));
        assert_eq!(resolved.reminder_type, "anniversaries");
        assert_eq!(resolved.row_date(), NaiveDate::from_ymd_opt(2016, 7, 4));
        assert!(!resolved.needs_name_or_date());
    }

    #[test]
    fn test_empty_slot_values_count_as_absent() {
        let mut attributes = stored_session();
        let resolved = resolve(
            &intent(&[("FirstName", ""), ("Date", " "), ("Reminder", "")]),
            &mut attributes,
            "reminders",
        );
        assert_eq!(resolved.name.as_deref(), Some("Arya"));
        assert_eq!(resolved.reminder_type, "anniversaries");
        assert_eq!(resolved.row_date(), NaiveDate::from_ymd_opt(2016, 7, 4));
    }

    #[test]
    fn test_reminder_type_defaults_without_storing_default() {
        let mut attributes = SessionAttributes::default();
        let resolved = resolve(&intent(&[("FirstName", "John")]), &mut attributes, "reminders");
        assert_eq!(resolved.reminder_type, "reminders");
        assert!(attributes.reminder_type.is_none());
    }

    #[test]
    fn test_name_and_date_combinations() {
        let cases = [
            (Some("John"), Some("2016-06-20"), false),
            (Some("John"), None, false),
            (None, Some("2016-06-20"), false),
            (None, None, true),
        ];
        for (name, date, needs) in cases {
            let mut slots = Vec::new();
            if let Some(name) = name {
                slots.push(("FirstName", name));
            }
            if let Some(date) = date {
                slots.push(("Date", date));
            }
            let mut attributes = SessionAttributes::default();
            let resolved = resolve(&intent(&slots), &mut attributes, "reminders");
            assert_eq!(resolved.needs_name_or_date(), needs, "name={:?} date={:?}", name, date);
            assert_eq!(resolved.name.as_deref(), name);
            if date.is_none() {
                assert_eq!(resolved.date, DateResolution::Missing);
            }
        }
    }

    #[test]
    fn test_invalid_date_keeps_stored_date() {
        let mut attributes = stored_session();
        let resolved = resolve(&intent(&[("Date", "2016-W25")]), &mut attributes, "reminders");
        assert_eq!(resolved.date, DateResolution::Invalid("2016-W25".to_string()));
        assert_eq!(
            attributes.date.as_ref().map(|d| d.row_date),
            NaiveDate::from_ymd_opt(2016, 7, 4)
        );
    }

    #[test]
    fn test_date_at_end_of_calendar_is_invalid() {
        let mut attributes = stored_session();
        let resolved = resolve(&intent(&[("Date", "+262142-12-31")]), &mut attributes, "reminders");
        assert_eq!(resolved.date, DateResolution::Invalid("+262142-12-31".to_string()));
        assert_eq!(
            attributes.date.as_ref().map(|d| d.row_date),
            NaiveDate::from_ymd_opt(2016, 7, 4)
        );
    }

    #[test]
    fn test_invalid_date_without_name_needs_more_info() {
        let mut attributes = SessionAttributes::default();
        let resolved = resolve(&intent(&[("Date", "someday")]), &mut attributes, "reminders");
        assert!(resolved.needs_name_or_date());
    }

    #[test]
    fn test_resolving_stored_date_twice_is_stable() {
        let mut attributes = SessionAttributes::default();
        let first = resolve(&intent(&[("Date", "2016-06-20")]), &mut attributes, "reminders");
        let second = resolve(&intent(&[]), &mut attributes, "reminders");
        assert_eq!(first.date, second.date);
    }
}
