//! Session attributes carried between turns of one conversation.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use shared::Reminder;

/// Attributes persisted by Alexa between turns.
///
/// Every field is optional. Values with an unexpected shape are dropped on
/// read rather than failing the whole request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub reminder_type: Option<String>,
    #[serde(
        rename = "Date",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient"
    )]
    pub date: Option<SessionDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub reminders: Option<Vec<Reminder>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub current_reminder: Option<i64>,
}

/// A resolved date in the forms the dialog needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDate {
    /// Speech-friendly form, e.g. "Monday June 20th"
    pub display_date: String,
    /// Query fragment, e.g. "begin_date=20160620&range=24"
    pub request_date_param: String,
    pub row_date: NaiveDate,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

impl SessionAttributes {
    /// Replace the result list and point the cursor at its first entry.
    pub fn store_results(&mut self, reminders: Vec<Reminder>) {
        self.reminders = Some(reminders);
        self.current_reminder = Some(0);
    }

    pub fn reminder_count(&self) -> usize {
        self.reminders.as_ref().map_or(0, Vec::len)
    }

    /// Cursor position when it points at an existing reminder.
    pub fn cursor_index(&self) -> Option<usize> {
        let index = usize::try_from(self.current_reminder?).ok()?;
        (index < self.reminder_count()).then_some(index)
    }

    /// The reminder under the cursor, if the cursor is in range.
    pub fn current(&self) -> Option<&Reminder> {
        let index = self.cursor_index()?;
        self.reminders.as_ref()?.get(index)
    }

    /// Move the cursor. An undefined cursor stays undefined.
    pub fn step(&mut self, delta: i64) {
        if let Some(cursor) = self.current_reminder.as_mut() {
            *cursor = cursor.saturating_add(delta);
        }
    }

    /// Pull the cursor back into `[0, len)`, or to 0 for an empty list.
    pub fn clamp_cursor(&mut self) {
        let last = i64::try_from(self.reminder_count())
            .unwrap_or(i64::MAX)
            .saturating_sub(1)
            .max(0);
        self.current_reminder = Some(self.current_reminder.unwrap_or(0).clamp(0, last));
    }

    pub fn has_next(&self) -> bool {
        self.cursor_index()
            .is_some_and(|index| index + 1 < self.reminder_count())
    }

    pub fn has_previous(&self) -> bool {
        self.cursor_index().is_some_and(|index| index > 0)
    }
}
