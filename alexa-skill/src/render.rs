//! Speech and card rendering for the reminder list.

use tracing::info;

use crate::envelope::{Card, SkillResponse};
use crate::session::SessionAttributes;

const UNTITLED: &str = "untitled reminder";

/// Render the reminder under the cursor.
///
/// On the first page the answer is introduced with the date, type and name
/// being looked up. A cursor that has run off either end of the list is
/// clamped back and answered with a "no more" message.
pub fn render_reminders(
    attributes: &mut SessionAttributes,
    default_reminder_type: &str,
    first_time: bool,
) -> SkillResponse {
    let reminder_type = attributes
        .reminder_type
        .clone()
        .unwrap_or_else(|| default_reminder_type.to_string());
    let intro = first_time.then(|| introduction(attributes, &reminder_type));

    info!(
        count = attributes.reminder_count(),
        cursor = ?attributes.current_reminder,
        first_time,
        "Rendering reminders"
    );

    let Some(reminder) = attributes.current().cloned() else {
        info!("Not found");
        if first_time {
            attributes.current_reminder = Some(0);
            let intro = intro.unwrap_or_default();
            return SkillResponse::ask(format!("{} not found", intro), "Stop?");
        }

        attributes.clamp_cursor();
        let speech = if attributes.reminder_count() == 0 {
            format!("Sorry, no {} found", reminder_type)
        } else {
            format!("Sorry, no more {}", reminder_type)
        };
        return SkillResponse::ask(speech, navigation_hint(attributes));
    };

    let title = reminder.title().unwrap_or(UNTITLED).to_string();
    let (speech_body, card_content) = match reminder.details() {
        Some(details) => (
            format!("{}, {}", title, details),
            format!("{}\n{}", title, details),
        ),
        None => (title.clone(), title.clone()),
    };

    let card = Card::with_images(
        title,
        card_content,
        reminder.small_image_url(),
        reminder.large_image_url(),
    );

    let speech = match intro {
        Some(intro) => format!("{}, {}", intro, speech_body),
        None => speech_body,
    };

    SkillResponse::ask_with_card(speech, navigation_hint(attributes), card)
}

/// e.g. "On Monday June 20th birthdays for John"
fn introduction(attributes: &SessionAttributes, reminder_type: &str) -> String {
    let mut intro = String::new();
    if let Some(date) = &attributes.date {
        intro.push_str(&format!("On {} ", date.display_date));
    }
    intro.push_str(reminder_type);
    match (&attributes.first_name, &attributes.last_name) {
        (Some(first), Some(last)) => intro.push_str(&format!(" for {} {}", first, last)),
        (Some(first), None) => intro.push_str(&format!(" for {}", first)),
        _ => {}
    }
    intro
}

/// Reprompt listing the moves available from the current position.
pub fn navigation_hint(attributes: &SessionAttributes) -> String {
    let mut hint = String::new();
    if attributes.has_next() {
        hint.push_str("Next, ");
    }
    if attributes.has_previous() {
        hint.push_str("Previous, ");
    }
    if hint.is_empty() {
        "Stop?".to_string()
    } else {
        format!("{}or Stop?", hint)
    }
}
