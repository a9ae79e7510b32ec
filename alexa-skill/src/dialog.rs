//! Reminder dialog: slot gathering, the API lookup and paging.

use async_trait::async_trait;
use shared::{CalendarApi, Config, ReminderQuery};
use tracing::{error, info};

use crate::envelope::{Card, Intent, Session, SkillResponse};
use crate::render::render_reminders;
use crate::session::SessionAttributes;
use crate::skill::{IntentName, SkillHandler};
use crate::slots::{self, DateResolution, ResolvedSlots};

pub const HELP_PROMPT: &str = "What contact or date would you like reminders for?";
pub const LINK_ACCOUNT_PROMPT: &str = "What Google account would you like reminders for?";
pub const API_FAILURE_SPEECH: &str =
    "Sorry, the GoogleAPI service is experiencing a problem. Please try again later";
pub const GOODBYE_SPEECH: &str = "Goodbye";

const NEED_NAME_OR_DATE_REPROMPT: &str =
    "Currently, I find reminders for contact name or date: What name should I look up?";

/// How the user entered the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogMode {
    /// Everything asked in one utterance; a date is required.
    OneShot,
    /// Values gathered over several turns; a name or a date is enough.
    MultiTurn,
}

/// Next step of the dialog for the resolved slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Neither a name nor a date is known yet.
    NeedNameOrDate,
    /// The date was missing or not understood.
    ClarifyDate,
    Finalize,
}

pub fn route(mode: DialogMode, slots: &ResolvedSlots) -> Route {
    match (&slots.date, mode) {
        (DateResolution::Invalid(_), _) => Route::ClarifyDate,
        _ if slots.needs_name_or_date() => Route::NeedNameOrDate,
        (DateResolution::Missing, DialogMode::OneShot) => Route::ClarifyDate,
        _ => Route::Finalize,
    }
}

/// The birthday reminder skill.
pub struct BirthdayReminderSkill<C> {
    calendar: C,
    skill_name: String,
    default_reminder_type: String,
}

impl<C: CalendarApi> BirthdayReminderSkill<C> {
    pub fn new(calendar: C, config: &Config) -> Self {
        Self {
            calendar,
            skill_name: config.skill_name.clone(),
            default_reminder_type: config.default_reminder_type.clone(),
        }
    }

    #[cfg(test)]
    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    /// Prompt for a contact or date, or for account linking when no token is present.
    fn help(&self, session: &Session, welcome: &str) -> SkillResponse {
        if session.access_token().is_some() {
            let reprompt = format!(
                "I can lead you through providing a name or date to find reminders, \
                 or you can simply open {} and ask a question like, get birthdays for Saturday. ",
                self.skill_name
            );
            SkillResponse::ask(format!("{}{}", welcome, HELP_PROMPT), reprompt)
        } else {
            SkillResponse::ask_with_card(
                format!("{}{}", welcome, LINK_ACCOUNT_PROMPT),
                "To get started with the reminders I can lead you through linking \
                 your Google account with the Amazon one, just open Alexa companion app \
                 on your device and click the link on my home card. ",
                Card::LinkAccount,
            )
        }
    }

    async fn reminder_request(
        &self,
        mode: DialogMode,
        intent: &Intent,
        session: &Session,
        attributes: &mut SessionAttributes,
    ) -> SkillResponse {
        let resolved = slots::resolve(intent, attributes, &self.default_reminder_type);
        let next = route(mode, &resolved);
        info!(?mode, route = ?next, "Routing reminder request");

        match next {
            Route::NeedNameOrDate => SkillResponse::ask(
                format!(
                    "I'm sorry, I need date or name to look up {}. ",
                    resolved.reminder_type
                ),
                NEED_NAME_OR_DATE_REPROMPT,
            ),
            Route::ClarifyDate => {
                let reprompt = format!(
                    "Please try again saying for which day, for example, Saturday. \
                     For which date would you like {}?",
                    resolved.reminder_type
                );
                SkillResponse::ask(
                    format!("I'm sorry, I didn't understand that date. {}", reprompt),
                    reprompt,
                )
            }
            Route::Finalize => self.final_response(&resolved, session, attributes).await,
        }
    }

    /// Issue the lookup and answer with the first result.
    async fn final_response(
        &self,
        resolved: &ResolvedSlots,
        session: &Session,
        attributes: &mut SessionAttributes,
    ) -> SkillResponse {
        let query = ReminderQuery {
            access_token: session.access_token().map(String::from),
            name: resolved.name.clone(),
            date: resolved.row_date(),
            reminder_type: resolved.reminder_type.clone(),
        };
        info!(
            name = ?query.name,
            date = ?query.date,
            reminder_type = %query.reminder_type,
            "Looking up reminders"
        );

        match self.calendar.fetch_reminders(&query).await {
            Ok(reminders) => {
                info!(count = reminders.len(), "Reminder lookup succeeded");
                attributes.store_results(reminders);
                render_reminders(attributes, &self.default_reminder_type, true)
            }
            Err(e) => {
                error!("Reminder lookup failed: {}", e);
                SkillResponse::tell(API_FAILURE_SPEECH)
            }
        }
    }

    fn navigate(&self, attributes: &mut SessionAttributes, delta: i64) -> SkillResponse {
        attributes.step(delta);
        render_reminders(attributes, &self.default_reminder_type, false)
    }
}

#[async_trait]
impl<C: CalendarApi> SkillHandler for BirthdayReminderSkill<C> {
    async fn on_launch(
        &self,
        request_id: &str,
        session: &Session,
        _attributes: &mut SessionAttributes,
    ) -> SkillResponse {
        info!(request_id, session_id = %session.session_id, "Launch request");
        self.help(session, &format!("Welcome to {}. ", self.skill_name))
    }

    async fn on_intent(
        &self,
        name: IntentName,
        intent: &Intent,
        session: &Session,
        attributes: &mut SessionAttributes,
    ) -> SkillResponse {
        info!(intent = name.as_str(), "Handling intent");
        match name {
            IntentName::OneshotReminder => {
                self.reminder_request(DialogMode::OneShot, intent, session, attributes)
                    .await
            }
            IntentName::DialogReminder => {
                self.reminder_request(DialogMode::MultiTurn, intent, session, attributes)
                    .await
            }
            IntentName::Help
            | IntentName::StartOver
            | IntentName::NavigateHome
            | IntentName::Fallback => self.help(session, ""),
            IntentName::Stop | IntentName::Cancel => SkillResponse::tell(GOODBYE_SPEECH),
            IntentName::Next => self.navigate(attributes, 1),
            IntentName::Previous => self.navigate(attributes, -1),
        }
    }
}
