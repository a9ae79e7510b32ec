//! Birthday Reminder Alexa Skill Lambda - Looks up contact reminders by name or date.
//!
//! Users ask for reminders either in one utterance ("ask Google Birthday
//! Reminder for the birthday of John") or over a short dialog. The skill calls
//! the configured reminder API once per lookup and then pages through the
//! results with "next" and "previous".

mod dates;
mod dialog;
mod envelope;
mod render;
mod session;
mod skill;
mod slots;

use std::sync::Arc;

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use shared::{resolve_api_key, CalendarClient, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::dialog::BirthdayReminderSkill;
use crate::envelope::{RequestEnvelope, ResponseEnvelope};

/// Application state
struct AppState {
    skill: BirthdayReminderSkill<CalendarClient>,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;
        let api_key = resolve_api_key(&config).await?;
        let calendar = CalendarClient::new(&config, api_key);

        info!(
            profile = %calendar.profile(),
            endpoint = %config.endpoint(),
            "Reminder skill configured"
        );

        Ok(Self {
            skill: BirthdayReminderSkill::new(calendar, &config),
        })
    }
}

async fn handler(
    state: Arc<AppState>,
    event: LambdaEvent<RequestEnvelope>,
) -> Result<ResponseEnvelope, Error> {
    let (request, context) = event.into_parts();
    info!(
        aws_request_id = %context.request_id,
        alexa_request_id = request.request.request_id(),
        "Handling Alexa request"
    );

    let response = skill::dispatch(&state.skill, request).await?;
    info!(
        speech = ?response.response.speech_text(),
        reprompt = ?response.response.reprompt_text(),
        should_end_session = response.response.should_end_session,
        "Responding"
    );
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
