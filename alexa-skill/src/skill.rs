//! Skill handler interface and request dispatch.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::envelope::{
    Intent, RequestEnvelope, ResponseEnvelope, Session, SkillRequest, SkillResponse,
};
use crate::session::SessionAttributes;

/// Intents the skill understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentName {
    OneshotReminder,
    DialogReminder,
    Help,
    StartOver,
    Stop,
    Cancel,
    Next,
    Previous,
    NavigateHome,
    Fallback,
}

impl IntentName {
    pub fn from_name(name: &str) -> Option<Self> {
        let intent = match name {
            "OneshotReminderIntent" => IntentName::OneshotReminder,
            "DialogReminderIntent" => IntentName::DialogReminder,
            "AMAZON.HelpIntent" => IntentName::Help,
            "AMAZON.StartOverIntent" => IntentName::StartOver,
            "AMAZON.StopIntent" => IntentName::Stop,
            "AMAZON.CancelIntent" => IntentName::Cancel,
            "AMAZON.NextIntent" => IntentName::Next,
            "AMAZON.PreviousIntent" => IntentName::Previous,
            "AMAZON.NavigateHomeIntent" => IntentName::NavigateHome,
            "AMAZON.FallbackIntent" => IntentName::Fallback,
            _ => return None,
        };
        Some(intent)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentName::OneshotReminder => "OneshotReminderIntent",
            IntentName::DialogReminder => "DialogReminderIntent",
            IntentName::Help => "AMAZON.HelpIntent",
            IntentName::StartOver => "AMAZON.StartOverIntent",
            IntentName::Stop => "AMAZON.StopIntent",
            IntentName::Cancel => "AMAZON.CancelIntent",
            IntentName::Next => "AMAZON.NextIntent",
            IntentName::Previous => "AMAZON.PreviousIntent",
            IntentName::NavigateHome => "AMAZON.NavigateHomeIntent",
            IntentName::Fallback => "AMAZON.FallbackIntent",
        }
    }
}

#[derive(Error, Debug)]
pub enum SkillError {
    #[error("Unsupported intent: {0}")]
    UnsupportedIntent(String),

    #[error("Unsupported request type")]
    UnsupportedRequest,
}

/// Callbacks invoked for each kind of Alexa request.
#[async_trait]
pub trait SkillHandler: Send + Sync {
    async fn on_session_started(&self, request_id: &str, session: &Session) {
        info!(
            request_id,
            session_id = %session.session_id,
            application_id = ?session.application.as_ref().map(|app| app.application_id.as_str()),
            "Session started"
        );
    }

    async fn on_launch(
        &self,
        request_id: &str,
        session: &Session,
        attributes: &mut SessionAttributes,
    ) -> SkillResponse;

    async fn on_intent(
        &self,
        name: IntentName,
        intent: &Intent,
        session: &Session,
        attributes: &mut SessionAttributes,
    ) -> SkillResponse;

    async fn on_session_ended(&self, request_id: &str, reason: Option<&str>, session: &Session) {
        info!(
            request_id,
            session_id = %session.session_id,
            reason = ?reason,
            "Session ended"
        );
    }
}

impl SkillRequest {
    pub fn request_id(&self) -> &str {
        match self {
            SkillRequest::LaunchRequest { request_id }
            | SkillRequest::IntentRequest { request_id, .. }
            | SkillRequest::SessionEndedRequest { request_id, .. } => request_id,
            SkillRequest::Unsupported => "",
        }
    }
}

/// Route one Alexa event to the handler and wrap its answer with the updated session.
pub async fn dispatch<H>(
    handler: &H,
    envelope: RequestEnvelope,
) -> Result<ResponseEnvelope, SkillError>
where
    H: SkillHandler + ?Sized,
{
    let session = envelope.session.unwrap_or_default();
    let mut attributes = session.attributes.clone().unwrap_or_default();
    let request = envelope.request;
    let request_id = request.request_id();

    if session.new {
        handler.on_session_started(request_id, &session).await;
    }

    let response = match &request {
        SkillRequest::LaunchRequest { .. } => {
            handler.on_launch(request_id, &session, &mut attributes).await
        }
        SkillRequest::IntentRequest { intent, .. } => {
            let Some(name) = IntentName::from_name(&intent.name) else {
                warn!("Unsupported intent: {}", intent.name);
                return Err(SkillError::UnsupportedIntent(intent.name.clone()));
            };
            handler.on_intent(name, intent, &session, &mut attributes).await
        }
        SkillRequest::SessionEndedRequest { reason, .. } => {
            handler
                .on_session_ended(request_id, reason.as_deref(), &session)
                .await;
            SkillResponse::session_ended()
        }
        SkillRequest::Unsupported => {
            warn!("Unsupported request type");
            return Err(SkillError::UnsupportedRequest);
        }
    };

    Ok(ResponseEnvelope::new(attributes, response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingHandler {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingHandler {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SkillHandler for RecordingHandler {
        async fn on_session_started(&self, request_id: &str, _session: &Session) {
            self.calls.lock().unwrap().push(format!("started:{}", request_id));
        }

        async fn on_launch(
            &self,
            _request_id: &str,
            _session: &Session,
            attributes: &mut SessionAttributes,
        ) -> SkillResponse {
            self.calls.lock().unwrap().push("launch".to_string());
            attributes.first_name = Some("Launch".to_string());
            SkillResponse::ask("Welcome", "Hello?")
        }

        async fn on_intent(
            &self,
            name: IntentName,
            _intent: &Intent,
            _session: &Session,
            attributes: &mut SessionAttributes,
        ) -> SkillResponse {
            self.calls.lock().unwrap().push(name.as_str().to_string());
            attributes.step(1);
            SkillResponse::tell("done")
        }

        async fn on_session_ended(
            &self,
            _request_id: &str,
            reason: Option<&str>,
            _session: &Session,
        ) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("ended:{}", reason.unwrap_or("-")));
        }
    }

    fn envelope(value: serde_json::Value) -> RequestEnvelope {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_intent_names_round_trip() {
        for name in [
            "OneshotReminderIntent",
            "DialogReminderIntent",
            "AMAZON.HelpIntent",
            "AMAZON.StartOverIntent",
            "AMAZON.StopIntent",
            "AMAZON.CancelIntent",
            "AMAZON.NextIntent",
            "AMAZON.PreviousIntent",
            "AMAZON.NavigateHomeIntent",
            "AMAZON.FallbackIntent",
        ] {
            assert_eq!(IntentName::from_name(name).map(|i| i.as_str()), Some(name));
        }
        assert_eq!(IntentName::from_name("AMAZON.PauseIntent"), None);
    }

    #[tokio::test]
    async fn test_new_session_launch() {
        let handler = RecordingHandler::default();
        let response = dispatch(
            &handler,
            envelope(json!({
                "session": {"new": true, "sessionId": "s1"},
                "request": {"type": "LaunchRequest", "requestId": "r1"}
            })),
        )
        .await
        .unwrap();

        assert_eq!(handler.calls(), vec!["started:r1", "launch"]);
        assert_eq!(response.session_attributes.first_name.as_deref(), Some("Launch"));
        assert_eq!(response.response.speech_text(), Some("Welcome"));
    }

    #[tokio::test]
    async fn test_intent_carries_session_attributes() {
        let handler = RecordingHandler::default();
        let response = dispatch(
            &handler,
            envelope(json!({
                "session": {"new": false, "sessionId": "s1", "attributes": {"currentReminder": 1}},
                "request": {
                    "type": "IntentRequest",
                    "requestId": "r2",
                    "intent": {"name": "AMAZON.NextIntent"}
                }
            })),
        )
        .await
        .unwrap();

        assert_eq!(handler.calls(), vec!["AMAZON.NextIntent"]);
        assert_eq!(response.session_attributes.current_reminder, Some(2));
    }

    #[tokio::test]
    async fn test_session_ended() {
        let handler = RecordingHandler::default();
        let response = dispatch(
            &handler,
            envelope(json!({
                "session": {"new": false, "sessionId": "s1"},
                "request": {
                    "type": "SessionEndedRequest",
                    "requestId": "r3",
                    "reason": "USER_INITIATED"
                }
            })),
        )
        .await
        .unwrap();

        assert_eq!(handler.calls(), vec!["ended:USER_INITIATED"]);
        assert!(response.response.should_end_session);
        assert!(response.response.output_speech.is_none());
    }

    #[tokio::test]
    async fn test_unknown_intent_is_an_error() {
        let handler = RecordingHandler::default();
        let result = dispatch(
            &handler,
            envelope(json!({
                "request": {
                    "type": "IntentRequest",
                    "requestId": "r4",
                    "intent": {"name": "WeatherIntent"}
                }
            })),
        )
        .await;

        assert!(matches!(
            result,
            Err(SkillError::UnsupportedIntent(ref name)) if name == "WeatherIntent"
        ));
        assert!(handler.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_request_type_is_an_error() {
        let handler = RecordingHandler::default();
        let result = dispatch(
            &handler,
            envelope(json!({"request": {"type": "Display.ElementSelected", "requestId": "r5"}})),
        )
        .await;
        assert!(matches!(result, Err(SkillError::UnsupportedRequest)));
    }
}
