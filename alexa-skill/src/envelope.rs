//! Alexa request and response envelopes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::session::SessionAttributes;

pub const RESPONSE_VERSION: &str = "1.0";

/// Incoming Alexa event.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestEnvelope {
    pub session: Option<Session>,
    pub request: SkillRequest,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub session_id: String,
    pub application: Option<Application>,
    pub attributes: Option<SessionAttributes>,
    pub user: Option<User>,
}

impl Session {
    /// Linked-account token, if the user has linked one.
    pub fn access_token(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(|u| u.access_token.as_deref())
            .filter(|token| !token.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub application_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub access_token: Option<String>,
}

/// The request body, tagged by its `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum SkillRequest {
    #[serde(rename_all = "camelCase")]
    LaunchRequest {
        #[serde(default)]
        request_id: String,
    },
    #[serde(rename_all = "camelCase")]
    IntentRequest {
        #[serde(default)]
        request_id: String,
        intent: Intent,
    },
    #[serde(rename_all = "camelCase")]
    SessionEndedRequest {
        #[serde(default)]
        request_id: String,
        reason: Option<String>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Intent {
    pub name: String,
    #[serde(default)]
    pub slots: HashMap<String, Slot>,
}

impl Intent {
    /// Value of a slot, treating a missing slot and an empty value alike.
    pub fn slot_value(&self, slot: &str) -> Option<&str> {
        self.slots
            .get(slot)
            .and_then(|s| s.value.as_deref())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Slot {
    pub value: Option<String>,
}

/// Outgoing Alexa response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub version: String,
    pub session_attributes: SessionAttributes,
    pub response: SkillResponse,
}

impl ResponseEnvelope {
    pub fn new(session_attributes: SessionAttributes, response: SkillResponse) -> Self {
        Self {
            version: RESPONSE_VERSION.to_string(),
            session_attributes,
            response,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    pub should_end_session: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputSpeech {
    #[serde(rename = "type")]
    pub speech_type: String,
    pub text: String,
}

impl OutputSpeech {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            speech_type: "PlainText".to_string(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

/// Visual card shown in the companion app.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Card {
    Simple {
        title: String,
        content: String,
    },
    Standard {
        title: String,
        text: String,
        image: CardImage,
    },
    LinkAccount,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardImage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_image_url: Option<String>,
}

impl Card {
    /// Card with optional images. Without any image it degrades to a simple card.
    pub fn with_images(
        title: impl Into<String>,
        content: impl Into<String>,
        small_image_url: Option<&str>,
        large_image_url: Option<&str>,
    ) -> Self {
        let title = title.into();
        let content = content.into();
        if small_image_url.is_none() && large_image_url.is_none() {
            return Card::Simple { title, content };
        }
        Card::Standard {
            title,
            text: content,
            image: CardImage {
                small_image_url: small_image_url.map(secure_url),
                large_image_url: large_image_url.map(secure_url),
            },
        }
    }
}

/// Card images must be served over https.
pub fn secure_url(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}

impl SkillResponse {
    /// Speak and keep the session open for an answer.
    pub fn ask(speech: impl Into<String>, reprompt: impl Into<String>) -> Self {
        Self {
            output_speech: Some(OutputSpeech::plain(speech)),
            card: None,
            reprompt: Some(Reprompt {
                output_speech: OutputSpeech::plain(reprompt),
            }),
            should_end_session: false,
        }
    }

    pub fn ask_with_card(
        speech: impl Into<String>,
        reprompt: impl Into<String>,
        card: Card,
    ) -> Self {
        Self {
            card: Some(card),
            ..Self::ask(speech, reprompt)
        }
    }

    /// Speak and end the session.
    pub fn tell(speech: impl Into<String>) -> Self {
        Self {
            output_speech: Some(OutputSpeech::plain(speech)),
            card: None,
            reprompt: None,
            should_end_session: true,
        }
    }

    /// Acknowledge a session end. Alexa ignores any speech here.
    pub fn session_ended() -> Self {
        Self {
            output_speech: None,
            card: None,
            reprompt: None,
            should_end_session: true,
        }
    }

    pub fn speech_text(&self) -> Option<&str> {
        self.output_speech.as_ref().map(|s| s.text.as_str())
    }

    pub fn reprompt_text(&self) -> Option<&str> {
        self.reprompt.as_ref().map(|r| r.output_speech.text.as_str())
    }
}
