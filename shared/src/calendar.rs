//! Reminder API client.
//!
//! Two API flavours are supported and chosen by configuration:
//!
//! * [`ApiProfile::GoogleCalendar`] issues a `GET` against the Google Calendar
//!   contacts calendar with a bearer token and API key, and reads events from
//!   the `items` field.
//! * [`ApiProfile::FormPost`] issues a form `POST` with the date window in the
//!   query string and reads results from the `reminders` field.
//!
//! Exactly one request is made per lookup. There is no retry.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::{Config, Error, Result};

const GOOGLE_API_BASE_URL: &str = "https://www.googleapis.com";
const GOOGLE_CONTACTS_EVENTS_PATH: &str =
    "/calendar/v3/calendars/%23contacts%40group.v.calendar.google.com/events";
const FORM_POST_PATH: &str = "/reminders";

/// Length of the query window starting at the requested date, in hours.
pub const QUERY_WINDOW_HOURS: i64 = 24;

/// Which reminder API flavour to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiProfile {
    #[default]
    GoogleCalendar,
    FormPost,
}

impl ApiProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiProfile::GoogleCalendar => "google-calendar",
            ApiProfile::FormPost => "form-post",
        }
    }

    /// Base URL used when none is configured. The form-post API has no public default.
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            ApiProfile::GoogleCalendar => Some(GOOGLE_API_BASE_URL),
            ApiProfile::FormPost => None,
        }
    }

    pub fn default_path(&self) -> &'static str {
        match self {
            ApiProfile::GoogleCalendar => GOOGLE_CONTACTS_EVENTS_PATH,
            ApiProfile::FormPost => FORM_POST_PATH,
        }
    }

    /// Response field holding the result list.
    pub fn list_field(&self) -> &'static str {
        match self {
            ApiProfile::GoogleCalendar => "items",
            ApiProfile::FormPost => "reminders",
        }
    }
}

impl fmt::Display for ApiProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google-calendar" | "google" => Ok(ApiProfile::GoogleCalendar),
            "form-post" | "form" => Ok(ApiProfile::FormPost),
            other => Err(Error::Config(format!("Unknown reminder API profile: {}", other))),
        }
    }
}

/// Parameters for one reminder lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderQuery {
    /// Linked-account token supplied by the voice host
    pub access_token: Option<String>,
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub reminder_type: String,
}

/// One reminder as returned by the API.
///
/// The shape differs between API versions, so the raw JSON is kept and read
/// defensively through the accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reminder(Value);

impl Reminder {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Spoken headline: `summary` for calendar events, `name` otherwise.
    pub fn title(&self) -> Option<&str> {
        ["summary", "name"]
            .iter()
            .filter_map(|field| self.0.get(*field).and_then(Value::as_str))
            .map(str::trim)
            .find(|title| !title.is_empty())
    }

    /// Extra spoken detail from `calculatedRates`, when present.
    pub fn details(&self) -> Option<String> {
        let rates = self.0.get("calculatedRates")?;
        let text = match rates {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Array(values) => values
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            _ => String::new(),
        };
        (!text.is_empty()).then_some(text)
    }

    pub fn small_image_url(&self) -> Option<&str> {
        self.contacts_photo()
            .or_else(|| self.photo_field("mediumUrl"))
            .or_else(|| self.photo_field("largeUrl"))
    }

    pub fn large_image_url(&self) -> Option<&str> {
        self.contacts_photo()
            .or_else(|| self.photo_field("largeUrl"))
            .or_else(|| self.photo_field("mediumUrl"))
    }

    fn contacts_photo(&self) -> Option<&str> {
        self.0
            .get("gadget")?
            .get("preferences")?
            .get("goo.contactsPhotoUrl")?
            .as_str()
            .filter(|url| !url.is_empty())
    }

    fn photo_field(&self, field: &str) -> Option<&str> {
        self.0
            .get("photo")?
            .get(field)?
            .as_str()
            .filter(|url| !url.is_empty())
    }
}

/// Start and end of the query window for a calendar date, in UTC.
///
/// `None` when the window would run past the last representable instant.
pub fn day_window(date: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
    let end = start.checked_add_signed(Duration::hours(QUERY_WINDOW_HOURS))?;
    Some((start, end))
}

/// Query-string fragment describing the date window, e.g. `begin_date=20160620&range=24`.
pub fn request_date_param(date: NaiveDate) -> String {
    format!(
        "begin_date={}&range={}",
        date.format("%Y%m%d"),
        QUERY_WINDOW_HOURS
    )
}

/// A fully built outbound request, independent of the HTTP transport.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub bearer_token: Option<String>,
    pub form: Vec<(&'static str, String)>,
}

/// Build the outbound request for a lookup.
pub fn build_request(
    profile: ApiProfile,
    endpoint: &str,
    api_key: Option<&str>,
    query: &ReminderQuery,
) -> PreparedRequest {
    let mut params: Vec<String> = Vec::new();
    let mut form = Vec::new();

    let method = match profile {
        ApiProfile::GoogleCalendar => {
            if let Some((time_min, time_max)) = query.date.and_then(day_window) {
                params.push(format!("timeMax={}", iso_timestamp(time_max)));
                params.push(format!("timeMin={}", iso_timestamp(time_min)));
            }
            if let Some(name) = &query.name {
                params.push(format!("q={}", urlencoding::encode(name)));
            }
            if let Some(key) = api_key {
                params.push(format!("key={}", urlencoding::encode(key)));
            }
            Method::GET
        }
        ApiProfile::FormPost => {
            if let Some(key) = api_key {
                params.push(format!("api_key={}", urlencoding::encode(key)));
            }
            if let Some(date) = query.date {
                params.push(request_date_param(date));
            }
            if let Some(name) = &query.name {
                form.push(("name", name.clone()));
            }
            form.push(("type", query.reminder_type.clone()));
            Method::POST
        }
    };

    let url = if params.is_empty() {
        endpoint.to_string()
    } else {
        format!("{}?{}", endpoint, params.join("&"))
    };

    PreparedRequest {
        method,
        url,
        bearer_token: query.access_token.clone(),
        form,
    }
}

fn iso_timestamp(time: DateTime<Utc>) -> String {
    urlencoding::encode(&time.to_rfc3339_opts(SecondsFormat::Millis, true)).into_owned()
}

/// Interpret a response from the reminder API.
///
/// A non-2xx status is an error regardless of the body. A body carrying an
/// `error` object is an error with its `message`. A missing list field means
/// no reminders.
pub fn parse_response(profile: ApiProfile, status: u16, body: &str) -> Result<Vec<Reminder>> {
    if !(200..300).contains(&status) {
        return Err(Error::Status(status));
    }

    let value: Value = serde_json::from_str(body)?;

    if let Some(api_error) = value.get("error").filter(|e| !e.is_null()) {
        let message = api_error
            .get("message")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| api_error.to_string());
        return Err(Error::Api(message));
    }

    let reminders = match value.get(profile.list_field()) {
        Some(Value::Array(items)) => items.iter().cloned().map(Reminder::new).collect(),
        _ => Vec::new(),
    };

    Ok(reminders)
}

/// Source of reminders for the dialog.
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// Perform one lookup.
    async fn fetch_reminders(&self, query: &ReminderQuery) -> Result<Vec<Reminder>>;
}

/// HTTP client for the configured reminder API.
pub struct CalendarClient {
    http_client: reqwest::Client,
    profile: ApiProfile,
    endpoint: String,
    api_key: Option<String>,
}

impl CalendarClient {
    pub fn new(config: &Config, api_key: Option<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            profile: config.api_profile,
            endpoint: config.endpoint(),
            api_key,
        }
    }

    pub fn profile(&self) -> ApiProfile {
        self.profile
    }
}

#[async_trait]
impl CalendarApi for CalendarClient {
    async fn fetch_reminders(&self, query: &ReminderQuery) -> Result<Vec<Reminder>> {
        let prepared = build_request(self.profile, &self.endpoint, self.api_key.as_deref(), query);

        info!(
            profile = %self.profile,
            method = %prepared.method,
            endpoint = %self.endpoint,
            has_token = prepared.bearer_token.is_some(),
            "Requesting reminders"
        );

        let mut request = self.http_client.request(prepared.method.clone(), &prepared.url);
        if let Some(token) = &prepared.bearer_token {
            request = request.bearer_auth(token);
        }
        if prepared.method == Method::POST {
            request = request.form(&prepared.form);
        }

        let response = request.send().await.map_err(|e| {
            error!("Communications error: {}", e);
            Error::Http(e)
        })?;

        let status = response.status().as_u16();
        info!("Status Code: {}", status);

        let body = response.text().await?;
        parse_response(self.profile, status, &body).inspect_err(|e| {
            error!("Reminder API error: {}", e);
        })
    }
}
