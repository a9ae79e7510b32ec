//! Configuration management for the skill Lambda.

use std::env;

use crate::calendar::ApiProfile;
use crate::{Error, Result};

/// Skill name spoken in the welcome prompt when none is configured.
pub const DEFAULT_SKILL_NAME: &str = "Google Birthday Reminder";

/// Reminder type used when neither the request nor the session names one.
pub const DEFAULT_REMINDER_TYPE: &str = "reminders";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Which reminder API flavour to talk to
    pub api_profile: ApiProfile,
    /// Scheme and host of the reminder API
    pub api_base_url: String,
    /// Resource path appended to the base URL
    pub api_path: String,
    /// API key, if provided directly
    pub api_key: Option<String>,
    /// ARN of the secret holding the API key
    pub api_key_secret_arn: Option<String>,
    /// Name spoken in welcome prompts
    pub skill_name: String,
    /// Fallback reminder type
    pub default_reminder_type: String,
    /// AWS region
    pub aws_region: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_profile = match get("REMINDER_API_PROFILE") {
            Some(name) => name.parse::<ApiProfile>()?,
            None => ApiProfile::default(),
        };

        let api_base_url = get("REMINDER_API_BASE_URL")
            .or_else(|| api_profile.default_base_url().map(String::from))
            .ok_or_else(|| {
                Error::Config(format!(
                    "REMINDER_API_BASE_URL is required for the {} profile",
                    api_profile
                ))
            })?;

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            api_path: get("REMINDER_API_PATH")
                .unwrap_or_else(|| api_profile.default_path().to_string()),
            api_profile,
            api_key: get("REMINDER_API_KEY"),
            api_key_secret_arn: get("REMINDER_API_KEY_SECRET_ARN"),
            skill_name: get("SKILL_NAME").unwrap_or_else(|| DEFAULT_SKILL_NAME.to_string()),
            default_reminder_type: get("DEFAULT_REMINDER_TYPE")
                .unwrap_or_else(|| DEFAULT_REMINDER_TYPE.to_string()),
            aws_region: get("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
        })
    }

    /// Full endpoint URL without query string.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.api_base_url, self.api_path)
    }
}
