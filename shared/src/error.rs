//! Error types for the birthday reminder Lambda.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring the skill or calling the reminder API.
#[derive(Error, Debug)]
pub enum Error {
    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport error talking to the reminder API
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Reminder API answered with a non-2xx status
    #[error("Non 200 Response: {0}")]
    Status(u16),

    /// Reminder API reported an error in the response body
    #[error("API error: {0}")]
    Api(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
