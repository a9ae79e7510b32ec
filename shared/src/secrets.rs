//! AWS Secrets Manager integration for the reminder API key.

use aws_sdk_secretsmanager::Client as SecretsClient;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;
use tracing::info;

use crate::{Config, Error, Result};

/// Cached secrets with lazy initialization.
static SECRETS_CACHE: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn get_cache() -> &'static RwLock<HashMap<String, String>> {
    SECRETS_CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// JSON shape accepted for the API key secret.
#[derive(Debug, Deserialize)]
struct ApiKeySecret {
    api_key: String,
}

/// Get a secret value from Secrets Manager with caching.
pub async fn get_secret(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    {
        let cache = get_cache().read().await;
        if let Some(value) = cache.get(secret_arn) {
            return Ok(value.clone());
        }
    }

    let response = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get secret: {}", e)))?;

    let secret_string = response
        .secret_string()
        .ok_or_else(|| Error::Aws("Secret has no string value".to_string()))?
        .to_string();

    {
        let mut cache = get_cache().write().await;
        cache.insert(secret_arn.to_string(), secret_string.clone());
    }

    Ok(secret_string)
}

/// Extract the API key from a secret string.
///
/// Accepts either a bare key or a JSON object with an `api_key` field.
pub fn parse_api_key(secret_string: &str) -> Result<String> {
    let trimmed = secret_string.trim();
    if trimmed.starts_with('{') {
        let secret: ApiKeySecret = serde_json::from_str(trimmed)
            .map_err(|e| Error::Aws(format!("Failed to parse API key secret: {}", e)))?;
        return Ok(secret.api_key);
    }
    if trimmed.is_empty() {
        return Err(Error::Config("API key secret is empty".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Resolve the reminder API key: the configured value first, then Secrets Manager.
pub async fn resolve_api_key(config: &Config) -> Result<Option<String>> {
    if let Some(key) = &config.api_key {
        return Ok(Some(key.clone()));
    }

    let Some(secret_arn) = &config.api_key_secret_arn else {
        return Ok(None);
    };

    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.aws_region.clone()))
        .load()
        .await;
    let client = SecretsClient::new(&aws_config);

    info!("Loading reminder API key from Secrets Manager");
    let secret_string = get_secret(&client, secret_arn).await?;
    parse_api_key(&secret_string).map(Some)
}
