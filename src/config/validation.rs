use crate::config::types::{Config, PollingConfig, ServerConfig, TableConfig};
use crate::ConfigError;
use url::Url;

/// Smallest accepted polling interval, to keep a typo from hammering the server
const MIN_POLL_INTERVAL_MS: u64 = 500;

/// Largest page the server is asked for
pub const MAX_PAGE_SIZE: usize = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_table_config(&config.table)?;
    validate_polling_config(&config.polling)?;
    Ok(())
}

/// Validates server connection settings
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    validate_token(&config.token)?;

    if config.timeout_secs < 1 || config.timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be between 1 and 300, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates table defaults
fn validate_table_config(config: &TableConfig) -> Result<(), ConfigError> {
    if config.page_size < 1 || config.page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::Validation(format!(
            "page-size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, config.page_size
        )));
    }

    Ok(())
}

/// Validates polling intervals
fn validate_polling_config(config: &PollingConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("list-interval-ms", config.list_interval_ms),
        ("detail-interval-ms", config.detail_interval_ms),
    ] {
        if value < MIN_POLL_INTERVAL_MS {
            return Err(ConfigError::Validation(format!(
                "{} must be >= {}ms, got {}ms",
                name, MIN_POLL_INTERVAL_MS, value
            )));
        }
    }

    Ok(())
}

/// Bearer tokens go verbatim into a header value
fn validate_token(token: &str) -> Result<(), ConfigError> {
    if token.is_empty() {
        return Err(ConfigError::Validation("token cannot be empty".to_string()));
    }

    if token.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ConfigError::Validation(
            "token must not contain whitespace or control characters".to_string(),
        ));
    }

    Ok(())
}
