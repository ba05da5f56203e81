//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid public base URL format")]
    InvalidBaseUrl,

    #[error("No API key configured for the active gateway environment")]
    MissingGatewayApiKey,

    #[error("Webhooks enabled but no webhook secret configured")]
    MissingWebhookSecret,

    #[error("Unsupported gateway country code: {0}")]
    UnsupportedCountry(String),
}
