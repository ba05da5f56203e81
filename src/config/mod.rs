//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `PAYFLOW` prefix with
//! `__` separating nested values.
//!
//! # Example
//!
//! ```no_run
//! use payflow::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! ```

mod error;
mod gateway;
mod server;

pub use error::{ConfigError, ValidationError};
pub use gateway::{GatewayEnvironment, ProviderConfig, MYFATOORAH_TEST_URL};
pub use server::ServerConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (bind address, public base URL)
    #[serde(default)]
    pub server: ServerConfig,

    /// Primary gateway provider configuration. Additional provider records
    /// (e.g. per-country accounts) are supplied through the
    /// `ProviderRegistry` port at wiring time.
    pub gateway: ProviderConfig,
}

impl AppConfig {
    /// Load and validate configuration from environment variables
    ///
    /// Loads a `.env` file if present, then reads variables such as
    /// `PAYFLOW__SERVER__PORT=8080` and
    /// `PAYFLOW__GATEWAY__TEST_API_KEY=...`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, values
    /// cannot be parsed, or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config: AppConfig = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PAYFLOW")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.gateway.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn validation_failure_converts_to_config_error() {
        let config = AppConfig {
            server: ServerConfig::default(),
            gateway: ProviderConfig {
                name: "myfatoorah".to_string(),
                environment: GatewayEnvironment::Test,
                country: "SA".to_string(),
                live_api_key: None,
                test_api_key: None,
                webhook_secret: Some(SecretString::new("whsec".to_string())),
                webhook_enabled: false,
            },
        };

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ValidationError::MissingGatewayApiKey));
        assert!(matches!(
            ConfigError::from(err),
            ConfigError::ValidationFailed(_)
        ));
    }
}
