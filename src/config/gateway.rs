//! MyFatoorah provider configuration.
//!
//! A provider record holds everything one gateway account needs: the
//! environment selector, per-environment API keys, the country that picks
//! the live regional base URL, and the webhook secret. Deployments that
//! accept payments in several countries run one provider record per country,
//! all sharing the single webhook URL.

use once_cell::sync::Lazy;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::HashMap;

use crate::domain::errors::GatewayError;
use crate::domain::signature;

use super::error::ValidationError;

/// Test environment base URL.
pub const MYFATOORAH_TEST_URL: &str = "https://apitest.myfatoorah.com";

/// Country-specific live API base URLs. Countries without a regional
/// deployment share the default (Kuwait) endpoint.
static MYFATOORAH_LIVE_URLS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("SA", "https://api-sa.myfatoorah.com"),
        ("AE", "https://api-ae.myfatoorah.com"),
        ("QA", "https://api-qa.myfatoorah.com"),
        ("EG", "https://api-eg.myfatoorah.com"),
        ("KW", "https://api.myfatoorah.com"),
        ("BH", "https://api.myfatoorah.com"),
        ("JO", "https://api.myfatoorah.com"),
        ("OM", "https://api.myfatoorah.com"),
    ])
});

const SUPPORTED_COUNTRIES: [&str; 8] = ["SA", "KW", "BH", "AE", "QA", "EG", "OM", "JO"];

/// Gateway environment selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayEnvironment {
    Test,
    Live,
}

impl Default for GatewayEnvironment {
    fn default() -> Self {
        GatewayEnvironment::Test
    }
}

/// One MyFatoorah provider account.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Identifier for this provider record, e.g. `myfatoorah-sa`.
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub environment: GatewayEnvironment,

    /// ISO country code selecting the live regional endpoint.
    #[serde(default = "default_country")]
    pub country: String,

    /// Live API key (bearer token).
    pub live_api_key: Option<SecretString>,

    /// Test API key (bearer token).
    pub test_api_key: Option<SecretString>,

    /// Shared secret for webhook signature verification.
    pub webhook_secret: Option<SecretString>,

    /// Whether webhook delivery is enabled for this provider.
    #[serde(default)]
    pub webhook_enabled: bool,
}

fn default_name() -> String {
    "myfatoorah".to_string()
}

fn default_country() -> String {
    "SA".to_string()
}

impl ProviderConfig {
    /// The API base URL for this provider's environment and country.
    ///
    /// Unmapped countries fall back to the default region rather than
    /// failing: a payment must not be blocked by an unexpected country code.
    pub fn api_base_url(&self) -> &'static str {
        match self.environment {
            GatewayEnvironment::Test => MYFATOORAH_TEST_URL,
            GatewayEnvironment::Live => MYFATOORAH_LIVE_URLS
                .get(self.country.as_str())
                .copied()
                .unwrap_or(MYFATOORAH_LIVE_URLS["SA"]),
        }
    }

    /// The API key matching the active environment.
    ///
    /// A configured-but-missing key is a precondition failure raised before
    /// any network call is attempted.
    pub fn api_key(&self) -> Result<String, GatewayError> {
        let (key, mode) = match self.environment {
            GatewayEnvironment::Test => (&self.test_api_key, "test"),
            GatewayEnvironment::Live => (&self.live_api_key, "live"),
        };
        key.as_ref()
            .map(|k| k.expose_secret().clone())
            .ok_or_else(|| GatewayError::MissingApiKey {
                provider: self.name.clone(),
                mode,
            })
    }

    /// Verify a webhook body against this provider's secret.
    ///
    /// No secret configured means verification fails, never that it is
    /// skipped.
    pub fn verify_webhook(&self, raw_body: &[u8], supplied_signature: &str) -> bool {
        let secret = self
            .webhook_secret
            .as_ref()
            .map(|s| s.expose_secret().as_str())
            .unwrap_or("");
        signature::verify_webhook_signature(secret, raw_body, supplied_signature)
    }

    /// Validate this provider record.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !SUPPORTED_COUNTRIES.contains(&self.country.as_str()) {
            return Err(ValidationError::UnsupportedCountry(self.country.clone()));
        }
        let has_active_key = match self.environment {
            GatewayEnvironment::Test => self.test_api_key.is_some(),
            GatewayEnvironment::Live => self.live_api_key.is_some(),
        };
        if !has_active_key {
            return Err(ValidationError::MissingGatewayApiKey);
        }
        if self.webhook_enabled && self.webhook_secret.is_none() {
            return Err(ValidationError::MissingWebhookSecret);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_provider() -> ProviderConfig {
        ProviderConfig {
            name: "myfatoorah".to_string(),
            environment: GatewayEnvironment::Test,
            country: "SA".to_string(),
            live_api_key: None,
            test_api_key: Some(SecretString::new("test_token".to_string())),
            webhook_secret: Some(SecretString::new("whsec".to_string())),
            webhook_enabled: true,
        }
    }

    #[test]
    fn test_environment_uses_test_url() {
        assert_eq!(test_provider().api_base_url(), MYFATOORAH_TEST_URL);
    }

    #[test]
    fn live_environment_uses_country_url() {
        let provider = ProviderConfig {
            environment: GatewayEnvironment::Live,
            country: "EG".to_string(),
            ..test_provider()
        };
        assert_eq!(provider.api_base_url(), "https://api-eg.myfatoorah.com");
    }

    #[test]
    fn unmapped_country_falls_back_to_default_region() {
        let provider = ProviderConfig {
            environment: GatewayEnvironment::Live,
            country: "ZZ".to_string(),
            ..test_provider()
        };
        assert_eq!(provider.api_base_url(), "https://api-sa.myfatoorah.com");
    }

    #[test]
    fn api_key_matches_environment() {
        let provider = test_provider();
        assert_eq!(provider.api_key().unwrap(), "test_token");

        let live = ProviderConfig {
            environment: GatewayEnvironment::Live,
            ..test_provider()
        };
        assert_eq!(
            live.api_key(),
            Err(GatewayError::MissingApiKey {
                provider: "myfatoorah".to_string(),
                mode: "live",
            })
        );
    }

    #[test]
    fn validate_requires_active_key() {
        let provider = ProviderConfig {
            test_api_key: None,
            ..test_provider()
        };
        assert!(matches!(
            provider.validate(),
            Err(ValidationError::MissingGatewayApiKey)
        ));
    }

    #[test]
    fn validate_requires_webhook_secret_when_enabled() {
        let provider = ProviderConfig {
            webhook_secret: None,
            ..test_provider()
        };
        assert!(matches!(
            provider.validate(),
            Err(ValidationError::MissingWebhookSecret)
        ));
    }

    #[test]
    fn validate_rejects_unsupported_country() {
        let provider = ProviderConfig {
            country: "US".to_string(),
            ..test_provider()
        };
        assert!(matches!(
            provider.validate(),
            Err(ValidationError::UnsupportedCountry(_))
        ));
    }

    #[test]
    fn webhook_verification_without_secret_fails() {
        let provider = ProviderConfig {
            webhook_secret: None,
            ..test_provider()
        };
        assert!(!provider.verify_webhook(b"body", "deadbeef"));
    }
}
