//! MyFatoorah HTTP client.
//!
//! One POST helper drives both API operations and normalizes every failure
//! mode into [`GatewayError`]: connection problems, timeouts, non-JSON
//! bodies, and envelopes reporting a business failure. Every request payload
//! and response body is logged for the payment audit trail; API keys never
//! are.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::domain::errors::GatewayError;
use crate::ports::{CreatedInvoice, GatewayApi, InvoiceRequest, PaymentStatus, StatusKeyType};

use super::types::{ApiEnvelope, GetPaymentStatusRequest, PaymentStatusData, SendPaymentData, SendPaymentRequest};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Cap on response text quoted in errors and logs.
fn snippet(text: &str) -> String {
    const MAX: usize = 200;
    if text.len() <= MAX {
        text.to_string()
    } else {
        let mut end = MAX;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}

/// Every call is logged as a request/response pair for the payment audit
/// trail. The payload carries no secrets; the bearer token lives in the
/// Authorization header and is never logged.
fn audit_request(url: &str, provider: &str, payload: &Value) {
    tracing::info!(%url, %provider, payload = %payload, "gateway request");
}

fn audit_response(url: &str, status: reqwest::StatusCode, body: &str) {
    tracing::info!(%url, %status, body = %snippet(body), "gateway response");
}

pub struct MyFatoorahClient {
    http: reqwest::Client,
}

impl MyFatoorahClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// POST `body` to `path` and unwrap the response envelope's `Data`.
    async fn post_envelope<B: Serialize>(
        &self,
        provider: &ProviderConfig,
        path: &str,
        body: &B,
    ) -> Result<Value, GatewayError> {
        let api_key = provider.api_key()?;
        let url = format!("{}{}", provider.api_base_url(), path);

        let payload = serde_json::to_value(body).unwrap_or(Value::Null);
        audit_request(&url, &provider.name, &payload);

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    tracing::error!(%url, "gateway request timed out");
                    GatewayError::Timeout
                } else {
                    tracing::error!(%url, error = %e, "gateway unreachable");
                    GatewayError::Unreachable
                }
            })?;

        let http_status = response.status();
        let text = response.text().await.map_err(|e| {
            tracing::error!(%url, error = %e, "failed to read gateway response");
            GatewayError::Unreachable
        })?;
        audit_response(&url, http_status, &text);

        let envelope: ApiEnvelope = serde_json::from_str(&text).map_err(|_| {
            tracing::error!(%url, %http_status, "non-JSON gateway response");
            GatewayError::BadResponse(snippet(&text))
        })?;

        if !http_status.is_success() || !envelope.is_success {
            let summary = envelope.error_summary();
            tracing::error!(%url, %http_status, %summary, "gateway rejected request");
            return Err(GatewayError::Rejected(summary));
        }

        Ok(envelope.data.unwrap_or(Value::Null))
    }
}

impl Default for MyFatoorahClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GatewayApi for MyFatoorahClient {
    async fn create_invoice(
        &self,
        provider: &ProviderConfig,
        request: &InvoiceRequest,
    ) -> Result<CreatedInvoice, GatewayError> {
        let body = SendPaymentRequest::from(request);
        let data = self.post_envelope(provider, "/v2/SendPayment", &body).await?;
        let data: SendPaymentData = serde_json::from_value(data)
            .map_err(|e| GatewayError::BadResponse(e.to_string()))?;
        Ok(data.into())
    }

    async fn get_payment_status(
        &self,
        provider: &ProviderConfig,
        key: &str,
        key_type: StatusKeyType,
    ) -> Result<PaymentStatus, GatewayError> {
        let body = GetPaymentStatusRequest {
            key: key.to_string(),
            key_type: key_type.as_str(),
        };
        let data = self
            .post_envelope(provider, "/v2/GetPaymentStatus", &body)
            .await?;
        let data: PaymentStatusData = serde_json::from_value(data)
            .map_err(|e| GatewayError::BadResponse(e.to_string()))?;
        Ok(data.into())
    }
}
