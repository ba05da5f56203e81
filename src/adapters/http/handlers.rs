//! Handlers for the payment callback endpoints.
//!
//! Redirect handlers never fail outward: whatever happens during
//! reconciliation, the customer's browser always lands on the local status
//! page, which renders from the transaction state. The webhook handler
//! implements the acknowledgement contract the gateway's redelivery logic
//! depends on: 400 for requests it should never retry as-is, 401 for failed
//! authentication, 200 once the event is authenticated even when processing
//! fails afterwards.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::{
    StatusReconciler, TransactionLocator, WebhookEvent, WebhookProcessor,
};
use crate::config::ProviderConfig;
use crate::domain::notification::NotificationPayload;
use crate::ports::{GatewayApi, ProviderRegistry, TransactionStore};

/// Where the browser lands after any redirect callback.
const STATUS_PAGE: &str = "/payment/status";

const SIGNATURE_HEADER: &str = "MyFatoorah-Signature";

/// Shared state for the payment endpoints.
#[derive(Clone)]
pub struct PaymentAppState {
    pub store: Arc<dyn TransactionStore>,
    pub registry: Arc<dyn ProviderRegistry>,
    pub gateway: Arc<dyn GatewayApi>,
}

impl PaymentAppState {
    fn locator(&self) -> TransactionLocator {
        TransactionLocator::new(
            self.store.clone(),
            self.registry.clone(),
            self.gateway.clone(),
        )
    }

    fn reconciler(&self) -> StatusReconciler {
        StatusReconciler::new(
            self.store.clone(),
            self.registry.clone(),
            self.gateway.clone(),
        )
    }

    fn processor(&self) -> WebhookProcessor {
        WebhookProcessor::new(self.locator(), self.reconciler(), self.store.clone())
    }
}

#[derive(Debug, Deserialize)]
pub struct RedirectParams {
    #[serde(rename = "paymentId")]
    pub payment_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct WebhookAck {
    status: &'static str,
    message: &'static str,
}

fn ack(status_code: StatusCode, status: &'static str, message: &'static str) -> impl IntoResponse {
    (status_code, Json(WebhookAck { status, message }))
}

/// Reconcile from a redirect callback, best effort. The authoritative path
/// is the webhook; a redirect that cannot be reconciled (closed browser
/// races, forged query strings) is logged and the customer still gets the
/// status page.
async fn reconcile_from_redirect(state: &PaymentAppState, params: RedirectParams) {
    let Some(payment_id) = params.payment_id else {
        tracing::warn!("redirect callback without a paymentId parameter");
        return;
    };

    let payload = NotificationPayload::from_redirect(payment_id);
    match state.locator().locate(&payload).await {
        Ok(transaction) => {
            if let Err(e) = state.reconciler().reconcile(&transaction, &payload).await {
                tracing::error!(error = %e, "redirect reconciliation failed");
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "redirect did not match any transaction");
        }
    }
}

/// GET /payment/myfatoorah/return
pub async fn handle_return(
    State(state): State<PaymentAppState>,
    Query(params): Query<RedirectParams>,
) -> Redirect {
    reconcile_from_redirect(&state, params).await;
    Redirect::to(STATUS_PAGE)
}

/// GET /payment/myfatoorah/error
///
/// Same treatment as the success callback: the real outcome comes from the
/// gateway status query, not from which URL the browser was sent to.
pub async fn handle_payment_error(
    State(state): State<PaymentAppState>,
    Query(params): Query<RedirectParams>,
) -> Redirect {
    reconcile_from_redirect(&state, params).await;
    Redirect::to(STATUS_PAGE)
}

/// POST /payment/myfatoorah/webhook
pub async fn handle_webhook(
    State(state): State<PaymentAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let document: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!(error = %e, "webhook body is not valid JSON");
            return ack(StatusCode::BAD_REQUEST, "error", "Malformed JSON body.");
        }
    };

    let providers = match state.registry.list_enabled(true).await {
        Ok(providers) => providers,
        Err(e) => {
            tracing::error!(error = %e, "provider registry unavailable");
            Vec::new()
        }
    };
    if providers.is_empty() {
        tracing::warn!("webhook received but no provider has webhooks enabled");
        return ack(
            StatusCode::BAD_REQUEST,
            "error",
            "No active webhook provider configured.",
        );
    }

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    // Several provider records can share the one webhook URL; the event is
    // accepted if any of their secrets verifies it.
    let Some(provider) = authenticate(&providers, &body, signature) else {
        tracing::warn!("webhook signature verification failed for all providers");
        return ack(
            StatusCode::UNAUTHORIZED,
            "error",
            "Invalid webhook signature.",
        );
    };

    let event = WebhookEvent::from_value(&document);
    tracing::info!(
        event_type = %event.event_type,
        provider = %provider.name,
        "authenticated webhook event"
    );

    match state.processor().process(&event).await {
        Ok(()) => ack(StatusCode::OK, "ok", "Event processed."),
        Err(e) => {
            // Authenticated but unprocessable: acknowledge so the gateway
            // does not redeliver an event that will keep failing.
            tracing::error!(error = %e, "webhook event processing failed");
            ack(
                StatusCode::OK,
                "received",
                "Event received but processing failed.",
            )
        }
    }
}

fn authenticate<'a>(
    providers: &'a [ProviderConfig],
    body: &[u8],
    signature: &str,
) -> Option<&'a ProviderConfig> {
    providers
        .iter()
        .find(|provider| provider.verify_webhook(body, signature))
}
