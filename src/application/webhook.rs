//! Webhook event classification and dispatch.
//!
//! The gateway delivers one JSON document per event, in two spellings per
//! event type (older deployments send SCREAMING_SNAKE tokens, newer ones
//! PascalCase) and with the event fields either wrapped in a `Data` object or
//! flattened at the root. Classification is exact-match; anything else is
//! acknowledged and logged, never an error, so unknown future event types do
//! not trigger gateway redelivery storms.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::domain::errors::{LocateError, StoreError};
use crate::domain::notification::NotificationPayload;
use crate::ports::TransactionStore;

use super::locator::TransactionLocator;
use super::reconciler::StatusReconciler;

/// Event families this integration understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEventKind {
    PaymentStatusChanged,
    RefundStatusChanged,
    BalanceTransferred,
    Unknown,
}

impl WebhookEventKind {
    /// Exact-match classification over both known spellings of each token.
    pub fn classify(event_type: &str) -> Self {
        match event_type {
            "PAYMENT_STATUS_CHANGED" | "TransactionStatusChanged" => {
                WebhookEventKind::PaymentStatusChanged
            }
            "REFUND_STATUS_CHANGED" | "RefundStatusChanged" => {
                WebhookEventKind::RefundStatusChanged
            }
            "BALANCE_TRANSFERRED" | "BalanceTransferred" => WebhookEventKind::BalanceTransferred,
            _ => WebhookEventKind::Unknown,
        }
    }
}

/// A parsed webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    /// The raw event token as delivered, kept for logging.
    pub event_type: String,
    pub payload: NotificationPayload,
    /// Refund status text, present on refund events.
    pub refund_status: Option<String>,
}

/// Identifier fields arrive as strings or bare numbers depending on the
/// gateway version.
fn field_as_string(data: &Value, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl WebhookEvent {
    /// Parse a webhook body. Event fields live under `Data` when present,
    /// otherwise at the document root.
    pub fn from_value(body: &Value) -> Self {
        let event_type = body
            .get("Event")
            .or_else(|| body.get("EventType"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let data = body.get("Data").filter(|d| d.is_object()).unwrap_or(body);

        WebhookEvent {
            event_type,
            payload: NotificationPayload {
                payment_id: field_as_string(data, "PaymentId"),
                invoice_id: field_as_string(data, "InvoiceId"),
                customer_reference: field_as_string(data, "CustomerReference"),
            },
            refund_status: field_as_string(data, "RefundStatus")
                .or_else(|| field_as_string(data, "TransactionStatus")),
        }
    }

    pub fn kind(&self) -> WebhookEventKind {
        WebhookEventKind::classify(&self.event_type)
    }
}

/// Failure after a webhook's signature was already accepted.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct WebhookProcessor {
    locator: TransactionLocator,
    reconciler: StatusReconciler,
    store: Arc<dyn TransactionStore>,
}

impl WebhookProcessor {
    pub fn new(
        locator: TransactionLocator,
        reconciler: StatusReconciler,
        store: Arc<dyn TransactionStore>,
    ) -> Self {
        Self {
            locator,
            reconciler,
            store,
        }
    }

    /// Dispatch an authenticated webhook event.
    ///
    /// Only payment events drive state transitions. Refund events are
    /// recorded as a transaction note on a best-effort basis; balance and
    /// unknown events are logged and acknowledged.
    pub async fn process(&self, event: &WebhookEvent) -> Result<(), DispatchError> {
        match event.kind() {
            WebhookEventKind::PaymentStatusChanged => {
                let transaction = self.locator.locate(&event.payload).await?;
                self.reconciler.reconcile(&transaction, &event.payload).await?;
                Ok(())
            }
            WebhookEventKind::RefundStatusChanged => {
                self.record_refund(event).await?;
                Ok(())
            }
            WebhookEventKind::BalanceTransferred => {
                tracing::info!("balance transfer notification received");
                Ok(())
            }
            WebhookEventKind::Unknown => {
                tracing::warn!(event_type = %event.event_type, "unhandled webhook event type");
                Ok(())
            }
        }
    }

    /// Refunds are initiated from the gateway dashboard, outside this
    /// integration, so the event only yields an audit note. A refund for an
    /// invoice we cannot match is logged, not failed.
    async fn record_refund(&self, event: &WebhookEvent) -> Result<(), StoreError> {
        let status = event.refund_status.as_deref().unwrap_or("unknown");
        let Some(invoice_id) = &event.payload.invoice_id else {
            tracing::warn!("refund event without an invoice id");
            return Ok(());
        };

        match self.store.find_by_provider_reference(invoice_id).await? {
            Some(transaction) => {
                let note =
                    format!("Refund status changed to '{status}' for invoice {invoice_id}.");
                self.store.post_note(&transaction.reference, &note).await
            }
            None => {
                tracing::warn!(%invoice_id, "refund event for unknown invoice");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use secrecy::SecretString;
    use serde_json::json;
    use std::sync::Mutex;

    use crate::config::{GatewayEnvironment, ProviderConfig};
    use crate::domain::errors::GatewayError;
    use crate::domain::transaction::{Transaction, TransactionState};
    use crate::ports::{
        CreatedInvoice, GatewayApi, InvoiceRequest, PaymentStatus, ProviderRegistry,
        StatusKeyType,
    };

    #[test]
    fn classification_accepts_both_spellings() {
        for token in ["PAYMENT_STATUS_CHANGED", "TransactionStatusChanged"] {
            assert_eq!(
                WebhookEventKind::classify(token),
                WebhookEventKind::PaymentStatusChanged
            );
        }
        for token in ["REFUND_STATUS_CHANGED", "RefundStatusChanged"] {
            assert_eq!(
                WebhookEventKind::classify(token),
                WebhookEventKind::RefundStatusChanged
            );
        }
        for token in ["BALANCE_TRANSFERRED", "BalanceTransferred"] {
            assert_eq!(
                WebhookEventKind::classify(token),
                WebhookEventKind::BalanceTransferred
            );
        }
        assert_eq!(
            WebhookEventKind::classify("payment_status_changed"),
            WebhookEventKind::Unknown
        );
        assert_eq!(WebhookEventKind::classify(""), WebhookEventKind::Unknown);
    }

    #[test]
    fn event_fields_read_from_data_object() {
        let event = WebhookEvent::from_value(&json!({
            "Event": "TransactionStatusChanged",
            "Data": {
                "PaymentId": "07061234",
                "InvoiceId": 445566,
                "CustomerReference": "TX-010"
            }
        }));

        assert_eq!(event.kind(), WebhookEventKind::PaymentStatusChanged);
        assert_eq!(event.payload.payment_id.as_deref(), Some("07061234"));
        assert_eq!(event.payload.invoice_id.as_deref(), Some("445566"));
        assert_eq!(event.payload.customer_reference.as_deref(), Some("TX-010"));
    }

    #[test]
    fn event_fields_read_from_document_root() {
        let event = WebhookEvent::from_value(&json!({
            "Event": "RefundStatusChanged",
            "InvoiceId": "445566",
            "RefundStatus": "Refunded"
        }));

        assert_eq!(event.kind(), WebhookEventKind::RefundStatusChanged);
        assert_eq!(event.payload.invoice_id.as_deref(), Some("445566"));
        assert_eq!(event.refund_status.as_deref(), Some("Refunded"));
    }

    struct SharedStore {
        transactions: Mutex<Vec<Transaction>>,
        notes: Mutex<Vec<(String, String)>>,
    }

    impl SharedStore {
        fn with(transactions: Vec<Transaction>) -> Self {
            Self {
                transactions: Mutex::new(transactions),
                notes: Mutex::new(Vec::new()),
            }
        }

        fn state_of(&self, reference: &str) -> TransactionState {
            self.transactions
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.reference == reference)
                .map(|t| t.state)
                .unwrap()
        }
    }

    #[async_trait]
    impl TransactionStore for SharedStore {
        async fn find_by_reference(
            &self,
            reference: &str,
        ) -> Result<Option<Transaction>, StoreError> {
            Ok(self
                .transactions
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.reference == reference)
                .cloned())
        }

        async fn find_by_provider_reference(
            &self,
            provider_reference: &str,
        ) -> Result<Option<Transaction>, StoreError> {
            Ok(self
                .transactions
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.provider_reference.as_deref() == Some(provider_reference))
                .cloned())
        }

        async fn set_provider_reference(
            &self,
            reference: &str,
            provider_reference: &str,
        ) -> Result<(), StoreError> {
            let mut transactions = self.transactions.lock().unwrap();
            if let Some(tx) = transactions.iter_mut().find(|t| t.reference == reference) {
                tx.provider_reference = Some(provider_reference.to_string());
            }
            Ok(())
        }

        async fn set_done(&self, reference: &str) -> Result<(), StoreError> {
            let mut transactions = self.transactions.lock().unwrap();
            if let Some(tx) = transactions.iter_mut().find(|t| t.reference == reference) {
                tx.state = TransactionState::Done;
            }
            Ok(())
        }

        async fn set_pending(&self, reference: &str) -> Result<(), StoreError> {
            let mut transactions = self.transactions.lock().unwrap();
            if let Some(tx) = transactions.iter_mut().find(|t| t.reference == reference) {
                tx.state = TransactionState::Pending;
            }
            Ok(())
        }

        async fn set_canceled(&self, reference: &str, _message: &str) -> Result<(), StoreError> {
            let mut transactions = self.transactions.lock().unwrap();
            if let Some(tx) = transactions.iter_mut().find(|t| t.reference == reference) {
                tx.state = TransactionState::Canceled;
            }
            Ok(())
        }

        async fn set_error(&self, reference: &str, _message: &str) -> Result<(), StoreError> {
            let mut transactions = self.transactions.lock().unwrap();
            if let Some(tx) = transactions.iter_mut().find(|t| t.reference == reference) {
                tx.state = TransactionState::Error;
            }
            Ok(())
        }

        async fn post_note(&self, reference: &str, note: &str) -> Result<(), StoreError> {
            self.notes
                .lock()
                .unwrap()
                .push((reference.to_string(), note.to_string()));
            Ok(())
        }
    }

    struct OneProviderRegistry {
        provider: ProviderConfig,
    }

    #[async_trait]
    impl ProviderRegistry for OneProviderRegistry {
        async fn list_enabled(
            &self,
            _require_webhook: bool,
        ) -> Result<Vec<ProviderConfig>, StoreError> {
            Ok(vec![self.provider.clone()])
        }

        async fn get(&self, name: &str) -> Result<Option<ProviderConfig>, StoreError> {
            Ok((self.provider.name == name).then(|| self.provider.clone()))
        }
    }

    struct PaidGateway;

    #[async_trait]
    impl GatewayApi for PaidGateway {
        async fn create_invoice(
            &self,
            _provider: &ProviderConfig,
            _request: &InvoiceRequest,
        ) -> Result<CreatedInvoice, GatewayError> {
            unimplemented!("not used by the webhook processor")
        }

        async fn get_payment_status(
            &self,
            _provider: &ProviderConfig,
            _key: &str,
            _key_type: StatusKeyType,
        ) -> Result<PaymentStatus, GatewayError> {
            Ok(PaymentStatus {
                invoice_id: Some("445566".to_string()),
                invoice_status: "Paid".to_string(),
                customer_reference: Some("TX-020".to_string()),
                transactions: vec![],
            })
        }
    }

    fn processor(store: Arc<SharedStore>) -> WebhookProcessor {
        let registry = Arc::new(OneProviderRegistry {
            provider: ProviderConfig {
                name: "myfatoorah".to_string(),
                environment: GatewayEnvironment::Test,
                country: "SA".to_string(),
                live_api_key: None,
                test_api_key: Some(SecretString::new("key".to_string())),
                webhook_secret: None,
                webhook_enabled: true,
            },
        });
        let gateway = Arc::new(PaidGateway);
        WebhookProcessor::new(
            TransactionLocator::new(store.clone(), registry.clone(), gateway.clone()),
            StatusReconciler::new(store.clone(), registry, gateway),
            store,
        )
    }

    fn pending_tx(reference: &str, provider_reference: Option<&str>) -> Transaction {
        let mut tx = Transaction::new(reference, "myfatoorah", 10.5, "SAR");
        tx.state = TransactionState::Pending;
        tx.provider_reference = provider_reference.map(String::from);
        tx
    }

    #[tokio::test]
    async fn payment_event_drives_reconciliation() {
        let store = Arc::new(SharedStore::with(vec![pending_tx("TX-020", None)]));
        let processor = processor(store.clone());

        let event = WebhookEvent::from_value(&json!({
            "Event": "TransactionStatusChanged",
            "Data": { "PaymentId": "07061234" }
        }));

        processor.process(&event).await.unwrap();
        assert_eq!(store.state_of("TX-020"), TransactionState::Done);
    }

    #[tokio::test]
    async fn refund_event_posts_note() {
        let store = Arc::new(SharedStore::with(vec![pending_tx(
            "TX-021",
            Some("445566"),
        )]));
        let processor = processor(store.clone());

        let event = WebhookEvent::from_value(&json!({
            "Event": "RefundStatusChanged",
            "Data": { "InvoiceId": "445566", "RefundStatus": "Refunded" }
        }));

        processor.process(&event).await.unwrap();

        let notes = store.notes.lock().unwrap().clone();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].0, "TX-021");
        assert!(notes[0].1.contains("Refunded"));
        assert!(notes[0].1.contains("445566"));
        assert_eq!(store.state_of("TX-021"), TransactionState::Pending);
    }

    #[tokio::test]
    async fn refund_for_unknown_invoice_is_acknowledged() {
        let store = Arc::new(SharedStore::with(vec![]));
        let processor = processor(store.clone());

        let event = WebhookEvent::from_value(&json!({
            "Event": "REFUND_STATUS_CHANGED",
            "Data": { "InvoiceId": "000000", "RefundStatus": "Refunded" }
        }));

        assert!(processor.process(&event).await.is_ok());
        assert!(store.notes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_event_is_acknowledged_without_effect() {
        let store = Arc::new(SharedStore::with(vec![pending_tx("TX-022", None)]));
        let processor = processor(store.clone());

        let event = WebhookEvent::from_value(&json!({
            "Event": "SupplierApproved",
            "Data": { "PaymentId": "07061234" }
        }));

        assert!(processor.process(&event).await.is_ok());
        assert_eq!(store.state_of("TX-022"), TransactionState::Pending);
    }

    #[tokio::test]
    async fn payment_event_for_unknown_transaction_fails_dispatch() {
        let store = Arc::new(SharedStore::with(vec![]));
        let processor = processor(store.clone());

        let event = WebhookEvent::from_value(&json!({
            "Event": "PAYMENT_STATUS_CHANGED",
            "Data": { "CustomerReference": "TX-GONE" }
        }));

        let err = processor.process(&event).await.unwrap_err();
        assert!(matches!(err, DispatchError::Locate(_)));
    }
}
