//! Status reconciler: authoritative status fetch and state transition.
//!
//! The payload a notification carries is never trusted; the reconciler
//! always calls back to the gateway for the current status and derives the
//! local transition from that. Every path ends in a defined transaction
//! state. Gateway failures become a transaction `error` with a generic
//! message and are never propagated upward: the gateway's own webhook
//! redelivery is the retry mechanism.

use std::sync::Arc;

use crate::domain::errors::StoreError;
use crate::domain::notification::NotificationPayload;
use crate::domain::status::{map_status, StatusOutcome};
use crate::domain::transaction::Transaction;
use crate::ports::{GatewayApi, ProviderRegistry, StatusKeyType, TransactionStore};

pub struct StatusReconciler {
    store: Arc<dyn TransactionStore>,
    registry: Arc<dyn ProviderRegistry>,
    gateway: Arc<dyn GatewayApi>,
}

impl StatusReconciler {
    pub fn new(
        store: Arc<dyn TransactionStore>,
        registry: Arc<dyn ProviderRegistry>,
        gateway: Arc<dyn GatewayApi>,
    ) -> Self {
        Self {
            store,
            registry,
            gateway,
        }
    }

    /// Fetch the authoritative payment status and apply the matching state
    /// transition.
    ///
    /// Safe to call repeatedly for the same underlying status change: the
    /// store's transition primitives guard terminal states, and the status
    /// is re-derived from the gateway on every call rather than from message
    /// order. Only store failures propagate; everything gateway-related
    /// resolves to the transaction's `error` state.
    pub async fn reconcile(
        &self,
        transaction: &Transaction,
        payload: &NotificationPayload,
    ) -> Result<(), StoreError> {
        let reference = &transaction.reference;

        tracing::info!(
            %reference,
            payment_id = ?payload.payment_id,
            invoice_id = ?payload.invoice_id,
            "processing notification"
        );

        // The transient payment id pins the status to the exact payment
        // attempt; the invoice id only identifies the invoice as a whole.
        let (key, key_type) = if let Some(payment_id) = &payload.payment_id {
            (payment_id.clone(), StatusKeyType::PaymentId)
        } else if let Some(invoice_id) = payload
            .invoice_id
            .clone()
            .or_else(|| transaction.provider_reference.clone())
        {
            (invoice_id, StatusKeyType::InvoiceId)
        } else {
            tracing::error!(%reference, "no paymentId or invoiceId in notification");
            return self
                .store
                .set_error(reference, "Missing payment identification in the notification.")
                .await;
        };

        let provider = match self.registry.get(&transaction.provider).await? {
            Some(provider) => provider,
            None => {
                tracing::error!(
                    %reference,
                    provider = %transaction.provider,
                    "provider configuration not found"
                );
                return self
                    .store
                    .set_error(reference, "Payment provider configuration not found.")
                    .await;
            }
        };

        let status = match self
            .gateway
            .get_payment_status(&provider, &key, key_type)
            .await
        {
            Ok(status) => status,
            Err(e) => {
                tracing::error!(%reference, error = %e, "failed to fetch payment status");
                return self
                    .store
                    .set_error(reference, "Failed to verify payment status.")
                    .await;
            }
        };

        if transaction.provider_reference.is_none() {
            if let Some(invoice_id) = &status.invoice_id {
                self.store
                    .set_provider_reference(reference, invoice_id)
                    .await?;
            }
        }

        let transaction_status = status.effective_transaction_status();
        let latest_error = status.latest_transaction().and_then(|t| t.error_text());

        // Local amount logged next to the fetched status: the gateway does
        // not echo the amount in a form we cross-check, so the audit trail
        // is where a mismatch would surface.
        tracing::info!(
            %reference,
            amount = transaction.amount,
            currency = %transaction.currency,
            invoice_status = %status.invoice_status,
            transaction_status = %transaction_status,
            "reconciling transaction state"
        );

        match map_status(&status.invoice_status, transaction_status, latest_error) {
            StatusOutcome::Done => self.store.set_done(reference).await,
            StatusOutcome::Pending => self.store.set_pending(reference).await,
            StatusOutcome::Canceled(message) => {
                self.store.set_canceled(reference, &message).await
            }
            StatusOutcome::Error(message) => {
                tracing::warn!(%reference, %message, "payment did not succeed");
                self.store.set_error(reference, &message).await
            }
        }
    }
}
