//! Transaction locator: three-tier identifier cascade.
//!
//! Notifications identify their transaction with up to three identifiers of
//! decreasing reliability. The cascade tries the strong local reference
//! first, then the gateway invoice id, and only then upgrades a weak
//! `paymentId` by asking the gateway itself which durable identifiers it
//! maps to. Redirect callbacks carry nothing but the weak id, so tier 3 is
//! what makes them reconcilable at all.

use std::sync::Arc;

use crate::domain::errors::LocateError;
use crate::domain::notification::NotificationPayload;
use crate::domain::transaction::Transaction;
use crate::ports::{GatewayApi, ProviderRegistry, StatusKeyType, TransactionStore};

pub struct TransactionLocator {
    store: Arc<dyn TransactionStore>,
    registry: Arc<dyn ProviderRegistry>,
    gateway: Arc<dyn GatewayApi>,
}

impl TransactionLocator {
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

    /// Resolve a notification to exactly one local transaction.
    ///
    /// Tiers 1 and 2 query the local store only. Tier 3 performs one status
    /// call per enabled provider to translate the weak `paymentId` into
    /// durable identifiers, skipping providers whose status call fails (a
    /// multi-country setup routinely has providers that don't know the
    /// payment). An exhausted cascade fails with a `NotFound` that echoes
    /// every identifier tried.
    pub async fn locate(&self, payload: &NotificationPayload) -> Result<Transaction, LocateError> {
        tracing::info!(
            reference = ?payload.customer_reference,
            payment_id = ?payload.payment_id,
            invoice_id = ?payload.invoice_id,
            "looking up transaction for notification"
        );

        if let Some(reference) = &payload.customer_reference {
            if let Some(tx) = self.store.find_by_reference(reference).await? {
                return Ok(tx);
            }
        }

        if let Some(invoice_id) = &payload.invoice_id {
            if let Some(tx) = self.store.find_by_provider_reference(invoice_id).await? {
                return Ok(tx);
            }
        }

        if let Some(payment_id) = &payload.payment_id {
            for provider in self.registry.list_enabled(false).await? {
                let status = match self
                    .gateway
                    .get_payment_status(&provider, payment_id, StatusKeyType::PaymentId)
                    .await
                {
                    Ok(status) => status,
                    Err(e) => {
                        tracing::warn!(
                            provider = %provider.name,
                            error = %e,
                            "payment status lookup failed, trying next provider"
                        );
                        continue;
                    }
                };

                if let Some(reference) = &status.customer_reference {
                    if let Some(tx) = self.store.find_by_reference(reference).await? {
                        return Ok(tx);
                    }
                }
                if let Some(invoice_id) = &status.invoice_id {
                    if let Some(tx) = self.store.find_by_provider_reference(invoice_id).await? {
                        return Ok(tx);
                    }
                }
            }
        }

        Err(LocateError::NotFound {
            customer_reference: payload.customer_reference.clone(),
            payment_id: payload.payment_id.clone(),
            invoice_id: payload.invoice_id.clone(),
        })
    }
}
