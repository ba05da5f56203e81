//! Transaction store port.
//!
//! The order system owns transaction persistence and the generic payment
//! lifecycle; this port exposes only the lookups and transition primitives
//! the reconciliation core needs. The store guarantees per-record write
//! serialization and guards illegal transitions (calling `set_done` on an
//! already-done transaction is a no-op), so callers stay idempotent under
//! duplicate notification delivery.

use async_trait::async_trait;

use crate::domain::errors::StoreError;
use crate::domain::transaction::Transaction;

#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Find a transaction by its local reference (strong identifier).
    async fn find_by_reference(&self, reference: &str)
        -> Result<Option<Transaction>, StoreError>;

    /// Find a transaction by the gateway's invoice id (medium identifier).
    async fn find_by_provider_reference(
        &self,
        provider_reference: &str,
    ) -> Result<Option<Transaction>, StoreError>;

    /// Record the gateway invoice id on the transaction.
    async fn set_provider_reference(
        &self,
        reference: &str,
        provider_reference: &str,
    ) -> Result<(), StoreError>;

    /// Mark the payment as confirmed.
    async fn set_done(&self, reference: &str) -> Result<(), StoreError>;

    /// Mark the payment as in progress.
    async fn set_pending(&self, reference: &str) -> Result<(), StoreError>;

    /// Mark the payment as canceled, with an operator-facing message.
    async fn set_canceled(&self, reference: &str, message: &str) -> Result<(), StoreError>;

    /// Mark the payment as failed, with an operator-facing message.
    async fn set_error(&self, reference: &str, message: &str) -> Result<(), StoreError>;

    /// Attach an informational note to the transaction's history.
    async fn post_note(&self, reference: &str, note: &str) -> Result<(), StoreError>;
}
