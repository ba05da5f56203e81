//! In-memory transaction store and provider registry.
//!
//! The production deployment backs these ports with the order system's own
//! database; this adapter provides the same semantics for standalone runs
//! and integration tests, including the terminal-state transition guards the
//! store contract promises.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::config::ProviderConfig;
use crate::domain::errors::StoreError;
use crate::domain::transaction::{Transaction, TransactionState};
use crate::ports::{ProviderRegistry, TransactionStore};

#[derive(Default)]
pub struct InMemoryTransactionStore {
    transactions: Mutex<Vec<Transaction>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a transaction. Replaces any existing record with the same
    /// reference.
    pub fn insert(&self, transaction: Transaction) {
        let mut transactions = self.lock();
        transactions.retain(|t| t.reference != transaction.reference);
        transactions.push(transaction);
    }

    pub fn get(&self, reference: &str) -> Option<Transaction> {
        self.lock()
            .iter()
            .find(|t| t.reference == reference)
            .cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Transaction>> {
        // Mutex poisoning only happens after a panic in another test thread;
        // recover the data rather than cascading the failure.
        self.transactions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn transition(
        &self,
        reference: &str,
        next: TransactionState,
        message: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut transactions = self.lock();
        let transaction = transactions
            .iter_mut()
            .find(|t| t.reference == reference)
            .ok_or_else(|| StoreError(format!("unknown transaction reference '{reference}'")))?;

        if !transaction.state.accepts(next) {
            tracing::warn!(
                %reference,
                current = ?transaction.state,
                requested = ?next,
                "ignoring transition out of a terminal state"
            );
            return Ok(());
        }

        transaction.state = next;
        transaction.state_message = message.map(String::from);
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn find_by_reference(&self, reference: &str) -> Result<Option<Transaction>, StoreError> {
        Ok(self.get(reference))
    }

    async fn find_by_provider_reference(
        &self,
        provider_reference: &str,
    ) -> Result<Option<Transaction>, StoreError> {
        Ok(self
            .lock()
            .iter()
            .find(|t| t.provider_reference.as_deref() == Some(provider_reference))
            .cloned())
    }

    async fn set_provider_reference(
        &self,
        reference: &str,
        provider_reference: &str,
    ) -> Result<(), StoreError> {
        let mut transactions = self.lock();
        let transaction = transactions
            .iter_mut()
            .find(|t| t.reference == reference)
            .ok_or_else(|| StoreError(format!("unknown transaction reference '{reference}'")))?;
        transaction.provider_reference = Some(provider_reference.to_string());
        Ok(())
    }

    async fn set_done(&self, reference: &str) -> Result<(), StoreError> {
        self.transition(reference, TransactionState::Done, None)
    }

    async fn set_pending(&self, reference: &str) -> Result<(), StoreError> {
        self.transition(reference, TransactionState::Pending, None)
    }

    async fn set_canceled(&self, reference: &str, message: &str) -> Result<(), StoreError> {
        self.transition(reference, TransactionState::Canceled, Some(message))
    }

    async fn set_error(&self, reference: &str, message: &str) -> Result<(), StoreError> {
        self.transition(reference, TransactionState::Error, Some(message))
    }

    async fn post_note(&self, reference: &str, note: &str) -> Result<(), StoreError> {
        tracing::info!(%reference, %note, "transaction note");
        Ok(())
    }
}

/// Registry over a fixed set of provider records, typically the single one
/// from the environment configuration.
pub struct StaticProviderRegistry {
    providers: Vec<ProviderConfig>,
}

impl StaticProviderRegistry {
    pub fn new(providers: Vec<ProviderConfig>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl ProviderRegistry for StaticProviderRegistry {
    async fn list_enabled(
        &self,
        require_webhook: bool,
    ) -> Result<Vec<ProviderConfig>, StoreError> {
        Ok(self
            .providers
            .iter()
            .filter(|p| !require_webhook || p.webhook_enabled)
            .cloned()
            .collect())
    }

    async fn get(&self, name: &str) -> Result<Option<ProviderConfig>, StoreError> {
        Ok(self.providers.iter().find(|p| p.name == name).cloned())
    }
}
