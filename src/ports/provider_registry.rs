//! Provider registry port.
//!
//! Provider configuration records live with the order system's settings
//! storage. The webhook endpoint and the weak-identifier lookup both need to
//! enumerate the active records; the reconciler resolves a transaction's own
//! provider by name.

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::domain::errors::StoreError;

#[async_trait]
pub trait ProviderRegistry: Send + Sync {
    /// All enabled (live or test) provider records for this gateway.
    ///
    /// With `require_webhook` set, only records with webhooks explicitly
    /// enabled are returned.
    async fn list_enabled(&self, require_webhook: bool)
        -> Result<Vec<ProviderConfig>, StoreError>;

    /// Look up one provider record by name.
    async fn get(&self, name: &str) -> Result<Option<ProviderConfig>, StoreError>;
}
