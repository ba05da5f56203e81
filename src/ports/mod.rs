//! Ports: trait seams to external collaborators.
//!
//! The transaction store and provider registry belong to the surrounding
//! order system; the gateway API is remote. All three are injected into the
//! application layer as `Arc<dyn Trait>`.

mod gateway;
mod provider_registry;
mod transaction_store;

pub use gateway::{
    CreatedInvoice, GatewayApi, GatewayTransaction, InvoiceRequest, PaymentStatus, StatusKeyType,
};
pub use provider_registry::ProviderRegistry;
pub use transaction_store::TransactionStore;
