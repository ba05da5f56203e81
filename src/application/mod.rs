//! Application layer: the notification reconciliation core.
//!
//! Data flow: endpoint -> [`TransactionLocator`] -> [`StatusReconciler`] ->
//! gateway. Invoice creation sits outside the reconciliation path but shares
//! the gateway port and its error normalization.

pub mod invoice;
pub mod locator;
pub mod reconciler;
pub mod webhook;

pub use invoice::{CheckoutRedirect, InvoiceCreator};
pub use locator::TransactionLocator;
pub use reconciler::StatusReconciler;
pub use webhook::{DispatchError, WebhookEvent, WebhookEventKind, WebhookProcessor};
