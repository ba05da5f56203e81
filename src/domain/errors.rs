//! Error taxonomy for the payment integration.
//!
//! Gateway transport and business failures are normalized into
//! `GatewayError`; it is always caught at the reconciliation boundary and
//! converted into a transaction `error` state rather than propagated to the
//! HTTP layer.

use thiserror::Error;

/// Normalized failure of a gateway API call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The API key for the active environment is not configured. Raised
    /// before any network I/O.
    #[error("missing {mode} API key for MyFatoorah provider '{provider}'")]
    MissingApiKey {
        provider: String,
        mode: &'static str,
    },

    /// The request to the gateway timed out.
    #[error("the request to the payment gateway timed out")]
    Timeout,

    /// The gateway could not be reached.
    #[error("could not connect to the payment gateway")]
    Unreachable,

    /// The gateway returned something that is not a valid API envelope.
    #[error("invalid response from the payment gateway: {0}")]
    BadResponse(String),

    /// HTTP-level success but the envelope reported a business failure.
    #[error("the payment gateway rejected the request: {0}")]
    Rejected(String),
}

/// Failure of a transaction-store or provider-registry operation.
#[derive(Debug, Clone, Error)]
#[error("transaction store error: {0}")]
pub struct StoreError(pub String);

/// Failure to resolve a notification to a transaction.
#[derive(Debug, Error)]
pub enum LocateError {
    /// No tier of the lookup cascade matched. Echoes every identifier that
    /// was tried so an operator can diagnose the orphaned notification.
    #[error(
        "no transaction matches the notification data \
         (reference: {customer_reference:?}, paymentId: {payment_id:?}, \
         invoiceId: {invoice_id:?})"
    )]
    NotFound {
        customer_reference: Option<String>,
        payment_id: Option<String>,
        invoice_id: Option<String>,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure of invoice creation. Unlike reconciliation errors these are
/// surfaced to the checkout flow: without an invoice URL there is nothing to
/// redirect the customer to.
#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The gateway accepted the request but returned no invoice URL.
    #[error("no invoice URL received from the payment gateway")]
    MissingInvoiceUrl,

    #[error(transparent)]
    Store(#[from] StoreError),
}
