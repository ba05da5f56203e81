//! Gateway API port.
//!
//! Two remote operations back the whole integration: creating a hosted
//! invoice and fetching the authoritative payment status. Implementations
//! normalize every transport, HTTP and business failure into
//! [`GatewayError`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::domain::errors::GatewayError;
use crate::domain::transaction::{CustomerAddress, OrderLine};

/// Which identifier a status query is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKeyType {
    /// The transient payment-session id from a redirect callback.
    PaymentId,
    /// The persistent invoice id.
    InvoiceId,
}

impl StatusKeyType {
    /// The gateway's wire token for this key type.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKeyType::PaymentId => "PaymentId",
            StatusKeyType::InvoiceId => "InvoiceId",
        }
    }
}

/// Request to create a hosted-payment invoice.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceRequest {
    /// Invoice total, already rounded to 3 decimals.
    pub amount: f64,
    pub currency: String,

    /// Local transaction reference, echoed back by the gateway as
    /// `CustomerReference`.
    pub customer_reference: String,

    pub customer_name: String,
    pub customer_email: Option<String>,
    /// Sanitized phone number (digits and `+` only).
    pub customer_phone: Option<String>,
    pub customer_address: Option<CustomerAddress>,

    /// Two-letter invoice page language (`ar` or `en`).
    pub language: String,

    /// Invoice line items; never empty (a synthetic total line is used when
    /// no order lines exist).
    pub items: Vec<OrderLine>,

    /// Browser redirect target after successful payment.
    pub return_url: String,
    /// Browser redirect target after failed payment.
    pub error_url: String,
    /// Server-to-server event delivery URL, when webhooks are enabled.
    pub webhook_url: Option<String>,
}

/// Result of invoice creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedInvoice {
    /// The gateway's invoice id; stored as the transaction's
    /// `provider_reference`.
    pub invoice_id: Option<String>,
    /// Hosted payment page URL to redirect the customer to.
    pub invoice_url: Option<String>,
}

/// One entry of the invoice's transaction history, newest last.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayTransaction {
    pub status: String,
    pub error: Option<String>,
    pub error_code: Option<String>,
}

impl GatewayTransaction {
    /// Error text preferred over the bare code, if either is present.
    pub fn error_text(&self) -> Option<&str> {
        self.error
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.error_code.as_deref())
    }
}

/// Authoritative payment status fetched from the gateway.
#[derive(Debug, Clone, Default)]
pub struct PaymentStatus {
    pub invoice_id: Option<String>,
    pub invoice_status: String,
    pub customer_reference: Option<String>,
    /// Payment attempts against this invoice, oldest first.
    pub transactions: Vec<GatewayTransaction>,
}

impl PaymentStatus {
    /// The newest transaction entry, if any.
    pub fn latest_transaction(&self) -> Option<&GatewayTransaction> {
        self.transactions.last()
    }

    /// Effective status string: the latest transaction entry's status when
    /// the list is non-empty, otherwise the invoice-level status. The
    /// fallback matters for the transaction-level success token, which some
    /// responses report at the invoice level with no transaction list.
    pub fn effective_transaction_status(&self) -> &str {
        self.latest_transaction()
            .map(|t| t.status.as_str())
            .unwrap_or(&self.invoice_status)
    }
}

/// Port for the two MyFatoorah API operations this integration uses.
#[async_trait]
pub trait GatewayApi: Send + Sync {
    /// Create a hosted-payment invoice.
    async fn create_invoice(
        &self,
        provider: &ProviderConfig,
        request: &InvoiceRequest,
    ) -> Result<CreatedInvoice, GatewayError>;

    /// Fetch the authoritative status of a payment or invoice.
    async fn get_payment_status(
        &self,
        provider: &ProviderConfig,
        key: &str,
        key_type: StatusKeyType,
    ) -> Result<PaymentStatus, GatewayError>;
}
