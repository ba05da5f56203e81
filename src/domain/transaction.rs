//! Payment transaction record and lifecycle states.
//!
//! The transaction itself is owned by the surrounding order system; this
//! crate reads it and advances its state through the `TransactionStore`
//! transition primitives. Terminal states are guarded here so that repeated
//! notification deliveries cannot corrupt an already-settled transaction.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a payment transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionState {
    /// Created locally, no invoice yet.
    Draft,

    /// Invoice created or payment in progress at the gateway.
    Pending,

    /// Payment confirmed by the gateway.
    Done,

    /// Payment expired or canceled.
    Canceled,

    /// Payment failed or could not be verified.
    Error,
}

impl TransactionState {
    /// Terminal states can never be left again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionState::Done | TransactionState::Canceled | TransactionState::Error
        )
    }

    /// Whether a transition into `next` is permitted from this state.
    ///
    /// Re-applying the current state is always allowed (idempotent no-op);
    /// leaving a terminal state is not.
    pub fn accepts(&self, next: TransactionState) -> bool {
        if *self == next {
            return true;
        }
        !self.is_terminal()
    }
}

/// Customer address forwarded to the gateway invoice, when known.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerAddress {
    pub street: String,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl CustomerAddress {
    /// One-line rendering used for the gateway's free-form address field.
    pub fn formatted(&self) -> String {
        [
            Some(self.street.as_str()),
            self.street2.as_deref(),
            self.city.as_deref(),
            self.state.as_deref(),
            self.zip.as_deref(),
        ]
        .iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// Customer contact details used to build the invoice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<CustomerAddress>,
    /// Customer locale, e.g. `ar_SA` or `en_US`.
    pub lang: Option<String>,
}

/// One order line, mapped to a gateway invoice item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

/// A payment transaction as seen by this integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Locally-assigned unique reference, immutable once created.
    /// The strongest identifier in the reconciliation cascade.
    pub reference: String,

    /// The gateway's invoice id once an invoice exists.
    pub provider_reference: Option<String>,

    /// Name of the provider configuration this transaction was created with.
    pub provider: String,

    pub amount: f64,
    pub currency: String,

    pub state: TransactionState,

    /// Message recorded with the last canceled/error transition.
    pub state_message: Option<String>,

    pub customer: CustomerDetails,

    /// Order lines backing this payment; empty for standalone payments.
    pub order_lines: Vec<OrderLine>,
}

impl Transaction {
    /// A fresh draft transaction for the given provider.
    pub fn new(
        reference: impl Into<String>,
        provider: impl Into<String>,
        amount: f64,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            reference: reference.into(),
            provider_reference: None,
            provider: provider.into(),
            amount,
            currency: currency.into(),
            state: TransactionState::Draft,
            state_message: None,
            customer: CustomerDetails::default(),
            order_lines: Vec::new(),
        }
    }
}
