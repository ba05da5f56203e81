//! Hosted invoice creation.
//!
//! Builds the gateway invoice request from a local transaction, creates the
//! invoice, records the returned invoice id as the transaction's
//! `provider_reference` and hands back the hosted payment page URL for the
//! browser redirect.

use std::sync::Arc;

use crate::domain::errors::InvoiceError;
use crate::domain::transaction::{OrderLine, Transaction};
use crate::config::ProviderConfig;
use crate::ports::{GatewayApi, InvoiceRequest, TransactionStore};

/// Monetary amounts are sent with 3 decimals; the gateway serves currencies
/// with 3-decimal minor units (KWD, BHD).
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Keep digits and a leading `+`; the gateway rejects formatted numbers.
fn sanitize_phone(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .enumerate()
        .filter(|(i, c)| c.is_ascii_digit() || (*i == 0 && *c == '+'))
        .map(|(_, c)| c)
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

/// What the checkout flow needs to continue: where to send the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRedirect {
    /// Hosted payment page URL.
    pub invoice_url: String,
    /// The transaction reference the redirect belongs to.
    pub reference: String,
}

pub struct InvoiceCreator {
    store: Arc<dyn TransactionStore>,
    gateway: Arc<dyn GatewayApi>,
    /// Public base URL of this service, no trailing slash.
    base_url: String,
}

impl InvoiceCreator {
    pub fn new(
        store: Arc<dyn TransactionStore>,
        gateway: Arc<dyn GatewayApi>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            gateway,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a hosted invoice for `transaction` and move it to pending.
    ///
    /// The invoice id comes back before the customer ever sees the payment
    /// page, so it is persisted immediately; webhook deliveries may race the
    /// browser redirect and both need the id to resolve the transaction.
    pub async fn create(
        &self,
        transaction: &Transaction,
        provider: &ProviderConfig,
    ) -> Result<CheckoutRedirect, InvoiceError> {
        let reference = &transaction.reference;
        let request = self.build_request(transaction, provider);

        tracing::info!(
            %reference,
            amount = request.amount,
            currency = %request.currency,
            provider = %provider.name,
            "creating hosted invoice"
        );

        let created = self.gateway.create_invoice(provider, &request).await?;

        let invoice_url = match created.invoice_url {
            Some(url) if !url.is_empty() => url,
            _ => {
                tracing::error!(%reference, "invoice created without a payment URL");
                return Err(InvoiceError::MissingInvoiceUrl);
            }
        };

        if let Some(invoice_id) = &created.invoice_id {
            self.store
                .set_provider_reference(reference, invoice_id)
                .await?;
        }
        self.store.set_pending(reference).await?;

        tracing::info!(%reference, invoice_id = ?created.invoice_id, "invoice created");

        Ok(CheckoutRedirect {
            invoice_url,
            reference: reference.clone(),
        })
    }

    fn build_request(&self, transaction: &Transaction, provider: &ProviderConfig) -> InvoiceRequest {
        let amount = round3(transaction.amount);
        let customer = &transaction.customer;

        // Zero-priced lines (discount markers, notes) are not valid invoice
        // items; a payment without usable lines gets one synthetic line for
        // the full amount.
        let mut items: Vec<OrderLine> = transaction
            .order_lines
            .iter()
            .filter(|line| line.unit_price > 0.0)
            .map(|line| OrderLine {
                name: line.name.clone(),
                quantity: line.quantity.max(1),
                unit_price: round3(line.unit_price),
            })
            .collect();
        if items.is_empty() {
            items.push(OrderLine {
                name: transaction.reference.clone(),
                quantity: 1,
                unit_price: amount,
            });
        }

        let language = match &customer.lang {
            Some(lang) if lang.to_lowercase().starts_with("ar") => "ar",
            _ => "en",
        };

        InvoiceRequest {
            amount,
            currency: transaction.currency.clone(),
            customer_reference: transaction.reference.clone(),
            customer_name: customer.name.clone(),
            customer_email: customer.email.clone().filter(|e| !e.is_empty()),
            customer_phone: customer.phone.as_deref().and_then(sanitize_phone),
            customer_address: customer.address.clone(),
            language: language.to_string(),
            items,
            return_url: format!("{}/payment/myfatoorah/return", self.base_url),
            error_url: format!("{}/payment/myfatoorah/error", self.base_url),
            webhook_url: provider
                .webhook_enabled
                .then(|| format!("{}/payment/myfatoorah/webhook", self.base_url)),
        }
    }
}
