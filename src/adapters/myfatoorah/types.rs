//! MyFatoorah v2 wire types.
//!
//! The API wraps every response in the same envelope; `Data` carries the
//! operation-specific payload. Identifier fields arrive as JSON numbers in
//! current deployments and as strings in older ones, so ids are taken as raw
//! values and stringified.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::transaction::CustomerAddress;
use crate::ports::{CreatedInvoice, GatewayTransaction, InvoiceRequest, PaymentStatus};

/// How the gateway contacts the customer about the invoice. The hosted
/// checkout always gets the link; email and SMS channels are added when the
/// matching contact details exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotificationOption {
    #[serde(rename = "LNK")]
    Link,
    #[serde(rename = "SMS")]
    Sms,
    #[serde(rename = "ALL")]
    All,
}

impl NotificationOption {
    /// Escalate from the link-only base: an email upgrades to all channels,
    /// a phone number alone upgrades to SMS.
    pub fn for_contact(has_email: bool, has_phone: bool) -> Self {
        match (has_email, has_phone) {
            (true, _) => NotificationOption::All,
            (false, true) => NotificationOption::Sms,
            (false, false) => NotificationOption::Link,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceItem {
    #[serde(rename = "ItemName")]
    pub item_name: String,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
    #[serde(rename = "UnitPrice")]
    pub unit_price: f64,
}

/// Structured address block; the free-form `Address` field carries the
/// one-line rendering, the granular fields the gateway requires are sent
/// empty when unknown.
#[derive(Debug, Clone, Serialize)]
pub struct AddressBlock {
    #[serde(rename = "Block")]
    pub block: String,
    #[serde(rename = "Street")]
    pub street: String,
    #[serde(rename = "HouseBuildingNo")]
    pub house_building_no: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "AddressInstructions")]
    pub address_instructions: String,
}

impl From<&CustomerAddress> for AddressBlock {
    fn from(address: &CustomerAddress) -> Self {
        AddressBlock {
            block: String::new(),
            street: address.street.clone(),
            house_building_no: String::new(),
            address: address.formatted(),
            address_instructions: String::new(),
        }
    }
}

/// `/v2/SendPayment` request body.
#[derive(Debug, Clone, Serialize)]
pub struct SendPaymentRequest {
    #[serde(rename = "InvoiceValue")]
    pub invoice_value: f64,
    #[serde(rename = "CustomerName")]
    pub customer_name: String,
    #[serde(rename = "NotificationOption")]
    pub notification_option: NotificationOption,
    #[serde(rename = "CallBackUrl")]
    pub callback_url: String,
    #[serde(rename = "ErrorUrl")]
    pub error_url: String,
    #[serde(rename = "Language")]
    pub language: String,
    #[serde(rename = "DisplayCurrencyIso")]
    pub display_currency_iso: String,
    #[serde(rename = "CustomerReference")]
    pub customer_reference: String,
    #[serde(rename = "InvoiceItems")]
    pub invoice_items: Vec<InvoiceItem>,
    #[serde(rename = "CustomerEmail", skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(rename = "CustomerMobile", skip_serializing_if = "Option::is_none")]
    pub customer_mobile: Option<String>,
    #[serde(rename = "CustomerAddress", skip_serializing_if = "Option::is_none")]
    pub customer_address: Option<AddressBlock>,
    #[serde(rename = "WebhookUrl", skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl From<&InvoiceRequest> for SendPaymentRequest {
    fn from(request: &InvoiceRequest) -> Self {
        SendPaymentRequest {
            invoice_value: request.amount,
            customer_name: request.customer_name.clone(),
            notification_option: NotificationOption::for_contact(
                request.customer_email.is_some(),
                request.customer_phone.is_some(),
            ),
            callback_url: request.return_url.clone(),
            error_url: request.error_url.clone(),
            language: request.language.clone(),
            display_currency_iso: request.currency.clone(),
            customer_reference: request.customer_reference.clone(),
            invoice_items: request
                .items
                .iter()
                .map(|line| InvoiceItem {
                    item_name: line.name.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                })
                .collect(),
            customer_email: request.customer_email.clone(),
            customer_mobile: request.customer_phone.clone(),
            customer_address: request.customer_address.as_ref().map(AddressBlock::from),
            webhook_url: request.webhook_url.clone(),
        }
    }
}

/// `/v2/GetPaymentStatus` request body.
#[derive(Debug, Clone, Serialize)]
pub struct GetPaymentStatusRequest {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "KeyType")]
    pub key_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ValidationErrorEntry {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Error")]
    pub error: Option<String>,
}

/// The response envelope shared by all API operations.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    #[serde(rename = "IsSuccess", default)]
    pub is_success: bool,
    #[serde(rename = "Message")]
    pub message: Option<String>,
    #[serde(rename = "ValidationErrors")]
    pub validation_errors: Option<Vec<ValidationErrorEntry>>,
    #[serde(rename = "Data")]
    pub data: Option<Value>,
}

impl ApiEnvelope {
    /// One line aggregating the envelope's message and every validation
    /// error, for the rejection error and the audit log.
    pub fn error_summary(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(message) = self.message.as_ref().filter(|m| !m.is_empty()) {
            parts.push(message.clone());
        }
        if let Some(errors) = &self.validation_errors {
            for entry in errors {
                match (&entry.name, &entry.error) {
                    (Some(name), Some(error)) => parts.push(format!("{name}: {error}")),
                    (None, Some(error)) => parts.push(error.clone()),
                    (Some(name), None) => parts.push(name.clone()),
                    (None, None) => {}
                }
            }
        }
        if parts.is_empty() {
            "unspecified gateway error".to_string()
        } else {
            parts.join("; ")
        }
    }
}

fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `Data` payload of a successful `/v2/SendPayment` call.
#[derive(Debug, Deserialize)]
pub struct SendPaymentData {
    #[serde(rename = "InvoiceId")]
    pub invoice_id: Option<Value>,
    #[serde(rename = "InvoiceURL")]
    pub invoice_url: Option<String>,
}

impl From<SendPaymentData> for CreatedInvoice {
    fn from(data: SendPaymentData) -> Self {
        CreatedInvoice {
            invoice_id: data.invoice_id.as_ref().and_then(id_to_string),
            invoice_url: data.invoice_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InvoiceTransactionData {
    #[serde(rename = "TransactionStatus", default)]
    pub transaction_status: Option<String>,
    #[serde(rename = "Error")]
    pub error: Option<String>,
    #[serde(rename = "ErrorCode")]
    pub error_code: Option<String>,
}

/// `Data` payload of a successful `/v2/GetPaymentStatus` call.
#[derive(Debug, Deserialize)]
pub struct PaymentStatusData {
    #[serde(rename = "InvoiceId")]
    pub invoice_id: Option<Value>,
    #[serde(rename = "InvoiceStatus", default)]
    pub invoice_status: Option<String>,
    #[serde(rename = "CustomerReference")]
    pub customer_reference: Option<String>,
    #[serde(rename = "InvoiceTransactions", default)]
    pub invoice_transactions: Vec<InvoiceTransactionData>,
}

impl From<PaymentStatusData> for PaymentStatus {
    fn from(data: PaymentStatusData) -> Self {
        PaymentStatus {
            invoice_id: data.invoice_id.as_ref().and_then(id_to_string),
            invoice_status: data.invoice_status.unwrap_or_default(),
            customer_reference: data.customer_reference.filter(|r| !r.is_empty()),
            transactions: data
                .invoice_transactions
                .into_iter()
                .map(|t| GatewayTransaction {
                    status: t.transaction_status.unwrap_or_default(),
                    error: t.error,
                    error_code: t.error_code,
                })
                .collect(),
        }
    }
}
