//! Gateway status vocabulary to local lifecycle mapping.
//!
//! The effective status is the latest entry of the invoice's transaction
//! list when present, otherwise the invoice-level status. Matching is
//! case-insensitive. Anything unrecognized resolves to an error state so a
//! transaction is never left silently unresolved.

/// The gateway's transaction-level success token. Observed on the wire as
/// this exact spelling; confirm against the live gateway token set before
/// extending the list.
const TRANSACTION_SUCCESS_TOKEN: &str = "succss";

/// Local transition derived from one authoritative status fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusOutcome {
    Done,
    Pending,
    Canceled(String),
    Error(String),
}

/// Maps the invoice-level and transaction-level statuses onto a local
/// transition.
///
/// `latest_error` is the error text (or code) of the newest transaction
/// entry, included in the failure message when the status is `failed`.
pub fn map_status(
    invoice_status: &str,
    transaction_status: &str,
    latest_error: Option<&str>,
) -> StatusOutcome {
    let invoice_status = invoice_status.to_lowercase();
    let transaction_status = transaction_status.to_lowercase();

    let either = |values: &[&str]| {
        values.contains(&invoice_status.as_str()) || values.contains(&transaction_status.as_str())
    };

    if invoice_status == "paid" || transaction_status == TRANSACTION_SUCCESS_TOKEN {
        StatusOutcome::Done
    } else if either(&["pending", "initiated"]) {
        StatusOutcome::Pending
    } else if either(&["expired", "canceled"]) {
        let observed = if invoice_status.is_empty() {
            &transaction_status
        } else {
            &invoice_status
        };
        StatusOutcome::Canceled(format!("Payment was {observed}."))
    } else if either(&["failed"]) {
        StatusOutcome::Error(format!(
            "Payment failed. {}",
            latest_error.unwrap_or_default()
        ))
    } else {
        let observed = if invoice_status.is_empty() {
            if transaction_status.is_empty() {
                "unknown"
            } else {
                &transaction_status
            }
        } else {
            &invoice_status
        };
        StatusOutcome::Error(format!("Received unknown payment status: {observed}"))
    }
}
