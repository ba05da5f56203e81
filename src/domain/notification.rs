//! Ephemeral notification payloads from redirects and webhooks.
//!
//! A notification carries up to three identifiers of decreasing reliability:
//! the local reference (strong), the gateway invoice id (medium), and the
//! session-scoped payment id (weak). Redirect callbacks only ever carry the
//! weak one. Payloads are built per request and discarded after
//! reconciliation; nothing here is persisted.

/// Identifiers extracted from one inbound notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationPayload {
    /// Gateway's transient payment-session id (weak identifier).
    pub payment_id: Option<String>,

    /// Gateway's persistent invoice id (medium identifier); equals the
    /// transaction's `provider_reference` once set.
    pub invoice_id: Option<String>,

    /// Local transaction reference echoed back by the gateway
    /// (strong identifier).
    pub customer_reference: Option<String>,
}

impl NotificationPayload {
    /// Payload synthesized from a browser redirect, which only carries the
    /// weak `paymentId` query parameter.
    pub fn from_redirect(payment_id: impl Into<String>) -> Self {
        Self {
            payment_id: Some(payment_id.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_payload_carries_only_payment_id() {
        let payload = NotificationPayload::from_redirect("0706...4900");
        assert_eq!(payload.payment_id.as_deref(), Some("0706...4900"));
        assert!(payload.invoice_id.is_none());
        assert!(payload.customer_reference.is_none());
    }
}
