//! Webhook signature verification.
//!
//! MyFatoorah signs each webhook body with HMAC-SHA256 over the raw bytes,
//! hex-encoded into the `MyFatoorah-Signature` header. Verification uses a
//! constant-time comparison to avoid leaking the expected digest through
//! timing.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Verifies the HMAC-SHA256 signature of a webhook body.
///
/// Returns `false` when `secret` is empty: a missing webhook secret is an
/// operator misconfiguration and must never be treated as "no signature
/// required". A missing or malformed signature also fails verification.
pub fn verify_webhook_signature(secret: &str, raw_body: &[u8], supplied_signature: &str) -> bool {
    if secret.is_empty() {
        tracing::warn!("rejecting webhook: no webhook secret configured");
        return false;
    }

    let expected = compute_signature(secret, raw_body);
    let valid = constant_time_eq(expected.as_bytes(), supplied_signature.as_bytes());

    if valid {
        tracing::info!("webhook signature verification passed");
    } else {
        tracing::warn!(
            expected = %truncate(&expected),
            got = %truncate(supplied_signature),
            "webhook signature verification failed"
        );
    }

    valid
}

/// Hex-encoded HMAC-SHA256 of `raw_body` keyed by `secret`.
pub fn compute_signature(secret: &str, raw_body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key size");
    mac.update(raw_body);
    hex::encode(mac.finalize().into_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

// Signatures are never logged in full; 16 chars is enough to correlate.
// Supplied values come from an attacker-controlled header and can contain
// multibyte characters, so the cut must land on a char boundary.
fn truncate(s: &str) -> &str {
    match s.char_indices().nth(16) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
