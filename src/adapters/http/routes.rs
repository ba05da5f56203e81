//! Router for the payment callback endpoints.
//!
//! The paths are fixed: they are baked into every invoice created at the
//! gateway as its callback and webhook URLs, so changing them orphans
//! in-flight payments.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{handle_payment_error, handle_return, handle_webhook, PaymentAppState};

/// Payment callback routes.
///
/// - `GET /payment/myfatoorah/return` - browser redirect after payment
/// - `GET /payment/myfatoorah/error` - browser redirect after failure
/// - `POST /payment/myfatoorah/webhook` - signature-verified event delivery
pub fn payment_routes() -> Router<PaymentAppState> {
    Router::new()
        .route("/payment/myfatoorah/return", get(handle_return))
        .route("/payment/myfatoorah/error", get(handle_payment_error))
        .route("/payment/myfatoorah/webhook", post(handle_webhook))
}
