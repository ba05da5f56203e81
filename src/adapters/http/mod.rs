//! HTTP adapter: the gateway-facing callback surface.
//!
//! Three fixed endpoints, all unauthenticated at the transport level: the
//! two browser redirect targets and the signature-verified webhook.

pub mod handlers;
pub mod routes;

pub use handlers::PaymentAppState;
pub use routes::payment_routes;
