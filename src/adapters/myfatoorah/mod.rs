//! MyFatoorah gateway adapter.
//!
//! Implements the `GatewayApi` port against the MyFatoorah v2 REST API
//! (`/v2/SendPayment` and `/v2/GetPaymentStatus`).

pub mod client;
pub mod types;

pub use client::MyFatoorahClient;
