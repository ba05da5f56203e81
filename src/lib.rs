//! Payflow - MyFatoorah hosted-payment integration
//!
//! This crate connects the order/payment service to the MyFatoorah gateway:
//! invoice creation, customer redirects, and webhook-driven status
//! reconciliation against the gateway as the system of record.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
