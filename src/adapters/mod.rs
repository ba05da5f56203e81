//! Adapters implementing the ports against concrete infrastructure.

pub mod http;
pub mod memory;
pub mod myfatoorah;

pub use http::{payment_routes, PaymentAppState};
pub use memory::{InMemoryTransactionStore, StaticProviderRegistry};
pub use myfatoorah::MyFatoorahClient;
