//! Domain layer: gateway-independent payment types and logic.

pub mod errors;
pub mod notification;
pub mod signature;
pub mod status;
pub mod transaction;

pub use errors::{GatewayError, InvoiceError, LocateError, StoreError};
pub use notification::NotificationPayload;
pub use status::StatusOutcome;
pub use transaction::{CustomerAddress, CustomerDetails, OrderLine, Transaction, TransactionState};
