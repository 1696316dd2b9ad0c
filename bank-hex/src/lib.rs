//! # Bank Hex
//!
//! Application services and HTTP adapter for the bank ledger.
//!
//! ## Architecture
//!
//! - `policy` - Authorization decisions shared by both services
//! - `ledger` - Account opening, top-ups, lock/unlock
//! - `payments` - Payment creation and settlement
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! Services are generic over the port traits, so the SQLite adapter and
//! in-memory test doubles plug in the same way.

pub mod inbound;
pub mod ledger;
pub mod payments;
pub mod policy;

mod lookup;


pub use ledger::{LedgerService, StatusChange, TopUpReceipt};
pub use payments::{PaymentService, Settlement, SettlementQuote};
pub use policy::{Access, AuthorizationPolicy};
