//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod auth;
mod identity;
mod secret;
mod store;

pub use auth::{ApiKeyStore, AuthVerifier};
pub use identity::IdentifierGenerator;
pub use secret::SecretVerifier;
pub use store::{AccountStore, BankRepository, MessageLogStore, PaymentStore};
