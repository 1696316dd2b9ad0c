//! # Bank Types
//!
//! Domain types and port traits for the bank ledger and payment service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Money, Account, Payment, MessageLog)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain, repository and service error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Account, AccountId, AccountSnapshot, AccountStatus, ApiKey, ApiKeyId, CardNumber, Iban,
    MessageLog, MessageLogId, Money, Payment, PaymentId, PaymentStatus, Principal, Role,
    SecretHash, SettlementCommand,
};
pub use dto::*;
pub use error::{DomainError, LedgerError, RepoError, SecretError};
pub use ports::{
    AccountStore, ApiKeyStore, AuthVerifier, BankRepository, IdentifierGenerator,
    MessageLogStore, PaymentStore, SecretVerifier,
};
