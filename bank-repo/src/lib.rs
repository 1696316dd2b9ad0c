//! # Bank Repository
//!
//! Concrete adapters for the bank ledger service:
//! - `sqlite` - SQLite implementation of every store port and of `AuthVerifier`
//! - `secrets` - bcrypt based `SecretVerifier`
//! - `identifiers` - random card number / IBAN generator
//! - `security` - API key generation and hashing

pub mod identifiers;
pub mod secrets;
pub mod security;
pub mod sqlite;

mod types;

#[cfg(test)]
mod sqlite_tests;

pub use identifiers::RandomIdentifierGenerator;
pub use secrets::{BcryptVerifier, SecretConfig};
pub use sqlite::SqliteRepo;

/// Build and initialize a repository from a database URL.
///
/// This function:
/// 1. Connects to the database
/// 2. Runs migrations to create tables
/// 3. Returns a ready-to-use `SqliteRepo`
///
/// # Examples
///
/// ```ignore
/// let repo = build_repo("sqlite://data/bank.db?mode=rwc").await?;
/// ```
pub async fn build_repo(database_url: &str) -> anyhow::Result<SqliteRepo> {
    SqliteRepo::new(database_url).await
}
