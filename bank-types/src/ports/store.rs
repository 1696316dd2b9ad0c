//! Repository port traits.
//!
//! These are the primary ports in our hexagonal architecture.
//! Adapters (SQLite, in-memory test doubles) implement them.

use crate::domain::{
    Account, AccountStatus, CardNumber, Iban, MessageLog, Money, Payment, PaymentId,
    SettlementCommand,
};
use crate::error::RepoError;

use super::auth::{ApiKeyStore, AuthVerifier};

/// Persistence of bank accounts.
///
/// Balance writes MUST be compare-and-swap: the write only applies when the
/// stored balance still equals the value the caller read.
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync + 'static {
    /// Persists a new account.
    ///
    /// Fails with `RepoError::DuplicateIdentifier` when the card number or
    /// IBAN is already taken.
    async fn create_account(&self, account: Account) -> Result<Account, RepoError>;

    /// Gets an account by card number.
    async fn get_by_card(&self, card: &CardNumber) -> Result<Option<Account>, RepoError>;

    /// Gets an account by IBAN.
    async fn get_by_iban(&self, iban: &Iban) -> Result<Option<Account>, RepoError>;

    /// Swaps the balance of an ACTIVE account from `expected` to `new_balance`.
    ///
    /// Fails with `RepoError::BalanceConflict` if the stored balance differs
    /// from `expected`, `DomainError::AccountLocked` if the account is locked
    /// and `RepoError::NotFound` if it does not exist.
    async fn update_balance(
        &self,
        card: &CardNumber,
        expected: Money,
        new_balance: Money,
    ) -> Result<(), RepoError>;

    /// Sets the account status.
    async fn update_status(&self, card: &CardNumber, status: AccountStatus)
    -> Result<(), RepoError>;
}

/// Persistence of payments.
#[async_trait::async_trait]
pub trait PaymentStore: Send + Sync + 'static {
    /// Persists a new payment.
    async fn create_payment(&self, payment: Payment) -> Result<Payment, RepoError>;

    /// Gets a payment by ID.
    async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>, RepoError>;

    /// Moves a payment from PREPARED to SENT.
    ///
    /// Fails with `RepoError::AlreadySent` when the payment is already SENT.
    async fn mark_sent(&self, id: PaymentId) -> Result<(), RepoError>;

    /// Marks the payment SENT and swaps the source balance in one transaction.
    ///
    /// Either both writes happen or neither does.
    async fn settle(&self, command: &SettlementCommand) -> Result<(), RepoError>;
}

/// Persistence of the audit message log.
#[async_trait::async_trait]
pub trait MessageLogStore: Send + Sync + 'static {
    async fn append(&self, entry: MessageLog) -> Result<MessageLog, RepoError>;

    /// Lists entries for a client, newest first.
    async fn list_for_client(&self, client: &str) -> Result<Vec<MessageLog>, RepoError>;
}

/// Everything the HTTP adapter needs from a single storage backend.
pub trait BankRepository:
    AccountStore + PaymentStore + MessageLogStore + AuthVerifier + ApiKeyStore
{
}

impl<T> BankRepository for T where
    T: AccountStore + PaymentStore + MessageLogStore + AuthVerifier + ApiKeyStore
{
}
