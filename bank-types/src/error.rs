//! Error types for the bank ledger service.

/// Domain-level errors (business rule violations).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Amount cannot be negative")]
    NegativeAmount,

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds { available: i64, requested: i64 },

    #[error("Account is locked")]
    AccountLocked,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Entity not found")]
    NotFound,

    /// A unique card number or IBAN already exists.
    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    #[error("Payment has already been sent")]
    AlreadySent,

    /// The stored balance no longer matches the value the caller read.
    #[error("Balance changed concurrently")]
    BalanceConflict,
}

/// Failures of the secret hashing capability other than a plain mismatch.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("Failed to hash secret: {0}")]
    Hash(String),

    #[error("Failed to verify secret: {0}")]
    Verify(String),
}

/// Service-level errors returned by the ledger and payment services.
///
/// Every business rule violation has its own variant so the transport layer
/// can pick a status code without looking at messages.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds { available: i64, requested: i64 },

    #[error("Bad request: {0}")]
    Validation(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    #[error("Account is locked")]
    AccountLocked,

    #[error("Wrong secret value")]
    WrongSecret,

    #[error("Operation requires the admin role")]
    Forbidden,

    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    #[error("Payment has already been sent")]
    AlreadySent,

    #[error("Balance changed concurrently, retry the operation")]
    BalanceConflict,

    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error(transparent)]
    Store(RepoError),
}

impl From<DomainError> for LedgerError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NegativeAmount | DomainError::InvalidAmount => LedgerError::InvalidAmount,
            DomainError::InsufficientFunds {
                available,
                requested,
            } => LedgerError::InsufficientFunds {
                available,
                requested,
            },
            DomainError::AccountLocked => LedgerError::AccountLocked,
            DomainError::ValidationError(msg) => LedgerError::Validation(msg),
        }
    }
}

impl From<RepoError> for LedgerError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => e.into(),
            RepoError::DuplicateIdentifier(what) => LedgerError::DuplicateIdentifier(what),
            RepoError::AlreadySent => LedgerError::AlreadySent,
            RepoError::BalanceConflict => LedgerError::BalanceConflict,
            other => LedgerError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failures_pass_through() {
        let err: LedgerError = RepoError::Database("disk full".into()).into();
        assert!(matches!(err, LedgerError::Store(RepoError::Database(_))));
    }

    #[test]
    fn test_domain_errors_are_lifted() {
        let err: LedgerError = RepoError::Domain(DomainError::AccountLocked).into();
        assert!(matches!(err, LedgerError::AccountLocked));

        let err: LedgerError = RepoError::BalanceConflict.into();
        assert!(matches!(err, LedgerError::BalanceConflict));
    }
}
