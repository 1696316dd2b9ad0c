//! Payment domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::{Account, CardNumber, Iban};
use super::money::Money;
use crate::error::DomainError;

/// Unique identifier for a Payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(Uuid);

impl PaymentId {
    /// Creates a new random PaymentId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a PaymentId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PaymentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Lifecycle of a payment. `Sent` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Intent recorded, no funds moved
    Prepared,
    /// Funds debited from the source account
    Sent,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Prepared => "PREPARED",
            PaymentStatus::Sent => "SENT",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PREPARED" => Ok(PaymentStatus::Prepared),
            "SENT" => Ok(PaymentStatus::Sent),
            other => Err(DomainError::ValidationError(format!(
                "Unknown payment status: {}",
                other
            ))),
        }
    }
}

/// Source account details captured when the payment is created.
///
/// This is a snapshot, later changes to the account are not reflected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub client: String,
    pub tax_id: i64,
    pub iban: Iban,
    pub card_number: CardNumber,
}

impl AccountSnapshot {
    pub fn of(account: &Account) -> Self {
        Self {
            client: account.client.clone(),
            tax_id: account.tax_id,
            iban: account.iban.clone(),
            card_number: account.card_number.clone(),
        }
    }
}

/// A transfer from one of our accounts to a destination IBAN.
///
/// The amount is fixed at creation and never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    pub status: PaymentStatus,
    /// Source account snapshot
    pub source: AccountSnapshot,
    pub description: String,
    /// Destination IBAN
    pub to_iban: Iban,
    /// Destination display name
    pub to_client: String,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Prepares a payment from `source`. No funds move.
    pub fn prepare(
        source: &Account,
        to_iban: Iban,
        to_client: String,
        description: String,
        amount: Money,
    ) -> Result<Self, DomainError> {
        if amount.is_zero() {
            return Err(DomainError::InvalidAmount);
        }
        if to_client.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Destination name cannot be empty".into(),
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: PaymentId::new(),
            status: PaymentStatus::Prepared,
            source: AccountSnapshot::of(source),
            description,
            to_iban,
            to_client,
            amount,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_sent(&self) -> bool {
        self.status == PaymentStatus::Sent
    }

    /// Message log line for a freshly prepared payment.
    pub fn audit_message(&self) -> String {
        format!(
            "Successfully created payment from {} to {}",
            self.source.client, self.to_client
        )
    }
}

/// Atomic settlement instruction handed to the payment store.
///
/// The store flips the payment to SENT and swaps the source balance from
/// `expected_balance` to `new_balance` in one transaction, or does neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementCommand {
    pub payment_id: PaymentId,
    pub card_number: CardNumber,
    pub expected_balance: Money,
    pub new_balance: Money,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SecretHash;

    fn source() -> Account {
        Account::open(
            "Alice".to_string(),
            12345,
            CardNumber::new("4000123412341234").unwrap(),
            Iban::new("UA213223130000026007233566001").unwrap(),
            SecretHash::new("hash"),
        )
        .unwrap()
    }

    #[test]
    fn test_prepare_snapshots_source() {
        let account = source();
        let payment = Payment::prepare(
            &account,
            Iban::new("UA999999999999999999999999999").unwrap(),
            "Bob".to_string(),
            "rent".to_string(),
            Money::new(3_000).unwrap(),
        )
        .unwrap();

        assert_eq!(payment.status, PaymentStatus::Prepared);
        assert_eq!(payment.source.client, "Alice");
        assert_eq!(payment.source.iban, account.iban);
        assert_eq!(payment.source.card_number, account.card_number);
        assert_eq!(payment.audit_message(), "Successfully created payment from Alice to Bob");
    }

    #[test]
    fn test_prepare_rejects_zero_amount() {
        let result = Payment::prepare(
            &source(),
            Iban::new("UA999999999999999999999999999").unwrap(),
            "Bob".to_string(),
            String::new(),
            Money::zero(),
        );
        assert!(matches!(result, Err(DomainError::InvalidAmount)));
    }
}
