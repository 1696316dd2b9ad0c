//! Bank account domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::Money;
use crate::error::DomainError;

/// Unique identifier for an Account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Creates a new random AccountId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an AccountId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 16-digit payment card number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardNumber(String);

impl CardNumber {
    pub const LEN: usize = 16;

    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.len() != Self::LEN || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::ValidationError(format!(
                "Card number must be {} digits",
                Self::LEN
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CardNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CardNumber::new(value)
    }
}

impl From<CardNumber> for String {
    fn from(value: CardNumber) -> Self {
        value.0
    }
}

impl std::fmt::Display for CardNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CardNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CardNumber::new(s)
    }
}

/// International Bank Account Number.
///
/// Only the shape is checked: two-letter country code, then 13 to 32
/// alphanumeric characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Iban(String);

impl Iban {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value: String = value.into();
        let value = value.replace(' ', "").to_ascii_uppercase();
        let valid_country =
            value.len() >= 2 && value.bytes().take(2).all(|b| b.is_ascii_uppercase());
        let valid_body = (15..=34).contains(&value.len())
            && value.bytes().all(|b| b.is_ascii_alphanumeric());
        if !valid_country || !valid_body {
            return Err(DomainError::ValidationError(format!(
                "Invalid IBAN: {}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Iban {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Iban::new(value)
    }
}

impl From<Iban> for String {
    fn from(value: Iban) -> Self {
        value.0
    }
}

impl std::fmt::Display for Iban {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One-way hash of an account secret. The raw secret is never stored.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretHash(String);

impl SecretHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretHash(..)")
    }
}

/// Account status. `Locked` is the reversible soft-disable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountStatus {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "LOCK")]
    Locked,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Locked => "LOCK",
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(AccountStatus::Active),
            "LOCK" => Ok(AccountStatus::Locked),
            other => Err(DomainError::ValidationError(format!(
                "Unknown account status: {}",
                other
            ))),
        }
    }
}

/// A client's bank account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: AccountId,
    /// Name of the owning client
    pub client: String,
    /// Individual tax number of the owner
    pub tax_id: i64,
    pub card_number: CardNumber,
    pub iban: Iban,
    #[serde(skip)]
    pub secret_hash: SecretHash,
    pub balance: Money,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Opens a new active account with zero balance.
    ///
    /// # Validation
    /// - Client name cannot be empty
    pub fn open(
        client: String,
        tax_id: i64,
        card_number: CardNumber,
        iban: Iban,
        secret_hash: SecretHash,
    ) -> Result<Self, DomainError> {
        if client.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Client name cannot be empty".into(),
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: AccountId::new(),
            client,
            tax_id,
            card_number,
            iban,
            secret_hash,
            balance: Money::zero(),
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_locked(&self) -> bool {
        self.status == AccountStatus::Locked
    }

    pub fn is_owned_by(&self, client: &str) -> bool {
        self.client == client
    }

    /// Balance after crediting `amount`. Locked accounts reject value movement.
    pub fn balance_after_credit(&self, amount: Money) -> Result<Money, DomainError> {
        if self.is_locked() {
            return Err(DomainError::AccountLocked);
        }
        self.balance.checked_add(amount)
    }

    /// Balance after debiting `amount`; never negative.
    pub fn balance_after_debit(&self, amount: Money) -> Result<Money, DomainError> {
        if self.is_locked() {
            return Err(DomainError::AccountLocked);
        }
        self.balance.checked_sub(amount)
    }

    /// Message log line for a freshly opened account.
    pub fn audit_message(&self) -> String {
        format!("Successfully created bank account {}", self.card_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
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
    fn test_account_opening() {
        let account = account();
        assert_eq!(account.client, "Alice");
        assert_eq!(account.balance.amount(), 0);
        assert_eq!(account.status, AccountStatus::Active);
    }

    #[test]
    fn test_empty_client_fails() {
        let result = Account::open(
            " ".to_string(),
            1,
            CardNumber::new("4000123412341234").unwrap(),
            Iban::new("UA213223130000026007233566001").unwrap(),
            SecretHash::new("hash"),
        );
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn test_locked_account_rejects_movement() {
        let mut account = account();
        account.status = AccountStatus::Locked;
        let amount = Money::new(100).unwrap();
        assert_eq!(
            account.balance_after_credit(amount),
            Err(DomainError::AccountLocked)
        );
        assert_eq!(
            account.balance_after_debit(amount),
            Err(DomainError::AccountLocked)
        );
    }

    #[test]
    fn test_debit_never_goes_negative() {
        let mut account = account();
        account.balance = Money::new(50).unwrap();
        assert!(matches!(
            account.balance_after_debit(Money::new(51).unwrap()),
            Err(DomainError::InsufficientFunds { .. })
        ));
        assert_eq!(
            account.balance_after_debit(Money::new(50).unwrap()),
            Ok(Money::zero())
        );
    }

    #[test]
    fn test_card_number_shape() {
        assert!(CardNumber::new("123").is_err());
        assert!(CardNumber::new("400012341234123a").is_err());
        assert!(CardNumber::new("4000123412341234").is_ok());
    }

    #[test]
    fn test_iban_is_normalized() {
        let iban = Iban::new("ua21 3223 1300 0002 6007 2335 6600 1").unwrap();
        assert_eq!(iban.as_str(), "UA213223130000026007233566001");
        assert!(Iban::new("12345").is_err());
    }

    #[test]
    fn test_secret_hash_is_not_serialized() {
        let json = serde_json::to_value(account()).unwrap();
        assert!(json.get("secret_hash").is_none());
        assert_eq!(json["status"], "ACTIVE");
    }
}
