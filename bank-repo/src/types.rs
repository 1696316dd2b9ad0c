//! Database row types and their conversion into domain types.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use bank_types::{
    Account, AccountId, AccountSnapshot, AccountStatus, ApiKey, ApiKeyId, CardNumber, Iban,
    MessageLog, MessageLogId, Money, Payment, PaymentId, PaymentStatus, RepoError, Role,
    SecretHash,
};

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

/// Account row from database.
#[derive(FromRow)]
pub struct DbAccount {
    pub id: String,
    pub client: String,
    pub tax_id: i64,
    pub card_number: String,
    pub iban: String,
    pub secret_hash: String,
    pub balance: i64,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Payment row from database.
#[derive(FromRow)]
pub struct DbPayment {
    pub id: String,
    pub status: String,
    pub from_client: String,
    pub from_tax_id: i64,
    pub from_iban: String,
    pub from_card_number: String,
    pub description: String,
    pub to_iban: String,
    pub to_client: String,
    pub amount: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Message log row from database.
#[derive(FromRow)]
pub struct DbMessageLog {
    pub id: String,
    pub client: String,
    pub message: String,
    pub created_at: String,
}

/// API key row from database.
#[derive(FromRow)]
pub struct DbApiKey {
    pub id: String,
    pub client: String,
    pub role: String,
    pub key_hash: String,
    pub created_at: String,
}

/// Status and balance of an account, used to explain a missed balance swap.
#[derive(FromRow)]
pub struct DbAccountState {
    pub balance: i64,
    pub status: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Timestamps are stored as fixed-width RFC 3339 so they sort as text.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepoError::Database(e.to_string()))
}

pub fn parse_uuid(s: &str) -> Result<Uuid, RepoError> {
    Uuid::parse_str(s).map_err(|e| RepoError::Database(e.to_string()))
}

fn corrupt<E: std::fmt::Display>(e: E) -> RepoError {
    RepoError::Database(format!("Corrupt row: {}", e))
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain conversion
// ─────────────────────────────────────────────────────────────────────────────

impl DbAccount {
    /// Convert database row to domain Account.
    pub fn into_domain(self) -> Result<Account, RepoError> {
        Ok(Account {
            id: AccountId::from_uuid(parse_uuid(&self.id)?),
            client: self.client,
            tax_id: self.tax_id,
            card_number: CardNumber::new(self.card_number).map_err(corrupt)?,
            iban: Iban::new(self.iban).map_err(corrupt)?,
            secret_hash: SecretHash::new(self.secret_hash),
            balance: Money::new(self.balance).map_err(corrupt)?,
            status: self.status.parse::<AccountStatus>().map_err(corrupt)?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

impl DbPayment {
    /// Convert database row to domain Payment.
    pub fn into_domain(self) -> Result<Payment, RepoError> {
        Ok(Payment {
            id: PaymentId::from_uuid(parse_uuid(&self.id)?),
            status: self.status.parse::<PaymentStatus>().map_err(corrupt)?,
            source: AccountSnapshot {
                client: self.from_client,
                tax_id: self.from_tax_id,
                iban: Iban::new(self.from_iban).map_err(corrupt)?,
                card_number: CardNumber::new(self.from_card_number).map_err(corrupt)?,
            },
            description: self.description,
            to_iban: Iban::new(self.to_iban).map_err(corrupt)?,
            to_client: self.to_client,
            amount: Money::new(self.amount).map_err(corrupt)?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

impl DbMessageLog {
    pub fn into_domain(self) -> Result<MessageLog, RepoError> {
        Ok(MessageLog {
            id: MessageLogId::from_uuid(parse_uuid(&self.id)?),
            client: self.client,
            message: self.message,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

impl DbApiKey {
    pub fn into_domain(self) -> Result<ApiKey, RepoError> {
        Ok(ApiKey {
            id: ApiKeyId::from_uuid(parse_uuid(&self.id)?),
            client: self.client,
            role: self.role.parse::<Role>().map_err(corrupt)?,
            key_hash: self.key_hash,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}
