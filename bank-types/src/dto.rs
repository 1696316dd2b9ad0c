//! Data Transfer Objects (DTOs) for requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{
    Account, AccountId, AccountStatus, CardNumber, Iban, Money, PaymentId, PaymentStatus, Role,
};

// ─────────────────────────────────────────────────────────────────────────────
// Account DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to open a new account for the calling client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    /// Individual tax number of the owner
    pub tax_id: i64,
    /// Secret protecting status changes and payments
    pub secret: String,
}

/// Public view of an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: AccountId,
    pub client: String,
    pub card_number: CardNumber,
    pub iban: Iban,
    /// Balance in minor units
    pub balance: Money,
    pub status: AccountStatus,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            client: account.client,
            card_number: account.card_number,
            iban: account.iban,
            balance: account.balance,
            status: account.status,
        }
    }
}

/// Request to top up an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopUpRequest {
    pub card_number: CardNumber,
    /// Amount in minor units, must be positive
    pub amount: i64,
}

/// Request to lock or unlock an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeStatusRequest {
    pub card_number: CardNumber,
    /// Not required for admins
    #[serde(default)]
    pub secret: String,
}

/// Kind of a status change outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusOutcome {
    Changed,
    AlreadyInState,
    NotOwner,
}

/// Response to a lock or unlock request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub outcome: StatusOutcome,
    /// Current status, omitted when the caller does not own the account
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountStatus>,
    pub message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Payment DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to prepare a payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    pub from_iban: Iban,
    pub to_iban: Iban,
    pub to_client: String,
    #[serde(default)]
    pub description: String,
    /// Amount in minor units, must be positive
    pub amount: i64,
}

/// Request to send a prepared payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendPaymentRequest {
    pub secret: String,
}

/// Response after a payment was sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementResponse {
    pub payment_id: PaymentId,
    pub status: PaymentStatus,
    /// Source balance after the debit, in minor units
    pub balance: Money,
    pub message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// API key DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to issue an API key for a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueApiKeyRequest {
    pub client: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Client
}

/// Response carrying a freshly issued API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyResponse {
    /// The raw key (shown only once)
    pub api_key: String,
    pub client: String,
    pub role: Role,
    pub message: String,
}
