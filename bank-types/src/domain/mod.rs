//! Domain models for the bank ledger service.

pub mod account;
pub mod api_key;
pub mod message_log;
pub mod money;
pub mod payment;

pub use account::{Account, AccountId, AccountStatus, CardNumber, Iban, SecretHash};
pub use api_key::{ApiKey, ApiKeyId, Principal, Role};
pub use message_log::{MessageLog, MessageLogId};
pub use money::Money;
pub use payment::{AccountSnapshot, Payment, PaymentId, PaymentStatus, SettlementCommand};
