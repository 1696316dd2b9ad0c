//! SQLite repository adapter.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};
use std::str::FromStr;

use bank_types::{
    Account, AccountStatus, AccountStore, ApiKey, ApiKeyStore, AuthVerifier, CardNumber,
    DomainError, Iban, MessageLog, MessageLogStore, Money, Payment, PaymentId, PaymentStatus,
    PaymentStore, Principal, RepoError, Role, SettlementCommand,
};

use crate::security::{generate_api_key, hash_api_key, verify_api_key};
use crate::types::{
    DbAccount, DbAccountState, DbApiKey, DbMessageLog, DbPayment, format_timestamp,
};

const ACCOUNT_COLUMNS: &str = "id, client, tax_id, card_number, iban, secret_hash, balance, status, created_at, updated_at";
const PAYMENT_COLUMNS: &str = "id, status, from_client, from_tax_id, from_iban, from_card_number, description, to_iban, to_client, amount, created_at, updated_at";

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to `:memory:` opens its own database, so an
        // in-memory pool is pinned to a single connection that never expires.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        let repo = Self { pool };
        repo.create_schema().await?;
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema. Safe to run repeatedly.
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        let ddl = include_str!("../migrations/0001_create_ledger_tables.sql");
        sqlx::raw_sql(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        let ddl_logs = include_str!("../migrations/0002_create_message_logs_and_api_keys.sql");
        sqlx::raw_sql(ddl_logs)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(())
    }
}

fn now() -> String {
    format_timestamp(chrono::Utc::now())
}

fn map_insert_error(err: sqlx::Error) -> RepoError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::DuplicateIdentifier(db.message().to_string())
        }
        _ => RepoError::Database(err.to_string()),
    }
}

/// Works out why a balance swap touched no rows.
async fn explain_missed_swap<'e, E>(executor: E, card: &CardNumber) -> RepoError
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row: Result<Option<DbAccountState>, _> =
        sqlx::query_as(r#"SELECT balance, status FROM accounts WHERE card_number = ?"#)
            .bind(card.as_str())
            .fetch_optional(executor)
            .await;

    match row {
        Ok(None) => RepoError::NotFound,
        Ok(Some(state)) if state.status == AccountStatus::Locked.as_str() => {
            RepoError::Domain(DomainError::AccountLocked)
        }
        Ok(Some(state)) => {
            tracing::debug!(card = %card, stored = state.balance, "stale balance swap");
            RepoError::BalanceConflict
        }
        Err(e) => RepoError::Database(e.to_string()),
    }
}

/// Compare-and-swap of an active account's balance.
async fn swap_balance<'e, E>(
    executor: E,
    card: &CardNumber,
    expected: Money,
    new_balance: Money,
) -> Result<u64, RepoError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"UPDATE accounts SET balance = ?, updated_at = ?
           WHERE card_number = ? AND balance = ? AND status = 'ACTIVE'"#,
    )
    .bind(new_balance.amount())
    .bind(now())
    .bind(card.as_str())
    .bind(expected.amount())
    .execute(executor)
    .await
    .map_err(|e| RepoError::Database(e.to_string()))?;

    Ok(result.rows_affected())
}

/// Moves a PREPARED payment to SENT, returning the number of rows touched.
async fn flip_to_sent<'e, E>(executor: E, id: PaymentId) -> Result<u64, RepoError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"UPDATE payments SET status = ?, updated_at = ? WHERE id = ? AND status = ?"#,
    )
    .bind(PaymentStatus::Sent.as_str())
    .bind(now())
    .bind(id.to_string())
    .bind(PaymentStatus::Prepared.as_str())
    .execute(executor)
    .await
    .map_err(|e| RepoError::Database(e.to_string()))?;

    Ok(result.rows_affected())
}

/// Works out why a PREPARED → SENT flip touched no rows.
async fn explain_missed_flip<'e, E>(executor: E, id: PaymentId) -> RepoError
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row: Result<Option<(String,)>, _> =
        sqlx::query_as(r#"SELECT status FROM payments WHERE id = ?"#)
            .bind(id.to_string())
            .fetch_optional(executor)
            .await;

    match row {
        Ok(None) => RepoError::NotFound,
        Ok(Some(_)) => RepoError::AlreadySent,
        Err(e) => RepoError::Database(e.to_string()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Account store
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl AccountStore for SqliteRepo {
    async fn create_account(&self, account: Account) -> Result<Account, RepoError> {
        sqlx::query(
            r#"INSERT INTO accounts (id, client, tax_id, card_number, iban, secret_hash, balance, status, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(account.id.to_string())
        .bind(&account.client)
        .bind(account.tax_id)
        .bind(account.card_number.as_str())
        .bind(account.iban.as_str())
        .bind(account.secret_hash.as_str())
        .bind(account.balance.amount())
        .bind(account.status.as_str())
        .bind(format_timestamp(account.created_at))
        .bind(format_timestamp(account.updated_at))
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(account)
    }

    async fn get_by_card(&self, card: &CardNumber) -> Result<Option<Account>, RepoError> {
        let row: Option<DbAccount> = sqlx::query_as(&format!(
            "SELECT {} FROM accounts WHERE card_number = ?",
            ACCOUNT_COLUMNS
        ))
        .bind(card.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbAccount::into_domain).transpose()
    }

    async fn get_by_iban(&self, iban: &Iban) -> Result<Option<Account>, RepoError> {
        let row: Option<DbAccount> = sqlx::query_as(&format!(
            "SELECT {} FROM accounts WHERE iban = ?",
            ACCOUNT_COLUMNS
        ))
        .bind(iban.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbAccount::into_domain).transpose()
    }

    async fn update_balance(
        &self,
        card: &CardNumber,
        expected: Money,
        new_balance: Money,
    ) -> Result<(), RepoError> {
        if swap_balance(&self.pool, card, expected, new_balance).await? == 0 {
            return Err(explain_missed_swap(&self.pool, card).await);
        }
        Ok(())
    }

    async fn update_status(
        &self,
        card: &CardNumber,
        status: AccountStatus,
    ) -> Result<(), RepoError> {
        let result =
            sqlx::query(r#"UPDATE accounts SET status = ?, updated_at = ? WHERE card_number = ?"#)
                .bind(status.as_str())
                .bind(now())
                .bind(card.as_str())
                .execute(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Payment store
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentStore for SqliteRepo {
    async fn create_payment(&self, payment: Payment) -> Result<Payment, RepoError> {
        sqlx::query(
            r#"INSERT INTO payments (id, status, from_client, from_tax_id, from_iban, from_card_number, description, to_iban, to_client, amount, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(payment.id.to_string())
        .bind(payment.status.as_str())
        .bind(&payment.source.client)
        .bind(payment.source.tax_id)
        .bind(payment.source.iban.as_str())
        .bind(payment.source.card_number.as_str())
        .bind(&payment.description)
        .bind(payment.to_iban.as_str())
        .bind(&payment.to_client)
        .bind(payment.amount.amount())
        .bind(format_timestamp(payment.created_at))
        .bind(format_timestamp(payment.updated_at))
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(payment)
    }

    async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        let row: Option<DbPayment> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE id = ?",
            PAYMENT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbPayment::into_domain).transpose()
    }

    async fn mark_sent(&self, id: PaymentId) -> Result<(), RepoError> {
        if flip_to_sent(&self.pool, id).await? == 0 {
            return Err(explain_missed_flip(&self.pool, id).await);
        }
        Ok(())
    }

    async fn settle(&self, command: &SettlementCommand) -> Result<(), RepoError> {
        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        // Returning early drops `db_tx`, which rolls the transaction back.
        if flip_to_sent(&mut *db_tx, command.payment_id).await? == 0 {
            return Err(explain_missed_flip(&mut *db_tx, command.payment_id).await);
        }

        let swapped = swap_balance(
            &mut *db_tx,
            &command.card_number,
            command.expected_balance,
            command.new_balance,
        )
        .await?;
        if swapped == 0 {
            return Err(explain_missed_swap(&mut *db_tx, &command.card_number).await);
        }

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        tracing::debug!(payment_id = %command.payment_id, "payment settled");
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Message log store
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl MessageLogStore for SqliteRepo {
    async fn append(&self, entry: MessageLog) -> Result<MessageLog, RepoError> {
        sqlx::query(
            r#"INSERT INTO message_logs (id, client, message, created_at) VALUES (?, ?, ?, ?)"#,
        )
        .bind(entry.id.as_uuid().to_string())
        .bind(&entry.client)
        .bind(&entry.message)
        .bind(format_timestamp(entry.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(entry)
    }

    async fn list_for_client(&self, client: &str) -> Result<Vec<MessageLog>, RepoError> {
        let rows: Vec<DbMessageLog> = sqlx::query_as(
            r#"SELECT id, client, message, created_at FROM message_logs
               WHERE client = ? ORDER BY created_at DESC, rowid DESC"#,
        )
        .bind(client)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbMessageLog::into_domain).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// API keys
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl AuthVerifier for SqliteRepo {
    async fn verify(&self, token: &str) -> Result<Option<Principal>, RepoError> {
        let row: Option<DbApiKey> = sqlx::query_as(
            r#"SELECT id, client, role, key_hash, created_at FROM api_keys WHERE key_hash = ?"#,
        )
        .bind(hash_api_key(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        if !verify_api_key(token, &row.key_hash) {
            return Ok(None);
        }
        Ok(Some(row.into_domain()?.principal()))
    }
}

#[async_trait]
impl ApiKeyStore for SqliteRepo {
    async fn issue_api_key(&self, client: &str, role: Role) -> Result<(ApiKey, String), RepoError> {
        if client.trim().is_empty() {
            return Err(RepoError::Domain(DomainError::ValidationError(
                "Client name cannot be empty".into(),
            )));
        }

        let raw_key = generate_api_key();
        let key = ApiKey::new(client.to_string(), role, hash_api_key(&raw_key));

        sqlx::query(
            r#"INSERT INTO api_keys (id, client, role, key_hash, created_at) VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(key.id.as_uuid().to_string())
        .bind(&key.client)
        .bind(key.role.as_str())
        .bind(&key.key_hash)
        .bind(format_timestamp(key.created_at))
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok((key, raw_key))
    }

    async fn count_api_keys(&self) -> Result<i64, RepoError> {
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM api_keys"#)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))
    }
}
