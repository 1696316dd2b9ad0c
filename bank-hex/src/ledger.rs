//! Ledger Application Service
//!
//! Account opening, top-ups and lock/unlock. Balance writes go through the
//! store's compare-and-swap, so a concurrent write surfaces as
//! `LedgerError::BalanceConflict` instead of a lost update.

use std::sync::Arc;

use bank_types::{
    Account, AccountStatus, AccountStore, CardNumber, ChangeStatusRequest, CreateAccountRequest,
    Iban, IdentifierGenerator, LedgerError, Money, Principal, SecretVerifier, StatusOutcome,
    TopUpRequest,
};

use crate::lookup;
use crate::policy::{Access, AuthorizationPolicy};

/// Outcome of a lock or unlock request.
///
/// Only `Changed` wrote to the store. The other two are successful results
/// carrying a message for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Changed(AccountStatus),
    AlreadyInState(AccountStatus),
    NotOwner,
}

impl StatusChange {
    pub fn outcome(&self) -> StatusOutcome {
        match self {
            StatusChange::Changed(_) => StatusOutcome::Changed,
            StatusChange::AlreadyInState(_) => StatusOutcome::AlreadyInState,
            StatusChange::NotOwner => StatusOutcome::NotOwner,
        }
    }

    /// Account status after the call, hidden from non-owners.
    pub fn status(&self) -> Option<AccountStatus> {
        match self {
            StatusChange::Changed(status) | StatusChange::AlreadyInState(status) => Some(*status),
            StatusChange::NotOwner => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            StatusChange::Changed(status) => format!("Status changed to {}", status),
            StatusChange::AlreadyInState(AccountStatus::Locked) => {
                "The account has already been blocked".to_string()
            }
            StatusChange::AlreadyInState(AccountStatus::Active) => {
                "The account has already been active".to_string()
            }
            StatusChange::NotOwner => "This is not your bank account!".to_string(),
        }
    }

    /// Message log line, only for changes that were persisted.
    pub fn audit_message(&self, card: &CardNumber) -> Option<String> {
        match self {
            StatusChange::Changed(status) => Some(format!(
                "Successfully changed status of bank account {} to {}",
                card, status
            )),
            _ => None,
        }
    }
}

/// A successful top-up.
#[derive(Debug, Clone)]
pub struct TopUpReceipt {
    /// Account with the new balance
    pub account: Account,
    pub amount: Money,
}

impl TopUpReceipt {
    pub fn audit_message(&self) -> String {
        format!(
            "Successfully topped up bank account {} by {}",
            self.account.card_number, self.amount
        )
    }
}

/// Application service for account operations.
///
/// Generic over the store, the secret verifier and the identifier generator,
/// all injected at construction.
pub struct LedgerService<R, V, G>
where
    R: AccountStore,
    V: SecretVerifier,
    G: IdentifierGenerator,
{
    repo: Arc<R>,
    policy: Arc<AuthorizationPolicy<V>>,
    generator: G,
}

impl<R, V, G> LedgerService<R, V, G>
where
    R: AccountStore,
    V: SecretVerifier,
    G: IdentifierGenerator,
{
    pub fn new(repo: Arc<R>, policy: Arc<AuthorizationPolicy<V>>, generator: G) -> Self {
        Self {
            repo,
            policy,
            generator,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Account Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Opens an account for `owner` with zero balance.
    ///
    /// A card number or IBAN collision fails with `DuplicateIdentifier`, the
    /// caller may simply retry.
    #[tracing::instrument(skip(self, req), fields(tax_id = req.tax_id))]
    pub async fn create_account(
        &self,
        owner: &str,
        req: CreateAccountRequest,
    ) -> Result<Account, LedgerError> {
        if req.secret.trim().is_empty() {
            return Err(LedgerError::Validation("Secret cannot be empty".into()));
        }
        if owner.trim().is_empty() {
            return Err(LedgerError::Validation("Client name cannot be empty".into()));
        }

        let secret_hash = self.policy.verifier().hash(&req.secret).await?;
        let (card_number, iban) = self.generator.generate(req.tax_id);
        let account = Account::open(owner.to_string(), req.tax_id, card_number, iban, secret_hash)?;

        let account = self.repo.create_account(account).await?;
        tracing::info!(card = %account.card_number, "account opened");
        Ok(account)
    }

    /// Credits an active account.
    #[tracing::instrument(skip(self, req), fields(card = %req.card_number, amount = req.amount))]
    pub async fn top_up(&self, req: TopUpRequest) -> Result<TopUpReceipt, LedgerError> {
        let amount = Money::positive(req.amount)?;

        let mut account = self.account_by_card(&req.card_number).await?;
        let new_balance = account.balance_after_credit(amount)?;

        self.repo
            .update_balance(&account.card_number, account.balance, new_balance)
            .await?;

        account.balance = new_balance;
        Ok(TopUpReceipt { account, amount })
    }

    /// Moves an account to `target`, subject to the authorization policy.
    #[tracing::instrument(skip(self, req), fields(card = %req.card_number, requester = %principal.name))]
    pub async fn change_status(
        &self,
        principal: &Principal,
        req: ChangeStatusRequest,
        target: AccountStatus,
    ) -> Result<StatusChange, LedgerError> {
        let account = self.account_by_card(&req.card_number).await?;

        match self
            .policy
            .authorize_status_change(principal, &account, &req.secret)
            .await?
        {
            Access::NotOwner => return Ok(StatusChange::NotOwner),
            Access::Granted => {}
        }

        if account.status == target {
            return Ok(StatusChange::AlreadyInState(target));
        }

        self.repo.update_status(&account.card_number, target).await?;
        Ok(StatusChange::Changed(target))
    }

    pub async fn lock(
        &self,
        principal: &Principal,
        req: ChangeStatusRequest,
    ) -> Result<StatusChange, LedgerError> {
        self.change_status(principal, req, AccountStatus::Locked).await
    }

    pub async fn unlock(
        &self,
        principal: &Principal,
        req: ChangeStatusRequest,
    ) -> Result<StatusChange, LedgerError> {
        self.change_status(principal, req, AccountStatus::Active).await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Lookups
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn account_by_card(&self, card: &CardNumber) -> Result<Account, LedgerError> {
        lookup::account_by_card(self.repo.as_ref(), card).await
    }

    pub async fn account_by_iban(&self, iban: &Iban) -> Result<Account, LedgerError> {
        lookup::account_by_iban(self.repo.as_ref(), iban).await
    }
}
