//! Payment Application Service
//!
//! Payment creation and settlement. Settlement marks the payment SENT and
//! debits the source account in a single store transaction.

use std::sync::Arc;

use bank_types::{
    Account, AccountStore, CreatePaymentRequest, LedgerError, Money, Payment, PaymentId,
    PaymentStatus, PaymentStore, SecretVerifier, SettlementCommand,
};

use crate::lookup;
use crate::policy::AuthorizationPolicy;

/// Pre-check of a settlement: what the source balance will be afterwards.
#[derive(Debug, Clone)]
pub struct SettlementQuote {
    pub payment: Payment,
    pub account: Account,
    pub new_balance: Money,
}

/// A settled payment and the debited source account.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub payment: Payment,
    pub account: Account,
}

impl Settlement {
    pub fn message(&self) -> String {
        format!("Status changed to {}", PaymentStatus::Sent)
    }

    pub fn audit_message(&self) -> String {
        format!("Successfully sent payment #{}", self.payment.id)
    }
}

/// Application service for payment operations.
pub struct PaymentService<R, V>
where
    R: AccountStore + PaymentStore,
    V: SecretVerifier,
{
    repo: Arc<R>,
    policy: Arc<AuthorizationPolicy<V>>,
}

impl<R, V> PaymentService<R, V>
where
    R: AccountStore + PaymentStore,
    V: SecretVerifier,
{
    pub fn new(repo: Arc<R>, policy: Arc<AuthorizationPolicy<V>>) -> Self {
        Self { repo, policy }
    }

    /// Prepares a payment from an existing account. No funds move.
    #[tracing::instrument(skip(self, req), fields(from = %req.from_iban, to = %req.to_iban, amount = req.amount))]
    pub async fn create_payment(&self, req: CreatePaymentRequest) -> Result<Payment, LedgerError> {
        let amount = Money::positive(req.amount)?;
        if req.to_client.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Destination name cannot be empty".into(),
            ));
        }

        let source = lookup::account_by_iban(self.repo.as_ref(), &req.from_iban).await?;
        let payment = Payment::prepare(
            &source,
            req.to_iban,
            req.to_client,
            req.description,
            amount,
        )?;

        self.repo.create_payment(payment).await.map_err(Into::into)
    }

    /// Checks that a payment can be settled and computes the source balance
    /// after the debit. Nothing is written.
    #[tracing::instrument(skip(self))]
    pub async fn prepare_settlement(&self, id: PaymentId) -> Result<SettlementQuote, LedgerError> {
        let payment = self.get_payment(id).await?;
        if payment.is_sent() {
            return Err(LedgerError::AlreadySent);
        }

        let account = lookup::account_by_iban(self.repo.as_ref(), &payment.source.iban).await?;
        let new_balance = account.balance_after_debit(payment.amount)?;

        Ok(SettlementQuote {
            payment,
            account,
            new_balance,
        })
    }

    /// Settles a prepared payment.
    ///
    /// `new_balance` is the source balance the caller expects after the
    /// debit. It must equal the current balance minus the payment amount,
    /// otherwise the account changed since the caller looked and the call
    /// fails with `BalanceConflict`.
    #[tracing::instrument(skip(self, secret))]
    pub async fn settle_payment(
        &self,
        id: PaymentId,
        secret: &str,
        new_balance: i64,
    ) -> Result<Settlement, LedgerError> {
        let new_balance = Money::new(new_balance)?;

        let mut payment = self.get_payment(id).await?;
        if payment.is_sent() {
            return Err(LedgerError::AlreadySent);
        }

        let mut account =
            lookup::account_by_iban(self.repo.as_ref(), &payment.source.iban).await?;

        self.policy.authorize_settlement(&account, secret).await?;

        let expected = account.balance_after_debit(payment.amount)?;
        if expected != new_balance {
            return Err(LedgerError::BalanceConflict);
        }

        self.repo
            .settle(&SettlementCommand {
                payment_id: payment.id,
                card_number: account.card_number.clone(),
                expected_balance: account.balance,
                new_balance,
            })
            .await?;

        payment.status = PaymentStatus::Sent;
        account.balance = new_balance;
        tracing::info!(payment_id = %payment.id, "payment sent");
        Ok(Settlement { payment, account })
    }

    /// Pre-check followed by settlement.
    pub async fn send_payment(
        &self,
        id: PaymentId,
        secret: &str,
    ) -> Result<Settlement, LedgerError> {
        let quote = self.prepare_settlement(id).await?;
        self.settle_payment(id, secret, quote.new_balance.amount())
            .await
    }

    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment, LedgerError> {
        self.repo
            .get_payment(id)
            .await?
            .ok_or_else(|| LedgerError::PaymentNotFound(id.to_string()))
    }
}
