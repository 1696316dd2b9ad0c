//! Account lookups shared by the ledger and payment services.

use bank_types::{Account, AccountStore, CardNumber, Iban, LedgerError};

pub(crate) async fn account_by_card<R: AccountStore>(
    repo: &R,
    card: &CardNumber,
) -> Result<Account, LedgerError> {
    repo.get_by_card(card)
        .await?
        .ok_or_else(|| LedgerError::AccountNotFound(format!("card {}", card)))
}

pub(crate) async fn account_by_iban<R: AccountStore>(
    repo: &R,
    iban: &Iban,
) -> Result<Account, LedgerError> {
    repo.get_by_iban(iban)
        .await?
        .ok_or_else(|| LedgerError::AccountNotFound(format!("IBAN {}", iban)))
}
