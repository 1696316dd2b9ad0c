//! Card number and IBAN generation port.

use crate::domain::{CardNumber, Iban};

/// Produces candidate identifiers for a new account.
///
/// Values must have negligible collision probability; actual uniqueness is
/// enforced by the store.
pub trait IdentifierGenerator: Send + Sync + 'static {
    fn generate(&self, tax_id: i64) -> (CardNumber, Iban);
}
