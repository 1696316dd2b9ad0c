//! Authorization decisions shared by the ledger and payment services.

use bank_types::{Account, LedgerError, Principal, SecretVerifier};

/// Result of an ownership check that did not fail hard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// The caller does not own the account. Reported to the user as a
    /// regular outcome, the secret is never checked in this case.
    NotOwner,
}

/// Decides who may change an account's status or move its funds.
///
/// Admins bypass ownership and secret checks for status changes only.
/// Settlement always requires the account secret.
pub struct AuthorizationPolicy<V: SecretVerifier> {
    verifier: V,
}

impl<V: SecretVerifier> AuthorizationPolicy<V> {
    pub fn new(verifier: V) -> Self {
        Self { verifier }
    }

    /// Returns the verifier, used to hash secrets of new accounts.
    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    pub async fn authorize_status_change(
        &self,
        principal: &Principal,
        account: &Account,
        secret: &str,
    ) -> Result<Access, LedgerError> {
        if principal.is_admin() {
            return Ok(Access::Granted);
        }
        if !account.is_owned_by(&principal.name) {
            return Ok(Access::NotOwner);
        }

        self.check_secret(account, secret).await?;
        Ok(Access::Granted)
    }

    pub async fn authorize_settlement(
        &self,
        account: &Account,
        secret: &str,
    ) -> Result<(), LedgerError> {
        self.check_secret(account, secret).await
    }

    async fn check_secret(&self, account: &Account, secret: &str) -> Result<(), LedgerError> {
        if self.verifier.verify(secret, &account.secret_hash).await? {
            Ok(())
        } else {
            Err(LedgerError::WrongSecret)
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use bank_types::{CardNumber, Iban, Role, SecretError, SecretHash};

    use super::*;

    /// Stores secrets as `plain:<secret>`.
    struct PlainVerifier;

    #[async_trait]
    impl SecretVerifier for PlainVerifier {
        async fn hash(&self, secret: &str) -> Result<SecretHash, SecretError> {
            Ok(SecretHash::new(format!("plain:{}", secret)))
        }

        async fn verify(&self, secret: &str, hash: &SecretHash) -> Result<bool, SecretError> {
            match hash.as_str().strip_prefix("plain:") {
                Some(stored) => Ok(stored == secret),
                None => Err(SecretError::Verify("malformed hash".into())),
            }
        }
    }

    fn account(hash: &str) -> Account {
        Account::open(
            "Alice".to_string(),
            12345,
            CardNumber::new("4000123412341234").unwrap(),
            Iban::new("UA213223130000026007233566001").unwrap(),
            SecretHash::new(hash),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_owner_with_correct_secret() {
        let policy = AuthorizationPolicy::new(PlainVerifier);
        let alice = Principal::new("Alice", Role::Client);

        let access = policy
            .authorize_status_change(&alice, &account("plain:s3cret"), "s3cret")
            .await
            .unwrap();

        assert_eq!(access, Access::Granted);
    }

    #[tokio::test]
    async fn test_owner_with_wrong_secret() {
        let policy = AuthorizationPolicy::new(PlainVerifier);
        let alice = Principal::new("Alice", Role::Client);

        let result = policy
            .authorize_status_change(&alice, &account("plain:s3cret"), "nope")
            .await;

        assert!(matches!(result, Err(LedgerError::WrongSecret)));
    }

    #[tokio::test]
    async fn test_non_owner_never_reaches_secret_check() {
        let policy = AuthorizationPolicy::new(PlainVerifier);
        let mallory = Principal::new("Mallory", Role::Client);

        // A malformed hash would fail verification if it were consulted.
        let access = policy
            .authorize_status_change(&mallory, &account("garbage"), "s3cret")
            .await
            .unwrap();

        assert_eq!(access, Access::NotOwner);
    }

    #[tokio::test]
    async fn test_admin_bypasses_status_checks() {
        let policy = AuthorizationPolicy::new(PlainVerifier);
        let admin = Principal::new("root", Role::Admin);

        let access = policy
            .authorize_status_change(&admin, &account("plain:s3cret"), "")
            .await
            .unwrap();

        assert_eq!(access, Access::Granted);
    }

    #[tokio::test]
    async fn test_settlement_always_checks_secret() {
        let policy = AuthorizationPolicy::new(PlainVerifier);
        let account = account("plain:s3cret");

        assert!(policy.authorize_settlement(&account, "s3cret").await.is_ok());
        assert!(matches!(
            policy.authorize_settlement(&account, "").await,
            Err(LedgerError::WrongSecret)
        ));
    }

    #[tokio::test]
    async fn test_verifier_failure_is_not_a_mismatch() {
        let policy = AuthorizationPolicy::new(PlainVerifier);

        let result = policy.authorize_settlement(&account("garbage"), "s3cret").await;

        assert!(matches!(result, Err(LedgerError::Secret(_))));
    }
}
