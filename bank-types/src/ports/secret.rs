//! Secret hashing port.

use crate::domain::SecretHash;
use crate::error::SecretError;

/// One-way hashing and verification of account secrets.
#[async_trait::async_trait]
pub trait SecretVerifier: Send + Sync + 'static {
    /// Hashes a secret with a slow, salted function.
    async fn hash(&self, secret: &str) -> Result<SecretHash, SecretError>;

    /// Returns `Ok(false)` on a plain mismatch and `Err` on any other failure.
    async fn verify(&self, secret: &str, hash: &SecretHash) -> Result<bool, SecretError>;
}
