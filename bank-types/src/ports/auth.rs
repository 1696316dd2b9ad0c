//! Caller authentication ports.

use crate::domain::{ApiKey, Principal, Role};
use crate::error::RepoError;

/// Resolves an opaque bearer credential to the calling principal.
#[async_trait::async_trait]
pub trait AuthVerifier: Send + Sync + 'static {
    /// Returns `None` for unknown credentials.
    async fn verify(&self, token: &str) -> Result<Option<Principal>, RepoError>;
}

/// Issuing of API keys.
#[async_trait::async_trait]
pub trait ApiKeyStore: Send + Sync + 'static {
    /// Creates a key for `client`. Returns the stored key and the raw key,
    /// which is not recoverable afterwards.
    async fn issue_api_key(&self, client: &str, role: Role) -> Result<(ApiKey, String), RepoError>;

    async fn count_api_keys(&self) -> Result<i64, RepoError>;
}
