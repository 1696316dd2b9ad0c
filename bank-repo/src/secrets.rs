//! bcrypt adapter for the `SecretVerifier` port.

use async_trait::async_trait;

use bank_types::{SecretError, SecretHash, SecretVerifier};

/// Secret hashing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretConfig {
    /// bcrypt cost factor (4..=31)
    pub cost: u32,
}

impl SecretConfig {
    pub const MIN_COST: u32 = 4;
    pub const MAX_COST: u32 = 31;
}

impl Default for SecretConfig {
    fn default() -> Self {
        Self { cost: 14 }
    }
}

/// Hashes secrets with bcrypt on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct BcryptVerifier {
    cost: u32,
}

impl BcryptVerifier {
    pub fn new(config: SecretConfig) -> Result<Self, SecretError> {
        if !(SecretConfig::MIN_COST..=SecretConfig::MAX_COST).contains(&config.cost) {
            return Err(SecretError::Hash(format!(
                "bcrypt cost must be between {} and {}, got {}",
                SecretConfig::MIN_COST,
                SecretConfig::MAX_COST,
                config.cost
            )));
        }
        Ok(Self { cost: config.cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

#[async_trait]
impl SecretVerifier for BcryptVerifier {
    async fn hash(&self, secret: &str) -> Result<SecretHash, SecretError> {
        let secret = secret.to_owned();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(secret, cost))
            .await
            .map_err(|e| SecretError::Hash(e.to_string()))?
            .map(SecretHash::new)
            .map_err(|e| SecretError::Hash(e.to_string()))
    }

    async fn verify(&self, secret: &str, hash: &SecretHash) -> Result<bool, SecretError> {
        let secret = secret.to_owned();
        let hash = hash.as_str().to_owned();

        tokio::task::spawn_blocking(move || bcrypt::verify(secret, &hash))
            .await
            .map_err(|e| SecretError::Verify(e.to_string()))?
            .map_err(|e| SecretError::Verify(e.to_string()))
    }
}
