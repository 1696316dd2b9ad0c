//! Security utilities for API key generation and hashing.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Prefix of every raw API key.
pub const API_KEY_PREFIX: &str = "bk_";

/// Generates a new random raw API key.
pub fn generate_api_key() -> String {
    let bytes: [u8; 32] = rand::random();
    format!("{}{}", API_KEY_PREFIX, hex::encode(bytes))
}

/// Hashes an API key using SHA-256.
///
/// Keys are looked up by hash, the raw key is never stored.
pub fn hash_api_key(key: &str) -> String {
    let hash = Sha256::digest(key.as_bytes());
    hex::encode(hash)
}

/// Verifies an API key against a stored hash using constant-time comparison.
pub fn verify_api_key(input: &str, stored_hash: &str) -> bool {
    let input_hash = hash_api_key(input);
    input_hash.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}
