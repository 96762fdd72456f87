//! One-way hashing of login secrets.
//!
//! Hashes are PHC strings produced by Argon2 with a random salt. Callers treat
//! them as opaque; only [`verify_secret`] looks inside.

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::{Result, StoreError};

/// Verified against when no account matches, so an unknown email costs a full
/// Argon2 verification like a wrong secret does.
static UNKNOWN_ACCOUNT_HASH: LazyLock<String> =
    LazyLock::new(|| hash_secret("unknown-account").unwrap_or_default());

/// Hashes a secret for storage.
pub fn hash_secret(secret: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StoreError::Hashing(e.to_string()))
}

/// Returns true if `secret` matches the stored hash. Unparseable hashes never match.
pub fn verify_secret(secret: &str, secret_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(secret_hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok()
}

/// Spends one verification on a lookup that found no account.
pub fn verify_unknown_account(secret: &str) {
    let _ = verify_secret(secret, &UNKNOWN_ACCOUNT_HASH);
}
