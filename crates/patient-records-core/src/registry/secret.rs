//! Secret hashing for credentials.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{RecordError, RecordResult};

/// Hash a secret as an Argon2id PHC string with a random salt.
pub fn hash_secret(secret: &str) -> RecordResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| RecordError::Internal(format!("secret hashing failed: {}", e)))
}

/// Constant-time check of a secret against a stored hash.
///
/// An unparseable stored hash never verifies.
pub fn verify_secret(secret: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(secret.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
