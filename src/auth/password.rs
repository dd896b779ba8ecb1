use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use super::AuthError;

/// Argon2id with a random salt; returns the PHC string
pub async fn hash_password(plain: &str) -> Result<String, AuthError> {
    let plain = plain.to_string();

    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| AuthError::Hashing(e.to_string()))?
}

/// Prefixes of the bcrypt hashes stored by earlier releases
const BCRYPT_PREFIXES: &[&str] = &["$2a$", "$2b$", "$2y$"];

fn is_bcrypt(stored_hash: &str) -> bool {
    BCRYPT_PREFIXES
        .iter()
        .any(|prefix| stored_hash.starts_with(prefix))
}

/// Checks Argon2 PHC strings and legacy bcrypt hashes.
/// An unparsable stored hash counts as a mismatch.
pub async fn verify_password(plain: &str, stored_hash: &str) -> Result<bool, AuthError> {
    let plain = plain.to_string();
    let stored_hash = stored_hash.to_string();

    tokio::task::spawn_blocking(move || {
        if is_bcrypt(&stored_hash) {
            return bcrypt::verify(&plain, &stored_hash).unwrap_or(false);
        }

        let Ok(parsed) = PasswordHash::new(&stored_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    })
    .await
    .map_err(|e| AuthError::Hashing(e.to_string()))
}
