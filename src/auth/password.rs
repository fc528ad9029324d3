use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;
use tokio::task;
use uuid::Uuid;

use super::AuthError;

/// Prefix marking a stored password that can never verify
const UNUSABLE_PASSWORD_PREFIX: char = '!';

/// Real hash checked when no account matches, so a miss costs as much as a wrong password
static UNKNOWN_ACCOUNT_HASH: Lazy<String> =
    Lazy::new(|| hash_blocking(&Uuid::new_v4().to_string()).unwrap_or_default());

/// Hash a password into an argon2 PHC string with a random salt.
///
/// Argon2 is CPU bound, so the work runs on the blocking pool.
pub async fn hash_password(password: &str) -> Result<String, AuthError> {
    let password = password.to_string();
    task::spawn_blocking(move || hash_blocking(&password))
        .await
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?
}

/// Stored value for accounts created without a password
pub fn unusable_password() -> String {
    format!("{UNUSABLE_PASSWORD_PREFIX}{}", Uuid::new_v4().simple())
}

/// Check `password` against a stored hash. Unusable or malformed hashes never match.
pub async fn verify_password(password: &str, stored: &str) -> bool {
    let password = password.to_string();
    let stored = stored.to_string();
    task::spawn_blocking(move || verify_blocking(&password, &stored))
        .await
        .unwrap_or(false)
}

/// Spend one verification on a throwaway hash when the email matched no account
pub async fn verify_unknown_account(password: &str) {
    let password = password.to_string();
    let _ = task::spawn_blocking(move || verify_blocking(&password, &UNKNOWN_ACCOUNT_HASH)).await;
}

fn hash_blocking(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

fn verify_blocking(password: &str, stored: &str) -> bool {
    if stored.starts_with(UNUSABLE_PASSWORD_PREFIX) {
        return false;
    }
    let Ok(parsed) = PasswordHash::new(stored) else {
        tracing::warn!("Stored password hash could not be parsed");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
