use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct HashError(String);

/// PasswordService
///
/// The opaque password primitive used by the login and registration handlers.
pub trait PasswordService: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, HashError>;
    /// Returns false for a wrong password and for an unparseable digest alike.
    fn verify(&self, plain: &str, digest: &str) -> bool;
}

pub type PasswordState = Arc<dyn PasswordService>;

/// Argon2id with the crate's default parameters, stored as PHC strings.
#[derive(Debug, Default, Clone)]
pub struct Argon2Passwords;

impl PasswordService for Argon2Passwords {
    fn hash(&self, plain: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|phc| phc.to_string())
            .map_err(|e| HashError(e.to_string()))
    }

    fn verify(&self, plain: &str, digest: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}
