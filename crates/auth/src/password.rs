//! Password hashing (argon2id, per-password salts).

use argon2::password_hash::{PasswordHash, SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher as _, PasswordVerifier as _};
use thiserror::Error;

/// A hash could not be computed or a stored hash could not be parsed.
///
/// This is an internal fault (corrupt record, unusable parameters), distinct
/// from a password simply not matching.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("password hash operation failed: {0}")]
pub struct PasswordHashError(String);

/// Hashes and verifies passwords.
///
/// Stateless: the parameters travel inside the encoded hash string, so stored
/// hashes stay verifiable if defaults change later.
#[derive(Clone, Default)]
pub struct PasswordHasher {
    argon: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordHashError(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Check `password` against a stored hash.
    ///
    /// A mismatch is `Ok(false)`; `Err` means the stored hash itself is
    /// unusable.
    pub fn verify(&self, password: &str, stored: &str) -> Result<bool, PasswordHashError> {
        let parsed = PasswordHash::new(stored).map_err(|e| PasswordHashError(e.to_string()))?;
        match self.argon.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordHashError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("correct horse").unwrap();
        assert!(hasher.verify("correct horse", &hash).unwrap());
        assert!(!hasher.verify("wrong horse", &hash).unwrap());
    }

    #[test]
    fn salts_make_equal_passwords_hash_differently() {
        let hasher = PasswordHasher::new();
        assert_ne!(hasher.hash("pw").unwrap(), hasher.hash("pw").unwrap());
    }

    #[test]
    fn corrupt_stored_hashes_are_an_error_not_a_mismatch() {
        let hasher = PasswordHasher::new();
        assert!(hasher.verify("pw", "not-a-phc-string").is_err());
    }
}
