//! Credential Service
//!
//! Password hashing and verification with Argon2id, and login identifier
//! normalization.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::domain::normalize;

/// Credential errors
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Invalid password hash: {0}")]
    MalformedHash(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// Stateless Argon2id password service.
#[derive(Debug, Clone, Default)]
pub struct CredentialService {
    argon2: Argon2<'static>,
}

impl CredentialService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a password with a fresh random salt.
    ///
    /// Two calls with the same input produce different hashes.
    pub fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CredentialError::Hashing(e.to_string()))
    }

    /// Check a candidate password against a stored hash.
    ///
    /// A mismatch is `Ok(false)`; only an unparseable hash is an error.
    pub fn verify(&self, hashed: &str, candidate: &str) -> Result<bool, CredentialError> {
        let parsed_hash =
            PasswordHash::new(hashed).map_err(|e| CredentialError::MalformedHash(e.to_string()))?;

        Ok(self
            .argon2
            .verify_password(candidate.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Normalize a username-or-email login identifier.
    pub fn normalize_identifier(&self, raw: &str) -> String {
        normalize(raw)
    }
}
