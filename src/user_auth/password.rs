//! Password hashing.
//!
//! Hashes are Argon2id PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`),
//! so the salt and cost parameters travel with the hash and need no column of
//! their own.

use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use thiserror::Error;

/// Password hashing failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// Plaintext does not match the stored hash
    #[error("password mismatch")]
    Mismatch,

    /// Stored hash could not be parsed or uses unsupported parameters
    #[error("malformed password hash: {0}")]
    MalformedHash(String),

    /// Hashing itself failed
    #[error("hashing failed: {0}")]
    Hashing(String),
}

/// One-way, salted hashing of plaintext credentials.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing string.
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError>;

    /// Check `plaintext` against a hash produced by [`PasswordHasher::hash`].
    fn verify(&self, hash: &str, plaintext: &str) -> Result<(), PasswordError>;
}

/// Argon2id with the library's default cost parameters.
#[derive(Default)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    fn verify(&self, hash: &str, plaintext: &str) -> Result<(), PasswordError> {
        let parsed =
            PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

        // Parameters come from the PHC string, not from `self.argon2`
        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(()),
            Err(password_hash::Error::Password) => Err(PasswordError::Mismatch),
            Err(e) => Err(PasswordError::MalformedHash(e.to_string())),
        }
    }
}
