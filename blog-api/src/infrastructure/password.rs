use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum PasswordError {
    #[error("argon2 parameters rejected: {0}")]
    Params(argon2::Error),

    #[error("password hashing failed: {0}")]
    Hash(HashError),
}

/// Argon2id work factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PasswordCost {
    pub(crate) memory_kib: u32,
    pub(crate) iterations: u32,
}

impl Default for PasswordCost {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
        }
    }
}

/// Hashes and checks account passwords with argon2id.
///
/// A hash of a throwaway password is computed up front. Logins for unknown
/// usernames verify against it, so they cost the same as a real check.
pub(crate) struct PasswordVault {
    argon2: Argon2<'static>,
    decoy_hash: String,
}

impl PasswordVault {
    pub(crate) fn new(cost: PasswordCost) -> Result<Self, PasswordError> {
        let params = Params::new(cost.memory_kib, cost.iterations, 1, None)
            .map_err(PasswordError::Params)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let decoy_hash = hash_with(&argon2, "decoy password never issued")?;

        Ok(Self { argon2, decoy_hash })
    }

    /// PHC string with a fresh random salt.
    pub(crate) fn hash(&self, raw_password: &str) -> Result<String, PasswordError> {
        hash_with(&self.argon2, raw_password)
    }

    /// `Ok(false)` on mismatch; errors only for unreadable hashes.
    pub(crate) fn verify(&self, raw_password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(stored_hash).map_err(PasswordError::Hash)?;
        match self.argon2.verify_password(raw_password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(HashError::Password) => Ok(false),
            Err(err) => Err(PasswordError::Hash(err)),
        }
    }

    pub(crate) fn burn_decoy(&self, raw_password: &str) {
        let _ = self.verify(raw_password, &self.decoy_hash);
    }
}

fn hash_with(argon2: &Argon2<'_>, raw_password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(raw_password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError::Hash)
}

#[cfg(test)]
pub(crate) const TEST_COST: PasswordCost = PasswordCost {
    memory_kib: 64,
    iterations: 1,
};
