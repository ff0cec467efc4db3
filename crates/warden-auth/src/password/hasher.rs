//! Argon2id password hashing and verification.

use argon2::{
    Argon2, Params,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use tracing::warn;

use warden_core::error::AppError;

use super::PasswordMatcher;
use crate::error::SecurityResult;

/// Argon2id matcher with the crate's default cost parameters.
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Creates a hasher with default Argon2id parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a hasher with explicit cost parameters.
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        }
    }
}

impl PasswordMatcher for Argon2PasswordHasher {
    /// A stored hash that is not an Argon2 PHC string never matches.
    ///
    /// PHC strings embed their salt, so the external `salt` is ignored.
    fn matches(&self, stored_hash: &str, presented: &str, _salt: Option<&str>) -> SecurityResult<bool> {
        let parsed_hash = match PasswordHash::new(stored_hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Stored password hash is not a PHC string; treating as mismatch");
                return Ok(false);
            }
        };

        match self.argon2.verify_password(presented.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => {
                warn!(
                    algorithm = %parsed_hash.algorithm,
                    error = %e,
                    "Stored password hash cannot be verified; treating as mismatch"
                );
                Ok(false)
            }
        }
    }

    fn needs_rehash(&self, stored_hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(stored_hash) else {
            return true;
        };
        if parsed_hash.algorithm != argon2::ARGON2ID_IDENT {
            return true;
        }
        let Ok(params) = Params::try_from(&parsed_hash) else {
            return true;
        };
        let current = self.argon2.params();
        params.m_cost() != current.m_cost()
            || params.t_cost() != current.t_cost()
            || params.p_cost() != current.p_cost()
    }

    fn hash(&self, plain: &str) -> SecurityResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }
}
