/*!
 * Password hashing with Argon2id.
 *
 * Hashing and verification are CPU heavy and run on the blocking pool.
 */

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use log::error;

use crate::errors::AuthError;

/// Argon2id password hasher producing PHC strings
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Hasher with the library defaults (19 MiB, 2 passes, 1 lane)
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Hasher with custom cost parameters; cheap settings keep tests fast
    pub fn with_params(memory_cost: u32, time_cost: u32, parallelism: u32) -> Result<Self, AuthError> {
        let params = Params::new(memory_cost, time_cost, parallelism, None)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(Self { params })
    }

    /// Hash a password
    ///
    /// # Returns
    /// * `Result<String, AuthError>` - PHC string starting with `$argon2id$`
    pub async fn hash(&self, password: String) -> Result<String, AuthError> {
        let params = self.params.clone();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
        })
        .await
        .map_err(|e| {
            error!("Password hash task panicked: {}", e);
            AuthError::Hashing("hashing task failed".to_string())
        })?
        .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Check a password against a stored PHC string
    pub async fn verify(&self, password: String, stored_hash: String) -> Result<bool, AuthError> {
        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&stored_hash).map_err(|e| AuthError::Hashing(e.to_string()))?;
            // Parameters are read back from the PHC string
            Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok())
        })
        .await
        .map_err(|e| {
            error!("Password verify task panicked: {}", e);
            AuthError::Hashing("verification task failed".to_string())
        })?
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
