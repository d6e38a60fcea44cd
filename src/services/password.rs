//! One-way password verifiers backed by Argon2id.
//!
//! Hashing and verification are CPU-intensive, so both run on the blocking
//! pool rather than on the async runtime.

use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tokio::task;

use crate::config::SecurityConfig;

#[derive(Debug, Clone)]
pub struct PasswordService {
    config: SecurityConfig,
}

impl PasswordService {
    #[must_use]
    pub const fn new(config: SecurityConfig) -> Self {
        Self { config }
    }

    /// Produces a PHC-formatted verifier for `password`.
    pub async fn hash(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        let config = self.config.clone();
        task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .context("Password hashing task panicked")?
    }

    /// Checks `password` against a stored verifier. A malformed verifier
    /// is an error, not a mismatch.
    pub async fn matches(&self, password: &str, verifier: &str) -> Result<bool> {
        let password = password.to_string();
        let verifier = verifier.to_string();

        task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&verifier)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            // Params are read from the hash itself.
            Ok::<bool, anyhow::Error>(
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")?
    }
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
