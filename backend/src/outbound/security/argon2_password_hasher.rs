//! Argon2id implementation of the `PasswordHasher` port.
//!
//! Hashing is CPU bound, so both operations run on the blocking pool.

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use async_trait::async_trait;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::domain::PasswordDigest;
use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Password hasher using Argon2id with the crate's default parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

const DECOY_SALT: &str = "cxKq+zhT6u4tK1xEZzZwbA";
const DECOY_OUTPUT: &str = "hfRIGvuehdTNWNY9qbteydFknp93wWptRSXgRXlSak0";

fn hash_blocking(password: &[u8]) -> Result<PasswordDigest, PasswordHashError> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|err| PasswordHashError::hash(err.to_string()))?;

    Argon2::default()
        .hash_password(password, &salt)
        .map(|hash| PasswordDigest::new(hash.to_string()))
        .map_err(|err| PasswordHashError::hash(err.to_string()))
}

fn verify_blocking(password: &[u8], digest: &str) -> Result<bool, PasswordHashError> {
    let parsed = PasswordHash::new(digest)
        .map_err(|err| PasswordHashError::malformed_digest(err.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password, &parsed)
        .is_ok())
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<PasswordDigest, PasswordHashError> {
        let secret = Zeroizing::new(password.as_bytes().to_vec());
        tokio::task::spawn_blocking(move || hash_blocking(&secret))
            .await
            .map_err(|err| PasswordHashError::hash(err.to_string()))?
    }

    async fn verify(
        &self,
        password: &str,
        digest: &PasswordDigest,
    ) -> Result<bool, PasswordHashError> {
        let secret = Zeroizing::new(password.as_bytes().to_vec());
        let digest = digest.as_str().to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(&secret, &digest))
            .await
            .map_err(|err| PasswordHashError::hash(err.to_string()))?
    }

    fn decoy_digest(&self) -> PasswordDigest {
        let argon2 = Argon2::default();
        let params = argon2.params();
        PasswordDigest::new(format!(
            "$argon2id$v=19$m={},t={},p={}${DECOY_SALT}${DECOY_OUTPUT}",
            params.m_cost(),
            params.t_cost(),
            params.p_cost(),
        ))
    }
}
