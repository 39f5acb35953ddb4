//! bcrypt-backed `CredentialHasher`.
//!
//! bcrypt is deliberately slow, so both hashing and verification run on the
//! blocking thread pool rather than on an async worker.

use async_trait::async_trait;
use tokio::task;
use zeroize::Zeroizing;

use crate::domain::ports::{CredentialHasher, CredentialHasherError};
use crate::domain::{CredentialHash, MAX_PASSWORD_BYTES, TraceId};

/// Work factor used in production.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Hashes passwords with bcrypt at a fixed cost.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// Create a hasher with the given work factor.
    ///
    /// Costs outside bcrypt's accepted range make every hash fail; tests use
    /// [`bcrypt::MIN_COST`] (4) to stay fast.
    pub const fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

fn join_error(error: task::JoinError) -> CredentialHasherError {
    CredentialHasherError::failed(format!("hashing task aborted: {error}"))
}

#[async_trait]
impl CredentialHasher for BcryptHasher {
    async fn hash(&self, password: &str) -> Result<CredentialHash, CredentialHasherError> {
        // bcrypt only reads the first 72 bytes; longer inputs would share a hash.
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(CredentialHasherError::failed(format!(
                "password exceeds {MAX_PASSWORD_BYTES} bytes"
            )));
        }
        let password = Zeroizing::new(password.to_owned());
        let cost = self.cost;
        let hashed = task::spawn_blocking(TraceId::propagate(move || {
            bcrypt::hash(password.as_str(), cost)
        }))
        .await
        .map_err(join_error)?;
        hashed
            .map(CredentialHash::new)
            .map_err(|err| CredentialHasherError::failed(err.to_string()))
    }

    async fn verify(
        &self,
        password: &str,
        hash: &CredentialHash,
    ) -> Result<bool, CredentialHasherError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Ok(false);
        }
        let password = Zeroizing::new(password.to_owned());
        let hash = hash.as_str().to_owned();
        let verified = task::spawn_blocking(TraceId::propagate(move || {
            bcrypt::verify(password.as_str(), &hash)
        }))
        .await
        .map_err(join_error)?;
        match verified {
            Ok(matches) => Ok(matches),
            // A stored value that is not a bcrypt hash can never match.
            Err(bcrypt::BcryptError::InvalidHash(_) | bcrypt::BcryptError::InvalidPrefix(_)) => {
                Ok(false)
            }
            Err(err) => Err(CredentialHasherError::failed(err.to_string())),
        }
    }
}
