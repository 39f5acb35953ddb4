//! Opaque password hashing capability.
//!
//! The domain never sees the hashing algorithm: it hands a raw password to
//! the hasher and stores the returned [`CredentialHash`].

use async_trait::async_trait;

use crate::domain::{CredentialHash, Error};

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential hashers.
    pub enum CredentialHasherError {
        /// Hashing or verification could not run.
        Failed { message: String } => "credential hashing failed: {message}",
    }
}

impl From<CredentialHasherError> for Error {
    fn from(error: CredentialHasherError) -> Self {
        Error::internal(error.to_string())
    }
}

/// Hash and verify raw passwords.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    /// Produce a salted hash for `password`.
    async fn hash(&self, password: &str) -> Result<CredentialHash, CredentialHasherError>;

    /// Check `password` against a stored hash.
    async fn verify(
        &self,
        password: &str,
        hash: &CredentialHash,
    ) -> Result<bool, CredentialHasherError>;
}

/// Reversible test double: the "hash" is the password with a fixed prefix.
///
/// Only suitable for tests and local fixtures.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCredentialHasher;

const FIXTURE_PREFIX: &str = "fixture$";

#[async_trait]
impl CredentialHasher for FixtureCredentialHasher {
    async fn hash(&self, password: &str) -> Result<CredentialHash, CredentialHasherError> {
        Ok(CredentialHash::new(format!("{FIXTURE_PREFIX}{password}")))
    }

    async fn verify(
        &self,
        password: &str,
        hash: &CredentialHash,
    ) -> Result<bool, CredentialHasherError> {
        Ok(hash
            .as_str()
            .strip_prefix(FIXTURE_PREFIX)
            .is_some_and(|stored| stored == password))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("secret", true)]
    #[case("Secret", false)]
    #[case("", false)]
    #[tokio::test]
    async fn fixture_hasher_verifies_only_the_original(
        #[case] attempt: &str,
        #[case] expected: bool,
    ) {
        let hasher = FixtureCredentialHasher;
        let hash = hasher.hash("secret").await.expect("hash succeeds");
        let verified = hasher.verify(attempt, &hash).await.expect("verify runs");
        assert_eq!(verified, expected);
    }
}
