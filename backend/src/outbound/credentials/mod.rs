//! Credential hashing adapters.

mod bcrypt_hasher;

pub use bcrypt_hasher::{BcryptHasher, DEFAULT_BCRYPT_COST};
