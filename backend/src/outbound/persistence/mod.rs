//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories are thin translators between Diesel rows and domain types.
//! Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module. Writes are single-row compare-and-swap statements
//! on the `revision` column; no multi-statement transactions are used.
//!
//! # Example
//!
//! ```ignore
//! use jobboard::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/jobboard")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod bootstrap;
mod diesel_helpers;
mod diesel_posting_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use bootstrap::{BootstrapError, bootstrap_schema};
pub use diesel_posting_repository::DieselPostingRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
