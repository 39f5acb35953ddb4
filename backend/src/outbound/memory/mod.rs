//! In-memory repositories.
//!
//! Used when no database URL is configured and by tests. They honour the same
//! compare-and-swap contract as the PostgreSQL adapters, so the application
//! ledger behaves identically on both.

mod posting_repository;
mod user_repository;

pub use posting_repository::MemoryPostingRepository;
pub use user_repository::MemoryUserRepository;
