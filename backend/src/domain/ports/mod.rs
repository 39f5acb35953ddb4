//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`CredentialHasher`]) are implemented by
//! outbound adapters. Driving ports (`*Command`, `*Query`) are implemented by
//! domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod application_command;
mod credential_hasher;
mod identity_command;
mod posting_command;
mod posting_repository;
mod user_repository;

#[cfg(test)]
pub use application_command::{MockApplicationCommand, MockApplicationQuery};
pub use application_command::{ApplicationCommand, ApplicationQuery};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHasher, CredentialHasherError, FixtureCredentialHasher};
#[cfg(test)]
pub use identity_command::MockIdentityCommand;
pub use identity_command::IdentityCommand;
#[cfg(test)]
pub use posting_command::{MockPostingCommand, MockPostingQuery};
pub use posting_command::{PostingCommand, PostingFilter, PostingQuery};
#[cfg(test)]
pub use posting_repository::MockPostingRepository;
pub use posting_repository::{PostingRepository, PostingRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserRepository, UserRepositoryError};
