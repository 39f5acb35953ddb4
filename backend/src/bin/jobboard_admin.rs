//! Provision administrator accounts directly in the job board database.
//!
//! The password is read from the first line of standard input so it never
//! appears in the process list or shell history.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::Parser;
use tokio::runtime::Builder;
use zeroize::Zeroizing;

use jobboard::domain::{IdentityService, Registration, RegistrationInput};
use jobboard::outbound::credentials::BcryptHasher;
use jobboard::outbound::persistence::{
    DbPool, DieselUserRepository, PoolConfig, bootstrap_schema,
};

/// `jobboard-admin` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "jobboard-admin",
    about = "Create an administrator account for the job board",
    version
)]
struct CliArgs {
    /// Login name for the new administrator.
    #[arg(long, value_name = "name")]
    username: String,
    /// Name shown to other users.
    #[arg(long = "display-name", value_name = "name")]
    display_name: String,
    /// Optional LinkedIn profile URL.
    #[arg(long, value_name = "url")]
    linkedin: Option<String>,
    /// Optional GitHub profile URL.
    #[arg(long, value_name = "url")]
    github: Option<String>,
    /// Database connection URL. Falls back to `JOBBOARD_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let database_url = resolve_database_url(args.database_url.clone())?;
    let password = read_password(io::stdin().lock())?;

    let registration = Registration::try_from_input(RegistrationInput {
        username: &args.username,
        password: &password,
        confirm_password: &password,
        display_name: &args.display_name,
        linkedin: args.linkedin.as_deref(),
        github: args.github.as_deref(),
    })
    .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error.to_string()))?;

    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    bootstrap_schema(&pool)
        .await
        .map_err(|error| io::Error::other(format!("prepare schema: {error}")))?;

    let identity = IdentityService::new(
        Arc::new(DieselUserRepository::new(pool)),
        Arc::new(BcryptHasher::default()),
    );
    let user_id = identity
        .register_administrator(&registration)
        .await
        .map_err(|error| io::Error::other(error.to_string()))?;

    writeln!(io::stdout(), "administrator {} created with id {user_id}", args.username)
}

fn resolve_database_url(explicit: Option<String>) -> io::Result<String> {
    let value = match explicit {
        Some(value) => value,
        None => env::var("JOBBOARD_DATABASE_URL").map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "database URL missing: set --database-url or JOBBOARD_DATABASE_URL",
            )
        })?,
    };
    if value.trim().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "database URL must not be empty",
        ));
    }
    Ok(value)
}

fn read_password(mut input: impl BufRead) -> io::Result<Zeroizing<String>> {
    let mut line = Zeroizing::new(String::new());
    input.read_line(&mut line)?;
    let password = Zeroizing::new(line.trim_end_matches(['\r', '\n']).to_owned());
    if password.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "expected the password on standard input",
        ));
    }
    Ok(password)
}
