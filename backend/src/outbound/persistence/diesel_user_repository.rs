//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{
    ApplicationRef, CredentialHash, DisplayName, ProfileLinks, User, UserId, Username,
};

use super::diesel_helpers::{
    decode_json, encode_json, map_diesel_error, map_pool_error, revision_from_db,
    revision_to_db, unique_violation_constraint,
};
use super::models::{NewUserRow, UserRow, UserUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> UserRepositoryError {
    map_pool_error(error, UserRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

fn write_error(error: diesel::result::Error, username: &str) -> UserRepositoryError {
    match unique_violation_constraint(&error) {
        Some(constraint) if constraint.contains("username") => {
            UserRepositoryError::duplicate_username(username)
        }
        _ => diesel_error(error),
    }
}

fn corrupt(id: Uuid, field: &str, detail: impl std::fmt::Display) -> UserRepositoryError {
    UserRepositoryError::query(format!("stored user {id} has invalid {field}: {detail}"))
}

fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let id = row.id;
    let applications: Vec<ApplicationRef> =
        decode_json(row.applications).map_err(|err| corrupt(id, "applications", err))?;
    Ok(User {
        id: UserId::from_uuid(id),
        username: Username::new(&row.username).map_err(|err| corrupt(id, "username", err))?,
        credential_hash: CredentialHash::new(row.credential_hash),
        display_name: DisplayName::new(&row.display_name)
            .map_err(|err| corrupt(id, "display name", err))?,
        role: row.role.parse().map_err(|err| corrupt(id, "role", err))?,
        profile_links: ProfileLinks {
            linkedin: row.linkedin,
            github: row.github,
        },
        applications,
        revision: revision_from_db(row.revision)
            .ok_or_else(|| corrupt(id, "revision", row.revision))?,
    })
}

fn db_revision(revision: u32) -> Result<i32, UserRepositoryError> {
    revision_to_db(revision)
        .ok_or_else(|| UserRepositoryError::query(format!("revision {revision} out of range")))
}

/// Explain why a compare-and-swap update touched no rows.
async fn update_failure(
    conn: &mut AsyncPgConnection,
    id: Uuid,
    expected: u32,
) -> UserRepositoryError {
    let current = users::table
        .filter(users::id.eq(id))
        .select(users::revision)
        .first::<i32>(conn)
        .await
        .optional()
        .map_err(diesel_error);

    match current {
        Ok(Some(actual)) => UserRepositoryError::revision_mismatch(
            expected,
            revision_from_db(actual).unwrap_or_default(),
        ),
        Ok(None) => UserRepositoryError::missing(id.to_string()),
        Err(err) => err,
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let applications = encode_json(&user.applications).map_err(UserRepositoryError::query)?;
        let row = NewUserRow {
            id: *user.id.as_uuid(),
            username: user.username.as_ref(),
            credential_hash: user.credential_hash.as_str(),
            display_name: user.display_name.as_ref(),
            role: user.role.as_str(),
            linkedin: user.profile_links.linkedin.as_deref(),
            github: user.profile_links.github.as_deref(),
            applications: &applications,
            revision: db_revision(user.revision)?,
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| write_error(err, user.username.as_ref()))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn save(&self, user: &User, expected_revision: u32) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let applications = encode_json(&user.applications).map_err(UserRepositoryError::query)?;
        let update = UserUpdate {
            username: user.username.as_ref(),
            credential_hash: user.credential_hash.as_str(),
            display_name: user.display_name.as_ref(),
            role: user.role.as_str(),
            linkedin: user.profile_links.linkedin.as_deref(),
            github: user.profile_links.github.as_deref(),
            applications: &applications,
            revision: db_revision(user.revision)?,
        };

        let updated_rows = diesel::update(users::table)
            .filter(
                users::id
                    .eq(user.id.as_uuid())
                    .and(users::revision.eq(db_revision(expected_revision)?)),
            )
            .set((&update, users::updated_at.eq(diesel::dsl::now)))
            .execute(&mut conn)
            .await
            .map_err(|err| write_error(err, user.username.as_ref()))?;

        if updated_rows == 0 {
            return Err(update_failure(&mut conn, *user.id.as_uuid(), expected_revision).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{ApplicationStatus, PostingId, Role};
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn row() -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            username: "ada".into(),
            credential_hash: "$2b$04$hash".into(),
            display_name: "Ada Lovelace".into(),
            role: "administrator".into(),
            linkedin: None,
            github: Some("https://github.com/ada".into()),
            applications: json!([]),
            revision: 3,
        }
    }

    #[rstest]
    fn rows_convert_to_users(row: UserRow) {
        let posting_id = PostingId::random();
        let row = UserRow {
            applications: json!([{ "postingId": posting_id.to_string(), "status": "pending" }]),
            ..row
        };

        let user = row_to_user(row).expect("valid row");

        assert_eq!(user.role, Role::Administrator);
        assert_eq!(user.revision, 3);
        assert_eq!(
            user.application(&posting_id).map(|entry| entry.status),
            Some(ApplicationStatus::Pending)
        );
    }

    #[rstest]
    #[case::role(UserRow { role: "owner".into(), ..row() })]
    #[case::revision(UserRow { revision: -2, ..row() })]
    #[case::applications(UserRow { applications: json!({ "not": "an array" }), ..row() })]
    fn corrupt_rows_are_query_errors(#[case] row: UserRow) {
        let err = row_to_user(row).expect_err("corrupt row");
        assert!(matches!(err, UserRepositoryError::Query { .. }));
    }

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let err = pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(err, UserRepositoryError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }
}
