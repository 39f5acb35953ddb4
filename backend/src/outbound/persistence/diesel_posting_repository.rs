//! PostgreSQL-backed `PostingRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{PostingRepository, PostingRepositoryError};
use crate::domain::{ApplicantRef, JobPosting, PostingId, PostingStatus};

use super::diesel_helpers::{
    decode_json, encode_json, map_diesel_error, map_pool_error, revision_from_db,
    revision_to_db,
};
use super::models::{NewPostingRow, PostingRow, PostingUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::postings;

/// Diesel-backed implementation of the `PostingRepository` port.
#[derive(Clone)]
pub struct DieselPostingRepository {
    pool: DbPool,
}

impl DieselPostingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> PostingRepositoryError {
    map_pool_error(error, PostingRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> PostingRepositoryError {
    map_diesel_error(
        error,
        PostingRepositoryError::query,
        PostingRepositoryError::connection,
    )
}

fn corrupt(id: Uuid, field: &str, detail: impl std::fmt::Display) -> PostingRepositoryError {
    PostingRepositoryError::query(format!("stored posting {id} has invalid {field}: {detail}"))
}

fn row_to_posting(row: PostingRow) -> Result<JobPosting, PostingRepositoryError> {
    let id = row.id;
    let applicants: Vec<ApplicantRef> =
        decode_json(row.applicants).map_err(|err| corrupt(id, "applicants", err))?;
    Ok(JobPosting {
        id: PostingId::from_uuid(id),
        company: row.company,
        location: row.location,
        title: row.title,
        description: row.description,
        status: row.status.parse().map_err(|err| corrupt(id, "status", err))?,
        applicants,
        revision: revision_from_db(row.revision)
            .ok_or_else(|| corrupt(id, "revision", row.revision))?,
    })
}

fn db_revision(revision: u32) -> Result<i32, PostingRepositoryError> {
    revision_to_db(revision)
        .ok_or_else(|| PostingRepositoryError::query(format!("revision {revision} out of range")))
}

/// Explain why a compare-and-swap update or delete touched no rows.
async fn write_failure(
    conn: &mut AsyncPgConnection,
    id: Uuid,
    expected: u32,
) -> PostingRepositoryError {
    let current = postings::table
        .filter(postings::id.eq(id))
        .select(postings::revision)
        .first::<i32>(conn)
        .await
        .optional()
        .map_err(diesel_error);

    match current {
        Ok(Some(actual)) => PostingRepositoryError::revision_mismatch(
            expected,
            revision_from_db(actual).unwrap_or_default(),
        ),
        Ok(None) => PostingRepositoryError::missing(id.to_string()),
        Err(err) => err,
    }
}

#[async_trait]
impl PostingRepository for DieselPostingRepository {
    async fn insert(&self, posting: &JobPosting) -> Result<(), PostingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let applicants = encode_json(&posting.applicants).map_err(PostingRepositoryError::query)?;
        let row = NewPostingRow {
            id: *posting.id.as_uuid(),
            company: &posting.company,
            location: &posting.location,
            title: &posting.title,
            description: posting.description.as_deref(),
            status: posting.status.as_str(),
            applicants: &applicants,
            revision: db_revision(posting.revision)?,
        };

        diesel::insert_into(postings::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn find_by_id(&self, id: &PostingId) -> Result<Option<JobPosting>, PostingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<PostingRow> = postings::table
            .filter(postings::id.eq(id.as_uuid()))
            .select(PostingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_posting).transpose()
    }

    async fn list_by_status(
        &self,
        status: PostingStatus,
    ) -> Result<Vec<JobPosting>, PostingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<PostingRow> = postings::table
            .filter(postings::status.eq(status.as_str()))
            .order((postings::created_at.asc(), postings::id.asc()))
            .select(PostingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter().map(row_to_posting).collect()
    }

    async fn save(
        &self,
        posting: &JobPosting,
        expected_revision: u32,
    ) -> Result<(), PostingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let applicants = encode_json(&posting.applicants).map_err(PostingRepositoryError::query)?;
        let update = PostingUpdate {
            company: &posting.company,
            location: &posting.location,
            title: &posting.title,
            description: posting.description.as_deref(),
            status: posting.status.as_str(),
            applicants: &applicants,
            revision: db_revision(posting.revision)?,
        };

        let updated_rows = diesel::update(postings::table)
            .filter(
                postings::id
                    .eq(posting.id.as_uuid())
                    .and(postings::revision.eq(db_revision(expected_revision)?)),
            )
            .set((&update, postings::updated_at.eq(diesel::dsl::now)))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;

        if updated_rows == 0 {
            return Err(write_failure(&mut conn, *posting.id.as_uuid(), expected_revision).await);
        }
        Ok(())
    }

    async fn delete(
        &self,
        id: &PostingId,
        expected_revision: u32,
    ) -> Result<(), PostingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted_rows = diesel::delete(
            postings::table.filter(
                postings::id
                    .eq(id.as_uuid())
                    .and(postings::revision.eq(db_revision(expected_revision)?)),
            ),
        )
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;

        if deleted_rows == 0 {
            return Err(write_failure(&mut conn, *id.as_uuid(), expected_revision).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{ApplicationStatus, UserId};
    use rstest::rstest;
    use serde_json::json;

    fn row(status: &str, applicants: serde_json::Value) -> PostingRow {
        PostingRow {
            id: Uuid::new_v4(),
            company: "Acme".into(),
            location: "Lisbon".into(),
            title: "Platform Engineer".into(),
            description: Some("Keep the lights on".into()),
            status: status.into(),
            applicants,
            revision: 2,
        }
    }

    #[rstest]
    fn rows_convert_to_postings() {
        let user_id = UserId::random();
        let posting = row_to_posting(row(
            "inactive",
            json!([{ "userId": user_id.to_string(), "status": "declined" }]),
        ))
        .expect("valid row");

        assert_eq!(posting.status, PostingStatus::Inactive);
        assert_eq!(
            posting.applicant(&user_id).map(|entry| entry.status),
            Some(ApplicationStatus::Declined)
        );
    }

    #[rstest]
    #[case(row("archived", json!([])))]
    #[case(row("active", json!([{ "userId": "not-a-uuid", "status": "pending" }])))]
    fn corrupt_rows_are_query_errors(#[case] row: PostingRow) {
        let err = row_to_posting(row).expect_err("corrupt row");
        assert!(matches!(err, PostingRepositoryError::Query { .. }));
    }

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let err = pool_error(PoolError::build("bad url"));
        assert!(matches!(err, PostingRepositoryError::Connection { .. }));
    }
}
