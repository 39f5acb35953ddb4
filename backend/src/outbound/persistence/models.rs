//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{postings, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub credential_hash: String,
    pub display_name: String,
    pub role: String,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub applications: serde_json::Value,
    pub revision: i32,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub credential_hash: &'a str,
    pub display_name: &'a str,
    pub role: &'a str,
    pub linkedin: Option<&'a str>,
    pub github: Option<&'a str>,
    pub applications: &'a serde_json::Value,
    pub revision: i32,
}

/// Changeset replacing every mutable user column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserUpdate<'a> {
    pub username: &'a str,
    pub credential_hash: &'a str,
    pub display_name: &'a str,
    pub role: &'a str,
    pub linkedin: Option<&'a str>,
    pub github: Option<&'a str>,
    pub applications: &'a serde_json::Value,
    pub revision: i32,
}

/// Row struct for reading from the postings table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = postings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PostingRow {
    pub id: Uuid,
    pub company: String,
    pub location: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub applicants: serde_json::Value,
    pub revision: i32,
}

/// Insertable struct for creating new posting records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = postings)]
pub(crate) struct NewPostingRow<'a> {
    pub id: Uuid,
    pub company: &'a str,
    pub location: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub status: &'a str,
    pub applicants: &'a serde_json::Value,
    pub revision: i32,
}

/// Changeset replacing every mutable posting column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = postings)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct PostingUpdate<'a> {
    pub company: &'a str,
    pub location: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub status: &'a str,
    pub applicants: &'a serde_json::Value,
    pub revision: i32,
}
