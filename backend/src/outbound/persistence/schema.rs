//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `migrations/` exactly.

diesel::table! {
    /// Registered accounts.
    ///
    /// `applications` holds the user-side halves of job applications as a
    /// JSON array of `{ "postingId", "status" }` objects.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        credential_hash -> Text,
        display_name -> Varchar,
        role -> Varchar,
        linkedin -> Nullable<Text>,
        github -> Nullable<Text>,
        applications -> Jsonb,
        /// Compare-and-swap counter, bumped on every update.
        revision -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Job postings.
    ///
    /// `applicants` holds the posting-side halves of job applications as a
    /// JSON array of `{ "userId", "status" }` objects.
    postings (id) {
        id -> Uuid,
        company -> Varchar,
        location -> Varchar,
        title -> Varchar,
        description -> Nullable<Text>,
        status -> Varchar,
        applicants -> Jsonb,
        revision -> Int4,
        /// Listing order.
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
