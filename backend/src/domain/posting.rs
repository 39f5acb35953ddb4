//! Job posting aggregate and its validated inputs.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::application::ApplicantRef;
use super::UserId;

/// Maximum length of company, location and title fields.
pub const POSTING_FIELD_MAX: usize = 200;
/// Maximum length of a posting description.
pub const POSTING_DESCRIPTION_MAX: usize = 5000;

/// Validation failures for posting inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostingValidationError {
    #[error("job posting id must be a valid UUID")]
    InvalidId,
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    FieldTooLong { field: &'static str, max: usize },
    #[error("unknown posting status '{0}'")]
    UnknownStatus(String),
}

impl PostingValidationError {
    /// Name of the offending input field, when there is one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::EmptyField { field } | Self::FieldTooLong { field, .. } => Some(field),
            Self::InvalidId => Some("id"),
            Self::UnknownStatus(_) => Some("status"),
        }
    }
}

/// Stable posting identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostingId(Uuid);

impl PostingId {
    /// Parse a [`PostingId`] from its textual form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, PostingValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| PostingValidationError::InvalidId)
    }

    /// Generate a new random [`PostingId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PostingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Whether a posting accepts applications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostingStatus {
    #[default]
    Active,
    Inactive,
}

impl PostingStatus {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for PostingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PostingStatus {
    type Err = PostingValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(PostingValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Stored job posting.
///
/// `applicants` is the posting-side half of the application ledger and is
/// never edited through posting updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPosting {
    pub id: PostingId,
    pub company: String,
    pub location: String,
    pub title: String,
    pub description: Option<String>,
    pub status: PostingStatus,
    pub applicants: Vec<ApplicantRef>,
    pub revision: u32,
}

impl JobPosting {
    /// Find the applicant entry for `user_id`.
    pub fn applicant(&self, user_id: &UserId) -> Option<&ApplicantRef> {
        self.applicants.iter().find(|entry| entry.user_id == *user_id)
    }

    /// Whether `user_id` holds an application on this posting.
    pub fn has_applicant(&self, user_id: &UserId) -> bool {
        self.applicant(user_id).is_some()
    }
}

fn required_field(field: &'static str, raw: &str) -> Result<String, PostingValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PostingValidationError::EmptyField { field });
    }
    bounded(field, trimmed, POSTING_FIELD_MAX)
}

fn bounded(field: &'static str, value: &str, max: usize) -> Result<String, PostingValidationError> {
    if value.chars().count() > max {
        return Err(PostingValidationError::FieldTooLong { field, max });
    }
    Ok(value.to_owned())
}

fn optional_description(raw: Option<&str>) -> Result<Option<String>, PostingValidationError> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| bounded("description", value, POSTING_DESCRIPTION_MAX))
        .transpose()
}

/// Validated fields for a new posting.
///
/// # Examples
/// ```
/// use jobboard::domain::{NewPosting, PostingStatus};
///
/// let posting = NewPosting::try_new("Acme", "Remote", "Engineer", None).unwrap();
/// assert_eq!(posting.status, PostingStatus::Active);
/// assert!(NewPosting::try_new(" ", "Remote", "Engineer", None).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPosting {
    pub company: String,
    pub location: String,
    pub title: String,
    pub description: Option<String>,
    pub status: PostingStatus,
}

impl NewPosting {
    /// Validate the posting fields; the status defaults to active.
    pub fn try_new(
        company: &str,
        location: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<Self, PostingValidationError> {
        Ok(Self {
            company: required_field("company", company)?,
            location: required_field("location", location)?,
            title: required_field("title", title)?,
            description: optional_description(description)?,
            status: PostingStatus::Active,
        })
    }

    /// Override the initial status.
    #[must_use]
    pub fn with_status(mut self, status: PostingStatus) -> Self {
        self.status = status;
        self
    }
}

/// Partial update applied by administrators.
///
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingPatch {
    pub company: Option<String>,
    pub location: Option<String>,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<PostingStatus>,
}

/// Raw patch inputs before validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostingPatchInput<'a> {
    pub company: Option<&'a str>,
    pub location: Option<&'a str>,
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub status: Option<PostingStatus>,
}

impl PostingPatch {
    /// Validate raw patch inputs. A blank description clears it.
    pub fn try_from_input(input: PostingPatchInput<'_>) -> Result<Self, PostingValidationError> {
        Ok(Self {
            company: input
                .company
                .map(|value| required_field("company", value))
                .transpose()?,
            location: input
                .location
                .map(|value| required_field("location", value))
                .transpose()?,
            title: input
                .title
                .map(|value| required_field("title", value))
                .transpose()?,
            description: input
                .description
                .map(|value| optional_description(Some(value)))
                .transpose()?,
            status: input.status,
        })
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply the patch to a posting in place.
    pub fn apply_to(&self, posting: &mut JobPosting) {
        if let Some(company) = &self.company {
            posting.company.clone_from(company);
        }
        if let Some(location) = &self.location {
            posting.location.clone_from(location);
        }
        if let Some(title) = &self.title {
            posting.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            posting.description.clone_from(description);
        }
        if let Some(status) = self.status {
            posting.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn posting() -> JobPosting {
        JobPosting {
            id: PostingId::random(),
            company: "Acme".to_owned(),
            location: "Remote".to_owned(),
            title: "Engineer".to_owned(),
            description: Some("Build things".to_owned()),
            status: PostingStatus::Active,
            applicants: Vec::new(),
            revision: 1,
        }
    }

    #[rstest]
    #[case("", "Remote", "Engineer", "company")]
    #[case("Acme", "  ", "Engineer", "location")]
    #[case("Acme", "Remote", "", "title")]
    fn new_posting_requires_core_fields(
        #[case] company: &str,
        #[case] location: &str,
        #[case] title: &str,
        #[case] field: &'static str,
    ) {
        let err = NewPosting::try_new(company, location, title, None).expect_err("must fail");
        assert_eq!(err, PostingValidationError::EmptyField { field });
        assert_eq!(err.field(), Some(field));
    }

    #[rstest]
    fn new_posting_trims_and_drops_blank_description() {
        let posting = NewPosting::try_new(" Acme ", "Remote", "Engineer", Some("   "))
            .expect("valid posting");
        assert_eq!(posting.company, "Acme");
        assert!(posting.description.is_none());
    }

    #[rstest]
    fn overlong_title_is_rejected() {
        let title = "t".repeat(POSTING_FIELD_MAX + 1);
        let err = NewPosting::try_new("Acme", "Remote", &title, None).expect_err("must fail");
        assert!(matches!(err, PostingValidationError::FieldTooLong { field: "title", .. }));
    }

    #[rstest]
    fn patch_updates_only_provided_fields() {
        let mut target = posting();
        let patch = PostingPatch::try_from_input(PostingPatchInput {
            title: Some("Senior Engineer"),
            status: Some(PostingStatus::Inactive),
            ..PostingPatchInput::default()
        })
        .expect("valid patch");

        patch.apply_to(&mut target);

        assert_eq!(target.title, "Senior Engineer");
        assert_eq!(target.company, "Acme");
        assert_eq!(target.status, PostingStatus::Inactive);
        assert_eq!(target.description.as_deref(), Some("Build things"));
    }

    #[rstest]
    fn blank_description_in_patch_clears_it() {
        let mut target = posting();
        let patch = PostingPatch::try_from_input(PostingPatchInput {
            description: Some(""),
            ..PostingPatchInput::default()
        })
        .expect("valid patch");

        patch.apply_to(&mut target);

        assert!(target.description.is_none());
    }

    #[rstest]
    fn empty_patch_is_detected() {
        let patch = PostingPatch::try_from_input(PostingPatchInput::default()).expect("valid");
        assert!(patch.is_empty());
    }

    #[rstest]
    fn patch_rejects_blank_company() {
        let result = PostingPatch::try_from_input(PostingPatchInput {
            company: Some(" "),
            ..PostingPatchInput::default()
        });
        assert_eq!(
            result,
            Err(PostingValidationError::EmptyField { field: "company" })
        );
    }

    #[rstest]
    #[case("active", PostingStatus::Active)]
    #[case("inactive", PostingStatus::Inactive)]
    fn status_parses_storage_form(#[case] raw: &str, #[case] expected: PostingStatus) {
        assert_eq!(raw.parse::<PostingStatus>(), Ok(expected));
    }
}
