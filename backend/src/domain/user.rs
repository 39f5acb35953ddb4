//! User identity and role model.
//!
//! A [`User`] record carries the account's credential hash, its role and the
//! user-side half of every job application. The credential hash never leaves
//! the domain: adapters receive a [`UserProfile`] instead.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::application::ApplicationRef;
use super::posting::PostingId;

/// Validation errors returned by the identity value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must not be empty")]
    EmptyId,
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("username must be between {min} and {max} characters")]
    UsernameLength { min: usize, max: usize },
    #[error("username may only contain letters, numbers, '.', '_' or '-'")]
    UsernameInvalidCharacters,
    #[error("display name must not be empty")]
    EmptyDisplayName,
    #[error("display name must be at most {max} characters")]
    DisplayNameTooLong { max: usize },
    #[error("profile link must be at most {max} characters")]
    ProfileLinkTooLong { max: usize },
    #[error("unknown role '{0}'")]
    UnknownRole(String),
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from its textual form.
    ///
    /// # Examples
    /// ```
    /// use jobboard::domain::UserId;
    ///
    /// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
    /// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    /// ```
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
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

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Browses postings and applies to them.
    Regular,
    /// Manages postings and adjudicates applicants.
    Administrator,
}

impl Role {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Administrator => "administrator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(Self::Regular),
            "administrator" => Ok(Self::Administrator),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// Minimum allowed length for a username.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 32;
/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 64;
/// Maximum allowed length for a profile link.
pub const PROFILE_LINK_MAX: usize = 256;

static USERNAME_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn username_regex() -> Option<&'static Regex> {
    USERNAME_RE
        .get_or_init(|| Regex::new("^[A-Za-z0-9._-]+$").ok())
        .as_ref()
}

/// Unique login name.
///
/// ## Invariants
/// - Trimmed of surrounding whitespace.
/// - Between [`USERNAME_MIN`] and [`USERNAME_MAX`] characters.
/// - Letters, digits, `.`, `_` and `-` only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(username: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = username.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        let length = trimmed.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
            return Err(UserValidationError::UsernameLength {
                min: USERNAME_MIN,
                max: USERNAME_MAX,
            });
        }
        let valid = username_regex().is_some_and(|re| re.is_match(trimmed));
        if !valid {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Human readable full name shown to administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`]; surrounding whitespace is trimmed.
    pub fn new(display_name: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = display_name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Optional public profile links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileLinks {
    pub linkedin: Option<String>,
    pub github: Option<String>,
}

impl ProfileLinks {
    /// Build links from raw inputs; blank values are treated as absent.
    ///
    /// # Examples
    /// ```
    /// use jobboard::domain::ProfileLinks;
    ///
    /// let links = ProfileLinks::try_from_parts(Some(" "), Some("https://github.com/ada")).unwrap();
    /// assert!(links.linkedin.is_none());
    /// assert_eq!(links.github.as_deref(), Some("https://github.com/ada"));
    /// ```
    pub fn try_from_parts(
        linkedin: Option<&str>,
        github: Option<&str>,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            linkedin: normalise_link(linkedin)?,
            github: normalise_link(github)?,
        })
    }
}

fn normalise_link(raw: Option<&str>) -> Result<Option<String>, UserValidationError> {
    let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    if value.chars().count() > PROFILE_LINK_MAX {
        return Err(UserValidationError::ProfileLinkTooLong {
            max: PROFILE_LINK_MAX,
        });
    }
    Ok(Some(value.to_owned()))
}

/// Opaque password hash produced by a [`crate::domain::ports::CredentialHasher`].
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialHash(String);

impl CredentialHash {
    /// Wrap a hash string produced by a hasher or loaded from storage.
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Encoded hash for persistence adapters and verifiers.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialHash(..)")
    }
}

/// Stored user account.
///
/// `applications` is the user-side half of the application ledger; only the
/// ledger mutates it. `revision` starts at 1 and is bumped on every save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub credential_hash: CredentialHash,
    pub display_name: DisplayName,
    pub role: Role,
    pub profile_links: ProfileLinks,
    pub applications: Vec<ApplicationRef>,
    pub revision: u32,
}

impl User {
    /// Public view of the account without credential material.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
            profile_links: self.profile_links.clone(),
        }
    }

    /// Find the application this user holds on `posting_id`.
    pub fn application(&self, posting_id: &PostingId) -> Option<&ApplicationRef> {
        self.applications
            .iter()
            .find(|entry| entry.posting_id == *posting_id)
    }
}

/// Public user details returned to adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub username: Username,
    pub display_name: DisplayName,
    pub role: Role,
    pub profile_links: ProfileLinks,
}
