//! Application records shared by users and postings.
//!
//! Every application exists twice: as an [`ApplicationRef`] on the applicant's
//! [`crate::domain::User`] and as an [`ApplicantRef`] on the
//! [`crate::domain::JobPosting`]. Both halves must always carry the same
//! [`ApplicationStatus`].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{PostingId, UserId};

/// Adjudication status of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Declined,
}

/// Outcome of checking a requested status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    /// The status changes.
    Change,
    /// The requested status equals the current one.
    Unchanged,
    /// The change is not permitted.
    Forbidden,
}

impl ApplicationStatus {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Declined => "declined",
        }
    }

    /// Classify a change from `self` to `next`.
    ///
    /// Pending applications may be approved or declined; approved and
    /// declined are terminal.
    ///
    /// # Examples
    /// ```
    /// use jobboard::domain::{ApplicationStatus, StatusTransition};
    ///
    /// assert_eq!(
    ///     ApplicationStatus::Pending.transition_to(ApplicationStatus::Approved),
    ///     StatusTransition::Change
    /// );
    /// assert_eq!(
    ///     ApplicationStatus::Declined.transition_to(ApplicationStatus::Approved),
    ///     StatusTransition::Forbidden
    /// );
    /// ```
    pub fn transition_to(self, next: Self) -> StatusTransition {
        if self == next {
            return StatusTransition::Unchanged;
        }
        match (self, next) {
            (Self::Pending, Self::Approved | Self::Declined) => StatusTransition::Change,
            _ => StatusTransition::Forbidden,
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown application status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status '{0}'")]
pub struct UnknownApplicationStatus(pub String);

impl std::str::FromStr for ApplicationStatus {
    type Err = UnknownApplicationStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "declined" => Ok(Self::Declined),
            other => Err(UnknownApplicationStatus(other.to_owned())),
        }
    }
}

/// User-side half of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRef {
    pub posting_id: PostingId,
    pub status: ApplicationStatus,
}

/// Posting-side half of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantRef {
    pub user_id: UserId,
    pub status: ApplicationStatus,
}
