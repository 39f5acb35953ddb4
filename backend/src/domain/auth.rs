//! Authentication and registration inputs.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.
//! Raw passwords are held in [`Zeroizing`] buffers.

use zeroize::Zeroizing;

use super::{DisplayName, ProfileLinks, UserValidationError, Username};

/// Longest password, in bytes, a credential hash can tell apart.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Domain error returned when login or registration values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Password exceeded [`MAX_PASSWORD_BYTES`].
    #[error("password must be at most {max} bytes")]
    PasswordTooLong { max: usize },
    /// A profile field failed validation.
    #[error(transparent)]
    Profile(#[from] UserValidationError),
}

impl CredentialsValidationError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyUsername => "username",
            Self::EmptyPassword | Self::PasswordTooLong { .. } => "password",
            Self::Profile(
                UserValidationError::EmptyUsername
                | UserValidationError::UsernameLength { .. }
                | UserValidationError::UsernameInvalidCharacters,
            ) => "username",
            Self::Profile(
                UserValidationError::EmptyDisplayName | UserValidationError::DisplayNameTooLong { .. },
            ) => "displayName",
            Self::Profile(UserValidationError::ProfileLinkTooLong { .. }) => "profileLinks",
            Self::Profile(_) => "user",
        }
    }
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace. Overlong passwords are accepted here and simply never
///   verify, so login failures stay indistinguishable.
///
/// # Examples
/// ```
/// use jobboard::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada ", "pw").unwrap();
/// assert_eq!(creds.username(), "ada");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(CredentialsValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Raw registration inputs collected by an adapter.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationInput<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
    pub display_name: &'a str,
    pub linkedin: Option<&'a str>,
    pub github: Option<&'a str>,
}

/// Validated registration request.
///
/// Shape validation happens here; whether the username is free and whether
/// the confirmation matches are business outcomes decided by the identity
/// service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: Username,
    password: Zeroizing<String>,
    confirm_password: Zeroizing<String>,
    display_name: DisplayName,
    profile_links: ProfileLinks,
}

impl Registration {
    /// Validate raw registration inputs.
    ///
    /// # Examples
    /// ```
    /// use jobboard::domain::{Registration, RegistrationInput};
    ///
    /// let registration = Registration::try_from_input(RegistrationInput {
    ///     username: "ada",
    ///     password: "pw",
    ///     confirm_password: "pw",
    ///     display_name: "Ada Lovelace",
    ///     linkedin: None,
    ///     github: None,
    /// })
    /// .unwrap();
    /// assert!(registration.passwords_match());
    /// ```
    pub fn try_from_input(input: RegistrationInput<'_>) -> Result<Self, CredentialsValidationError> {
        if input.username.trim().is_empty() {
            return Err(CredentialsValidationError::EmptyUsername);
        }
        let username = Username::new(input.username)?;
        if input.password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        if input.password.len() > MAX_PASSWORD_BYTES {
            return Err(CredentialsValidationError::PasswordTooLong {
                max: MAX_PASSWORD_BYTES,
            });
        }
        let display_name = DisplayName::new(input.display_name)?;
        let profile_links = ProfileLinks::try_from_parts(input.linkedin, input.github)?;
        Ok(Self {
            username,
            password: Zeroizing::new(input.password.to_owned()),
            confirm_password: Zeroizing::new(input.confirm_password.to_owned()),
            display_name,
            profile_links,
        })
    }

    /// Requested username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Requested password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Whether the password and its confirmation are identical.
    pub fn passwords_match(&self) -> bool {
        self.password.as_str() == self.confirm_password.as_str()
    }

    /// Requested display name.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Requested profile links.
    pub fn profile_links(&self) -> &ProfileLinks {
        &self.profile_links
    }
}
