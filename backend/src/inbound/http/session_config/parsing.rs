//! Reading and resolving individual session toggles.

use actix_web::cookie::SameSite;
use tracing::warn;

use super::{BuildMode, SessionConfigError, SessionEnv};

pub(super) const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
pub(super) const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// A toggle as found in the settings source.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum RawToggle<T> {
    Parsed(T),
    Malformed(String),
    Absent,
}

/// Look up `name` and parse it with `parse`.
pub(super) fn read_toggle<E, T>(env: &E, name: &str, parse: fn(&str) -> Option<T>) -> RawToggle<T>
where
    E: SessionEnv,
{
    match env.string(name) {
        None => RawToggle::Absent,
        Some(value) => match parse(value.trim()) {
            Some(parsed) => RawToggle::Parsed(parsed),
            None => RawToggle::Malformed(value),
        },
    }
}

/// Name, accepted spellings and debug fallback of one toggle.
pub(super) struct Toggle<T> {
    pub(super) name: &'static str,
    pub(super) expected: &'static str,
    pub(super) fallback: T,
}

impl<T: std::fmt::Debug> Toggle<T> {
    /// Settle a raw value: debug builds fall back with a warning, release
    /// builds reject anything absent or malformed.
    pub(super) fn resolve(self, raw: RawToggle<T>, mode: BuildMode) -> Result<T, SessionConfigError> {
        let error = match raw {
            RawToggle::Parsed(value) => return Ok(value),
            RawToggle::Absent => SessionConfigError::MissingEnv { name: self.name },
            RawToggle::Malformed(value) => SessionConfigError::InvalidEnv {
                name: self.name,
                value,
                expected: self.expected,
            },
        };
        if mode.is_debug() {
            warn!(fallback = ?self.fallback, "{error}; using fallback");
            Ok(self.fallback)
        } else {
            Err(error)
        }
    }
}

pub(super) fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

pub(super) fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.to_ascii_lowercase().as_str() {
        "lax" => Some(SameSite::Lax),
        "strict" => Some(SameSite::Strict),
        "none" => Some(SameSite::None),
        _ => None,
    }
}
