//! Username key type.
//!
//! Usernames are the natural key for every user-owned row. Normalizing them in
//! one place keeps lookups consistent between the web and mobile clients,
//! which historically disagreed about casing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum accepted username length.
pub const MAX_USERNAME_LEN: usize = 64;

/// Errors for username parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsernameError {
    /// Username was empty or whitespace.
    #[error("Username cannot be empty")]
    Empty,
    /// Username exceeded the maximum length.
    #[error("Username cannot exceed {MAX_USERNAME_LEN} characters")]
    TooLong,
}

/// A normalized username: trimmed, lowercased, non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Parses and normalizes a raw username.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or too long.
    pub fn parse(raw: &str) -> Result<Self, UsernameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UsernameError::Empty);
        }
        if trimmed.len() > MAX_USERNAME_LEN {
            return Err(UsernameError::TooLong);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// Returns the normalized username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Username {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("alice", "alice")]
    #[case("  Alice  ", "alice")]
    #[case("BOB", "bob")]
    fn test_parse_normalizes(#[case] raw: &str, #[case] expected: &str) {
        let username = Username::parse(raw).expect("should parse");
        assert_eq!(username.as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn test_parse_rejects_blank(#[case] raw: &str) {
        assert_eq!(Username::parse(raw), Err(UsernameError::Empty));
    }

    #[test]
    fn test_parse_rejects_too_long() {
        let raw = "a".repeat(MAX_USERNAME_LEN + 1);
        assert_eq!(Username::parse(&raw), Err(UsernameError::TooLong));
    }

    #[test]
    fn test_display_roundtrip() {
        let username: Username = "Carol".parse().expect("should parse");
        assert_eq!(username.to_string(), "carol");
    }
}
