//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains whitespace.
    #[error("email cannot contain spaces")]
    Whitespace,
    /// The input is not of the form `name@domain.tld`.
    #[error("email must look like name@domain.com")]
    Malformed,
}

/// A validated email address.
///
/// Validation is the pragmatic storefront-form kind, not full RFC 5322:
/// a non-empty local part, exactly one `@`, and a domain with at least
/// one interior dot.
///
/// ## Examples
///
/// ```
/// use marigold_core::Email;
///
/// assert!(Email::parse("fern@example.com").is_ok());
/// assert!(Email::parse("fern.callow+cart@shop.co.uk").is_ok());
///
/// assert!(Email::parse("").is_err());            // empty
/// assert!(Email::parse("fern.example.com").is_err()); // missing @
/// assert!(Email::parse("fern@localhost").is_err());   // no dot in domain
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] describing the first rule the input
    /// violates.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::Whitespace);
        }

        let Some((local, domain)) = s.split_once('@') else {
            return Err(EmailError::Malformed);
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(EmailError::Malformed);
        }
        // The domain needs an interior dot: "a@b." and "a@.b" both fail.
        let has_interior_dot = domain
            .char_indices()
            .any(|(i, c)| c == '.' && i > 0 && i < domain.len() - 1);
        if !has_interior_dot {
            return Err(EmailError::Malformed);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_emails() {
        assert!(Email::parse("fern@example.com").is_ok());
        assert!(Email::parse("fern.callow@example.com").is_ok());
        assert!(Email::parse("fern+tag@shop.example.com").is_ok());
        assert!(Email::parse("f@e.co").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}@example.com", "f".repeat(250));
        assert_eq!(
            Email::parse(&long),
            Err(EmailError::TooLong {
                max: Email::MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_parse_whitespace() {
        assert_eq!(
            Email::parse("fern callow@example.com"),
            Err(EmailError::Whitespace)
        );
    }

    #[test]
    fn test_parse_malformed() {
        assert_eq!(Email::parse("fern.example.com"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("@example.com"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("fern@"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("fern@a@b.com"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("fern@localhost"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("fern@example."), Err(EmailError::Malformed));
        assert_eq!(Email::parse("fern@.com"), Err(EmailError::Malformed));
    }

    #[test]
    fn test_display_and_as_str() {
        let email = Email::parse("fern@example.com").unwrap();
        assert_eq!(format!("{email}"), "fern@example.com");
        assert_eq!(email.as_str(), "fern@example.com");
    }

    #[test]
    fn test_serde_roundtrip() {
        let email = Email::parse("fern@example.com").unwrap();
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"fern@example.com\"");

        let parsed: Email = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, email);
    }

    #[test]
    fn test_from_str() {
        let email: Email = "fern@example.com".parse().unwrap();
        assert_eq!(email.as_str(), "fern@example.com");
    }
}
