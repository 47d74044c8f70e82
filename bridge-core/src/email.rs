//! Validated email address newtype.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::error::CoreError;

/// A syntactically valid email address.
///
/// Equality and hashing use the lowercase form, so `Alice@Example.com` and
/// `alice@example.com` identify the same person. [`Email::as_str`] keeps the
/// address as it was written (minus surrounding whitespace).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email {
    address: String,
    normalized: String,
}

impl Email {
    /// Parses and validates an address.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidEmail`] if the trimmed input is empty or is
    /// not a valid address.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let address = value.trim();
        if address.is_empty() || !address.validate_email() {
            return Err(CoreError::InvalidEmail {
                value: value.to_owned(),
            });
        }
        Ok(Self {
            address: address.to_owned(),
            normalized: address.to_lowercase(),
        })
    }

    /// The address as submitted.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.address
    }

    /// The lowercase form used for identity comparison.
    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

impl PartialEq for Email {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for Email {}

impl Hash for Email {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

impl TryFrom<String> for Email {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_parse_trims_and_keeps_case() {
        let email = match Email::parse("  Dylan@Storj.io ") {
            Ok(e) => e,
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert_eq!(email.as_str(), "Dylan@Storj.io");
        assert_eq!(email.normalized(), "dylan@storj.io");
    }

    #[test]
    fn email_parse_rejects_malformed() {
        for bad in ["", "   ", "not-an-email", "a@", "@b.com", "two@@example.com"] {
            assert!(
                matches!(Email::parse(bad), Err(CoreError::InvalidEmail { .. })),
                "'{bad}' must be rejected"
            );
        }
    }

    #[test]
    fn email_equality_ignores_case() {
        let a = Email::parse("sender@example.com");
        let b = Email::parse("SENDER@example.COM");
        match (a, b) {
            (Ok(a), Ok(b)) => assert_eq!(a, b, "case must not affect identity"),
            other => panic!("unexpected parse result: {other:?}"),
        }
    }

    #[test]
    fn email_deserialize_validates() {
        let ok: Result<Email, _> = serde_json::from_str("\"ok@example.com\"");
        assert!(ok.is_ok());
        let bad: Result<Email, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err(), "invalid address must fail deserialization");
    }

    proptest::proptest! {
        #[test]
        fn proptest_email_parse_never_panics(input in ".{0,64}") {
            let _ = Email::parse(&input);
        }
    }
}
