//! Account identifier type.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of a depositor, the owner, or the migrator.
///
/// The engine treats identities as opaque: whatever the host uses to name a
/// caller (a hex address, a public key encoding) is stored verbatim.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create an account id from a raw string.
    ///
    /// # Panics
    /// Panics if the string is empty or contains whitespace. Use
    /// [`str::parse`] for untrusted input.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(Self::check(&s).is_ok(), "invalid account id: {s:?}");
        Self(s)
    }

    fn check(s: &str) -> Result<(), TypesError> {
        if s.is_empty() {
            return Err(TypesError::EmptyAccountId);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(TypesError::InvalidAccountId(s.to_string()));
        }
        Ok(())
    }

    /// Return the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::check(s)?;
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
