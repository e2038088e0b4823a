//! Token identifier type.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a token: the reward token, or a pool's stake token.
///
/// Stake tokens are usually LP pair addresses; the engine never inspects them
/// beyond equality.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenId(String);

impl TokenId {
    /// Create a token id from a raw string.
    ///
    /// # Panics
    /// Panics if the string is empty or contains whitespace.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(Self::check(&s).is_ok(), "invalid token id: {s:?}");
        Self(s)
    }

    fn check(s: &str) -> Result<(), TypesError> {
        if s.is_empty() {
            return Err(TypesError::EmptyTokenId);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(TypesError::InvalidTokenId(s.to_string()));
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TokenId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::check(s)?;
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_display() {
        let token: TokenId = "FAST/BNB".parse().unwrap();
        assert_eq!(token.to_string(), "FAST/BNB");
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!("".parse::<TokenId>(), Err(TypesError::EmptyTokenId));
        assert!(matches!(
            "LP token".parse::<TokenId>(),
            Err(TypesError::InvalidTokenId(_))
        ));
    }
}
