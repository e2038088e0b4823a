//! Errors raised while parsing identifiers.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("account id must not be empty")]
    EmptyAccountId,

    #[error("account id contains whitespace: {0:?}")]
    InvalidAccountId(String),

    #[error("token id must not be empty")]
    EmptyTokenId,

    #[error("token id contains whitespace: {0:?}")]
    InvalidTokenId(String),
}
