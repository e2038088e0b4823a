//! Fundamental types for the Chef reward engine.
//!
//! This crate defines the identifiers and time primitives shared across every
//! other crate in the workspace: accounts, tokens, pool ids, timestamps and the
//! clock abstraction the engine reads time through.

pub mod account;
pub mod error;
pub mod time;
pub mod token;

pub use account::AccountId;
pub use error::TypesError;
pub use time::{Clock, SystemClock, Timestamp, SECONDS_PER_DAY};
pub use token::TokenId;

/// Stable index of a pool in the registry, equal to its insertion order.
pub type PoolId = u32;
