//! Abstract storage traits for the Chef reward engine.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The engine depends only on the traits and serializes its own types.

pub mod batch;
pub mod chef;
pub mod error;

pub use batch::ChefBatch;
pub use chef::{
    decode_pool_key, decode_position_key, position_key, ChefStore, META_ENGINE,
    META_SCHEMA_VERSION,
};
pub use error::StoreError;
