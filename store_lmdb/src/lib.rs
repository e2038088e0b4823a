//! LMDB storage backend for the Chef reward engine.
//!
//! Implements [`chef_store::ChefStore`] using the `heed` LMDB bindings. Pools,
//! positions and metadata live in three named databases inside one
//! environment, so a write batch commits in a single transaction.

pub mod chef;
pub mod environment;
pub mod error;

pub use chef::LmdbChefStore;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
