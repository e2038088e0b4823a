//! LMDB environment setup.

use crate::LmdbError;
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use std::path::Path;
use std::sync::Arc;

/// Default map size: 1 GiB is far beyond what a pool registry needs.
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

const POOLS_DB: &str = "pools";
const POSITIONS_DB: &str = "positions";
const META_DB: &str = "meta";

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    pub(crate) pools_db: Database<Bytes, Bytes>,
    pub(crate) positions_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given directory.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;
        // SAFETY: the environment is opened once per directory by this process
        // and never memory-mapped by another handle concurrently.
        let env = unsafe { EnvOpenOptions::new().map_size(map_size).max_dbs(3).open(path)? };

        let mut txn = env.write_txn()?;
        let pools_db = env.create_database(&mut txn, Some(POOLS_DB))?;
        let positions_db = env.create_database(&mut txn, Some(POSITIONS_DB))?;
        let meta_db = env.create_database(&mut txn, Some(META_DB))?;
        txn.commit()?;

        tracing::debug!(path = %path.display(), map_size, "opened LMDB environment");
        Ok(Self {
            env: Arc::new(env),
            pools_db,
            positions_db,
            meta_db,
        })
    }

    /// Open with [`DEFAULT_MAP_SIZE`].
    pub fn open_default(path: &Path) -> Result<Self, LmdbError> {
        Self::open(path, DEFAULT_MAP_SIZE)
    }

    pub fn env(&self) -> &Env {
        &self.env
    }
}
