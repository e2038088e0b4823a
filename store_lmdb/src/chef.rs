use crate::environment::LmdbEnvironment;
use crate::LmdbError;
use chef_store::{
    decode_pool_key, decode_position_key, position_key, ChefBatch, ChefStore, StoreError,
};
use chef_types::{AccountId, PoolId};
use std::path::Path;

/// LMDB-backed [`ChefStore`].
pub struct LmdbChefStore {
    env: LmdbEnvironment,
}

impl LmdbChefStore {
    pub fn new(env: LmdbEnvironment) -> Self {
        Self { env }
    }

    /// Open (or create) a store in `dir` with the default map size.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        Ok(Self::new(LmdbEnvironment::open_default(dir)?))
    }
}

impl ChefStore for LmdbChefStore {
    fn get_pool(&self, pool_id: PoolId) -> Result<Option<Vec<u8>>, StoreError> {
        let txn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let value = self
            .env
            .pools_db
            .get(&txn, &pool_id.to_be_bytes())
            .map_err(LmdbError::from)?;
        Ok(value.map(<[u8]>::to_vec))
    }

    fn iter_pools(&self) -> Result<Vec<(PoolId, Vec<u8>)>, StoreError> {
        let txn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let mut results = Vec::new();
        let iter = self.env.pools_db.iter(&txn).map_err(LmdbError::from)?;
        for item in iter {
            let (key, val) = item.map_err(LmdbError::from)?;
            results.push((decode_pool_key(key)?, val.to_vec()));
        }
        Ok(results)
    }

    fn get_position(
        &self,
        pool_id: PoolId,
        account: &AccountId,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        let txn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let value = self
            .env
            .positions_db
            .get(&txn, &position_key(pool_id, account))
            .map_err(LmdbError::from)?;
        Ok(value.map(<[u8]>::to_vec))
    }

    fn iter_positions(&self) -> Result<Vec<(PoolId, AccountId, Vec<u8>)>, StoreError> {
        let txn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let mut results = Vec::new();
        let iter = self.env.positions_db.iter(&txn).map_err(LmdbError::from)?;
        for item in iter {
            let (key, val) = item.map_err(LmdbError::from)?;
            let (pool_id, account) = decode_position_key(key)?;
            results.push((pool_id, account, val.to_vec()));
        }
        Ok(results)
    }

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let txn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let value = self.env.meta_db.get(&txn, key).map_err(LmdbError::from)?;
        Ok(value.map(<[u8]>::to_vec))
    }

    fn write_batch(&self, batch: ChefBatch) -> Result<(), StoreError> {
        // Dropping the txn on any early return aborts every write below.
        let mut txn = self.env.env().write_txn().map_err(LmdbError::from)?;
        if batch.replace_positions {
            self.env
                .positions_db
                .clear(&mut txn)
                .map_err(LmdbError::from)?;
        }
        for (pool_id, bytes) in &batch.pools {
            self.env
                .pools_db
                .put(&mut txn, &pool_id.to_be_bytes(), bytes)
                .map_err(LmdbError::from)?;
        }
        for (pool_id, account, bytes) in &batch.positions {
            self.env
                .positions_db
                .put(&mut txn, &position_key(*pool_id, account), bytes)
                .map_err(LmdbError::from)?;
        }
        for (key, value) in &batch.meta {
            self.env
                .meta_db
                .put(&mut txn, key, value)
                .map_err(LmdbError::from)?;
        }
        txn.commit().map_err(LmdbError::from)?;
        tracing::trace!(
            pools = batch.pools.len(),
            positions = batch.positions.len(),
            meta = batch.meta.len(),
            "committed chef batch"
        );
        Ok(())
    }
}
