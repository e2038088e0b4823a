//! Nullable store: thread-safe in-memory storage for testing.

use chef_store::{ChefBatch, ChefStore, StoreError};
use chef_types::{AccountId, PoolId};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Tables {
    pools: BTreeMap<PoolId, Vec<u8>>,
    positions: BTreeMap<(PoolId, AccountId), Vec<u8>>,
    meta: BTreeMap<Vec<u8>, Vec<u8>>,
}

/// An in-memory Chef store for testing.
///
/// All tables sit behind one lock, so a batch is applied atomically.
#[derive(Default)]
pub struct NullChefStore {
    tables: Mutex<Tables>,
    /// When set, the next `write_batch` fails without applying anything.
    fail_next_write: Mutex<bool>,
}

impl NullChefStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `write_batch` call fail with a backend error.
    pub fn fail_next_write(&self) {
        *self.fail_next_write.lock().unwrap() = true;
    }

    pub fn pool_count(&self) -> usize {
        self.lock().pools.len()
    }

    pub fn position_count(&self) -> usize {
        self.lock().positions.len()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }
}

impl ChefStore for NullChefStore {
    fn get_pool(&self, pool_id: PoolId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.lock().pools.get(&pool_id).cloned())
    }

    fn iter_pools(&self) -> Result<Vec<(PoolId, Vec<u8>)>, StoreError> {
        Ok(self
            .lock()
            .pools
            .iter()
            .map(|(id, bytes)| (*id, bytes.clone()))
            .collect())
    }

    fn get_position(
        &self,
        pool_id: PoolId,
        account: &AccountId,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .lock()
            .positions
            .get(&(pool_id, account.clone()))
            .cloned())
    }

    fn iter_positions(&self) -> Result<Vec<(PoolId, AccountId, Vec<u8>)>, StoreError> {
        Ok(self
            .lock()
            .positions
            .iter()
            .map(|((id, account), bytes)| (*id, account.clone(), bytes.clone()))
            .collect())
    }

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.lock().meta.get(key).cloned())
    }

    fn write_batch(&self, batch: ChefBatch) -> Result<(), StoreError> {
        {
            let mut fail = self.fail_next_write.lock().unwrap();
            if *fail {
                *fail = false;
                return Err(StoreError::Backend("injected write failure".to_string()));
            }
        }
        let mut tables = self.lock();
        if batch.replace_positions {
            tables.positions.clear();
        }
        for (id, bytes) in batch.pools {
            tables.pools.insert(id, bytes);
        }
        for (id, account, bytes) in batch.positions {
            tables.positions.insert((id, account), bytes);
        }
        for (key, value) in batch.meta {
            tables.meta.insert(key, value);
        }
        Ok(())
    }
}
