//! Write batches: a set of writes a backend applies in one transaction.

use chef_types::{AccountId, PoolId};

/// Writes collected by the engine and committed all-or-nothing.
#[derive(Debug, Default)]
pub struct ChefBatch {
    pub pools: Vec<(PoolId, Vec<u8>)>,
    pub positions: Vec<(PoolId, AccountId, Vec<u8>)>,
    pub meta: Vec<(Vec<u8>, Vec<u8>)>,
    /// Drop every stored position not rewritten by this batch.
    pub replace_positions: bool,
}

impl ChefBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// A batch that replaces the whole position table with its own contents.
    pub fn snapshot() -> Self {
        Self {
            replace_positions: true,
            ..Self::default()
        }
    }

    pub fn put_pool(&mut self, pool_id: PoolId, bytes: Vec<u8>) {
        self.pools.push((pool_id, bytes));
    }

    pub fn put_position(&mut self, pool_id: PoolId, account: AccountId, bytes: Vec<u8>) {
        self.positions.push((pool_id, account, bytes));
    }

    pub fn put_meta(&mut self, key: &[u8], value: Vec<u8>) {
        self.meta.push((key.to_vec(), value));
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
            && self.positions.is_empty()
            && self.meta.is_empty()
            && !self.replace_positions
    }
}
