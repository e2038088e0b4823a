//! Engine state tables: pools, positions and metadata, with their key codecs.

use crate::{ChefBatch, StoreError};
use chef_types::{AccountId, PoolId};

/// Metadata key holding the serialized engine header (owner, schedule, vault).
pub const META_ENGINE: &[u8] = b"engine";

/// Metadata key holding the big-endian `u32` schema version.
pub const META_SCHEMA_VERSION: &[u8] = b"schema_version";

/// Store trait for persisting Chef engine state to durable storage.
///
/// Uses opaque `Vec<u8>` values so the store doesn't depend on the engine
/// crate. Writes only happen through [`ChefStore::write_batch`], which must
/// apply the whole batch or nothing.
pub trait ChefStore {
    fn get_pool(&self, pool_id: PoolId) -> Result<Option<Vec<u8>>, StoreError>;

    /// All pools, ordered by pool id.
    fn iter_pools(&self) -> Result<Vec<(PoolId, Vec<u8>)>, StoreError>;

    fn get_position(
        &self,
        pool_id: PoolId,
        account: &AccountId,
    ) -> Result<Option<Vec<u8>>, StoreError>;

    /// All positions, ordered by pool id then account.
    fn iter_positions(&self) -> Result<Vec<(PoolId, AccountId, Vec<u8>)>, StoreError>;

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Apply every write in `batch` atomically.
    fn write_batch(&self, batch: ChefBatch) -> Result<(), StoreError>;
}

/// Encode a position key as `pool_id (big-endian) ++ account bytes`.
///
/// Big-endian ids keep byte-ordered backends iterating in pool order.
pub fn position_key(pool_id: PoolId, account: &AccountId) -> Vec<u8> {
    let mut key = Vec::with_capacity(4 + account.as_str().len());
    key.extend_from_slice(&pool_id.to_be_bytes());
    key.extend_from_slice(account.as_str().as_bytes());
    key
}

/// Decode a key produced by [`position_key`].
pub fn decode_position_key(key: &[u8]) -> Result<(PoolId, AccountId), StoreError> {
    if key.len() <= 4 {
        return Err(StoreError::Corruption(format!(
            "position key too short: {} bytes",
            key.len()
        )));
    }
    let mut id = [0u8; 4];
    id.copy_from_slice(&key[..4]);
    let account = std::str::from_utf8(&key[4..])
        .map_err(|e| StoreError::Corruption(e.to_string()))?
        .parse::<AccountId>()
        .map_err(|e| StoreError::Corruption(e.to_string()))?;
    Ok((PoolId::from_be_bytes(id), account))
}

/// Decode a big-endian pool id key.
pub fn decode_pool_key(key: &[u8]) -> Result<PoolId, StoreError> {
    let bytes: [u8; 4] = key
        .try_into()
        .map_err(|_| StoreError::Corruption(format!("pool key has {} bytes", key.len())))?;
    Ok(PoolId::from_be_bytes(bytes))
}
