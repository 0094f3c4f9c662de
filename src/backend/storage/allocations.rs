// src/backend/storage/allocations.rs
use crate::error::WillError;
use crate::models::allocation::Allocation;
use crate::models::common::{AssetId, PrincipalId, RecipientId};
use crate::storage::memory::{get_allocation_versions_memory, get_allocations_memory, Memory};
use crate::storage::storable::Cbor;
use ic_stable_structures::StableBTreeMap;
use std::cell::RefCell;

type StorableAllocation = Cbor<Allocation>;

thread_local! {
    /// Allocations: Key = (AssetId, RecipientId), Value = Allocation.
    /// The composite key is the (asset, recipient) uniqueness constraint.
    static ALLOCATIONS: RefCell<StableBTreeMap<(AssetId, RecipientId), StorableAllocation, Memory>> = RefCell::new(
        StableBTreeMap::init(get_allocations_memory())
    );

    /// Allocation set version per asset, bumped on every write to the set.
    static VERSIONS: RefCell<StableBTreeMap<AssetId, u64, Memory>> = RefCell::new(
        StableBTreeMap::init(get_allocation_versions_memory())
    );
}

/// Retrieves all allocation rows of an asset, ordered by recipient id.
pub fn get_allocations_by_asset(asset_id: AssetId) -> Vec<Allocation> {
    ALLOCATIONS.with(|map_ref| {
        map_ref
            .borrow()
            .range((asset_id, RecipientId::MIN)..=(asset_id, RecipientId::MAX))
            .map(|(_key, cbor)| cbor.0)
            .collect()
    })
}

pub fn get_allocations_by_owner(owner: &PrincipalId) -> Vec<Allocation> {
    ALLOCATIONS.with(|map_ref| {
        map_ref
            .borrow()
            .iter()
            .map(|(_key, cbor)| cbor.0)
            .filter(|allocation| allocation.owner == *owner)
            .collect()
    })
}

/// Deletes every row of an asset. Returns the number of removed rows.
pub fn remove_allocations_by_asset(asset_id: AssetId) -> usize {
    ALLOCATIONS.with(|map_ref| {
        let mut map = map_ref.borrow_mut();
        let keys: Vec<(AssetId, RecipientId)> = map
            .range((asset_id, RecipientId::MIN)..=(asset_id, RecipientId::MAX))
            .map(|(key, _)| key)
            .collect();
        for key in &keys {
            map.remove(key);
        }
        keys.len()
    })
}

/// Deletes every row referencing a recipient. Returns the affected asset ids.
pub fn remove_allocations_by_recipient(recipient_id: RecipientId) -> Vec<AssetId> {
    ALLOCATIONS.with(|map_ref| {
        let mut map = map_ref.borrow_mut();
        let keys: Vec<(AssetId, RecipientId)> = map
            .iter()
            .map(|(key, _)| key)
            .filter(|(_, r)| *r == recipient_id)
            .collect();
        for key in &keys {
            map.remove(key);
        }
        keys.into_iter().map(|(asset_id, _)| asset_id).collect()
    })
}

/// Inserts rows, all or none.
///
/// Enforces the store constraints: unique (asset, recipient) and a share in (0, 100].
pub fn insert_allocations(rows: &[Allocation]) -> Result<(), WillError> {
    ALLOCATIONS.with(|map_ref| {
        let mut map = map_ref.borrow_mut();
        for (i, row) in rows.iter().enumerate() {
            if !row.percentage.is_valid_share() {
                return Err(WillError::PersistenceFailure(format!(
                    "Check constraint violated: allocation {} has share {}",
                    row.allocation_id, row.percentage
                )));
            }
            let key = (row.asset_id, row.recipient_id);
            let repeated_in_batch = rows[..i]
                .iter()
                .any(|other| (other.asset_id, other.recipient_id) == key);
            if repeated_in_batch || map.contains_key(&key) {
                return Err(WillError::PersistenceFailure(format!(
                    "Unique constraint violated: asset {} already allocates to recipient {}",
                    row.asset_id, row.recipient_id
                )));
            }
        }
        for row in rows {
            map.insert((row.asset_id, row.recipient_id), Cbor(row.clone()));
        }
        Ok(())
    })
}

pub fn get_version(asset_id: AssetId) -> u64 {
    VERSIONS.with(|map_ref| map_ref.borrow().get(&asset_id).unwrap_or(0))
}

pub fn bump_version(asset_id: AssetId) -> u64 {
    VERSIONS.with(|map_ref| {
        let mut map = map_ref.borrow_mut();
        let next = map.get(&asset_id).unwrap_or(0).saturating_add(1);
        map.insert(asset_id, next);
        next
    })
}

pub fn remove_version(asset_id: AssetId) {
    VERSIONS.with(|map_ref| {
        map_ref.borrow_mut().remove(&asset_id);
    });
}
