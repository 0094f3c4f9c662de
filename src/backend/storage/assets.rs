// src/backend/storage/assets.rs
use crate::models::asset::Asset;
use crate::models::common::{AssetId, PrincipalId};
use crate::storage::memory::{get_assets_memory, Memory};
use crate::storage::storable::Cbor;
use ic_stable_structures::StableBTreeMap;
use std::cell::RefCell;

type StorableAsset = Cbor<Asset>;

thread_local! {
    /// Assets: Key = AssetId, Value = Asset
    static ASSETS: RefCell<StableBTreeMap<AssetId, StorableAsset, Memory>> = RefCell::new(
        StableBTreeMap::init(get_assets_memory())
    );
}

/// Inserts or updates an asset. Returns the previous value if any.
pub fn insert_asset(asset: &Asset) -> Option<Asset> {
    ASSETS.with(|map_ref| {
        map_ref
            .borrow_mut()
            .insert(asset.asset_id, Cbor(asset.clone()))
            .map(|prev| prev.0)
    })
}

pub fn get_asset(asset_id: AssetId) -> Option<Asset> {
    ASSETS.with(|map_ref| map_ref.borrow().get(&asset_id).map(|cbor| cbor.0))
}

/// Removes the asset row only; callers cascade to allocations.
pub fn remove_asset(asset_id: AssetId) -> Option<Asset> {
    ASSETS.with(|map_ref| map_ref.borrow_mut().remove(&asset_id).map(|cbor| cbor.0))
}

pub fn get_assets_by_owner(owner: &PrincipalId) -> Vec<Asset> {
    ASSETS.with(|map_ref| {
        map_ref
            .borrow()
            .iter()
            .map(|(_id, cbor)| cbor.0)
            .filter(|asset| asset.owner == *owner)
            .collect()
    })
}
