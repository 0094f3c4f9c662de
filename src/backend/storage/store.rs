// src/backend/storage/store.rs
use crate::error::WillError;
use crate::models::{
    common::{AssetId, PrincipalId, RecipientId, WillId, WillType},
    Allocation, Asset, Recipient, Will,
};
use crate::storage::counters::{self, IdKind};
use crate::storage::{allocations, assets, recipients, wills};

/// Data-access boundary used by the services.
///
/// Owner-scoped reads hide rows that belong to other principals, so a foreign
/// id behaves exactly like a missing one.
pub trait WillStore {
    fn next_id(&self, kind: IdKind) -> Result<u64, WillError>;

    // --- Wills ---
    fn get_will(&self, owner: &PrincipalId, will_id: WillId) -> Option<Will>;
    fn get_will_by_type(&self, owner: &PrincipalId, will_type: WillType) -> Option<Will>;
    fn list_wills(&self, owner: &PrincipalId) -> Vec<Will>;
    fn insert_will(&self, will: &Will) -> Result<(), WillError>;
    fn update_will(&self, will: &Will) -> Result<(), WillError>;

    // --- Assets ---
    fn get_asset(&self, owner: &PrincipalId, asset_id: AssetId) -> Option<Asset>;
    fn list_assets(&self, owner: &PrincipalId) -> Vec<Asset>;
    fn put_asset(&self, asset: &Asset) -> Result<(), WillError>;
    /// Deletes the asset and cascades to its allocation rows.
    fn delete_asset(&self, owner: &PrincipalId, asset_id: AssetId) -> Result<Asset, WillError>;

    // --- Recipients ---
    fn get_recipient(&self, owner: &PrincipalId, recipient_id: RecipientId) -> Option<Recipient>;
    fn list_recipients(&self, owner: &PrincipalId) -> Vec<Recipient>;
    fn put_recipient(&self, recipient: &Recipient) -> Result<(), WillError>;
    /// Deletes the recipient and cascades to every allocation row referencing it.
    /// Returns the recipient and the ids of the assets that lost a row.
    fn delete_recipient(
        &self,
        owner: &PrincipalId,
        recipient_id: RecipientId,
    ) -> Result<(Recipient, Vec<AssetId>), WillError>;

    // --- Allocations ---
    fn list_allocations_for_asset(&self, asset_id: AssetId) -> Vec<Allocation>;
    fn list_allocations_for_owner(&self, owner: &PrincipalId) -> Vec<Allocation>;
    fn delete_allocations_for_asset(&self, asset_id: AssetId) -> Result<usize, WillError>;
    fn insert_allocations(&self, rows: &[Allocation]) -> Result<(), WillError>;
    fn allocation_version(&self, asset_id: AssetId) -> u64;
    fn bump_allocation_version(&self, asset_id: AssetId) -> Result<u64, WillError>;
}

/// The canister's stable-memory store.
#[derive(Clone, Copy, Debug, Default)]
pub struct StableStore;

impl WillStore for StableStore {
    fn next_id(&self, kind: IdKind) -> Result<u64, WillError> {
        counters::next_id(kind)
    }

    fn get_will(&self, owner: &PrincipalId, will_id: WillId) -> Option<Will> {
        wills::get_will(will_id).filter(|w| w.owner == *owner)
    }

    fn get_will_by_type(&self, owner: &PrincipalId, will_type: WillType) -> Option<Will> {
        wills::get_will_by_type(owner, will_type)
    }

    fn list_wills(&self, owner: &PrincipalId) -> Vec<Will> {
        wills::get_wills_by_owner(owner)
    }

    fn insert_will(&self, will: &Will) -> Result<(), WillError> {
        wills::insert_will(will)
    }

    fn update_will(&self, will: &Will) -> Result<(), WillError> {
        wills::update_will(will)
    }

    fn get_asset(&self, owner: &PrincipalId, asset_id: AssetId) -> Option<Asset> {
        assets::get_asset(asset_id).filter(|a| a.owner == *owner)
    }

    fn list_assets(&self, owner: &PrincipalId) -> Vec<Asset> {
        assets::get_assets_by_owner(owner)
    }

    fn put_asset(&self, asset: &Asset) -> Result<(), WillError> {
        match assets::get_asset(asset.asset_id) {
            Some(existing) if existing.owner != asset.owner => Err(WillError::NotAuthorized(format!(
                "Asset {} belongs to another owner",
                asset.asset_id
            ))),
            _ => {
                assets::insert_asset(asset);
                Ok(())
            }
        }
    }

    fn delete_asset(&self, owner: &PrincipalId, asset_id: AssetId) -> Result<Asset, WillError> {
        if self.get_asset(owner, asset_id).is_none() {
            return Err(WillError::NotFound(format!("Asset {}", asset_id)));
        }
        allocations::remove_allocations_by_asset(asset_id);
        allocations::remove_version(asset_id);
        assets::remove_asset(asset_id).ok_or_else(|| WillError::NotFound(format!("Asset {}", asset_id)))
    }

    fn get_recipient(&self, owner: &PrincipalId, recipient_id: RecipientId) -> Option<Recipient> {
        recipients::get_recipient(recipient_id).filter(|r| r.owner == *owner)
    }

    fn list_recipients(&self, owner: &PrincipalId) -> Vec<Recipient> {
        recipients::get_recipients_by_owner(owner)
    }

    fn put_recipient(&self, recipient: &Recipient) -> Result<(), WillError> {
        match recipients::get_recipient(recipient.recipient_id) {
            Some(existing) if existing.owner != recipient.owner => Err(WillError::NotAuthorized(format!(
                "Recipient {} belongs to another owner",
                recipient.recipient_id
            ))),
            _ => {
                recipients::insert_recipient(recipient);
                Ok(())
            }
        }
    }

    fn delete_recipient(
        &self,
        owner: &PrincipalId,
        recipient_id: RecipientId,
    ) -> Result<(Recipient, Vec<AssetId>), WillError> {
        if self.get_recipient(owner, recipient_id).is_none() {
            return Err(WillError::NotFound(format!("Recipient {}", recipient_id)));
        }
        let mut touched = allocations::remove_allocations_by_recipient(recipient_id);
        touched.sort_unstable();
        touched.dedup();
        for asset_id in &touched {
            allocations::bump_version(*asset_id);
        }
        let recipient = recipients::remove_recipient(recipient_id)
            .ok_or_else(|| WillError::NotFound(format!("Recipient {}", recipient_id)))?;
        Ok((recipient, touched))
    }

    fn list_allocations_for_asset(&self, asset_id: AssetId) -> Vec<Allocation> {
        allocations::get_allocations_by_asset(asset_id)
    }

    fn list_allocations_for_owner(&self, owner: &PrincipalId) -> Vec<Allocation> {
        allocations::get_allocations_by_owner(owner)
    }

    fn delete_allocations_for_asset(&self, asset_id: AssetId) -> Result<usize, WillError> {
        Ok(allocations::remove_allocations_by_asset(asset_id))
    }

    fn insert_allocations(&self, rows: &[Allocation]) -> Result<(), WillError> {
        allocations::insert_allocations(rows)
    }

    fn allocation_version(&self, asset_id: AssetId) -> u64 {
        allocations::get_version(asset_id)
    }

    fn bump_allocation_version(&self, asset_id: AssetId) -> Result<u64, WillError> {
        Ok(allocations::bump_version(asset_id))
    }
}
