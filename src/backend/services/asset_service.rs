// src/backend/services/asset_service.rs
use crate::{
    error::WillError,
    metrics,
    models::{
        audit_log::LogAction,
        common::{AssetId, PrincipalId},
        Asset, AssetInput,
    },
    services::validate_input,
    storage::{audit_logs, IdKind, WillStore},
    utils::{logging, time::now_ns},
};

fn check_asset_input<S: WillStore>(store: &S, owner: &PrincipalId, input: &AssetInput) -> Result<(), WillError> {
    validate_input(input)?;
    if input.name.trim().is_empty() {
        return Err(WillError::InvalidInput("Asset name cannot be blank".to_string()));
    }
    if let Some(value) = &input.estimated_value {
        if !value.has_valid_currency() {
            return Err(WillError::InvalidInput(format!(
                "Currency '{}' must be a 3-letter ISO code",
                value.currency
            )));
        }
    }
    if let Some(will_id) = input.will_id {
        if store.get_will(owner, will_id).is_none() {
            return Err(WillError::NotFound(format!("Will {}", will_id)));
        }
    }
    Ok(())
}

pub fn create_asset<S: WillStore>(store: &S, owner: &PrincipalId, input: AssetInput) -> Result<Asset, WillError> {
    check_asset_input(store, owner, &input)?;
    let now = now_ns();
    let asset = Asset {
        asset_id: store.next_id(IdKind::Asset)?,
        owner: *owner,
        name: input.name.trim().to_string(),
        category: input.category,
        estimated_value: input.estimated_value,
        description: input.description,
        document_ref: input.document_ref,
        will_id: input.will_id,
        created_at: now,
        updated_at: now,
    };
    store.put_asset(&asset)?;
    metrics::record_asset_created();
    audit_logs::add_entry(owner, *owner, LogAction::AssetCreated, Some(format!("asset={}", asset.asset_id)));
    logging::info(format!("Asset {} created for {}", asset.asset_id, owner));
    Ok(asset)
}

/// Replaces the editable fields of an asset. Allocations are untouched.
pub fn update_asset<S: WillStore>(
    store: &S,
    owner: &PrincipalId,
    asset_id: AssetId,
    input: AssetInput,
) -> Result<Asset, WillError> {
    let existing = get_asset(store, owner, asset_id)?;
    check_asset_input(store, owner, &input)?;
    let asset = Asset {
        name: input.name.trim().to_string(),
        category: input.category,
        estimated_value: input.estimated_value,
        description: input.description,
        document_ref: input.document_ref,
        will_id: input.will_id,
        updated_at: now_ns(),
        ..existing
    };
    store.put_asset(&asset)?;
    audit_logs::add_entry(owner, *owner, LogAction::AssetUpdated, Some(format!("asset={}", asset_id)));
    Ok(asset)
}

/// Deletes an asset together with its allocation rows.
pub fn delete_asset<S: WillStore>(store: &S, owner: &PrincipalId, asset_id: AssetId) -> Result<(), WillError> {
    let removed = store.delete_asset(owner, asset_id)?;
    audit_logs::add_entry(
        owner,
        *owner,
        LogAction::AssetDeleted,
        Some(format!("asset={} name={}", asset_id, removed.name)),
    );
    logging::info(format!("Asset {} deleted by {}", asset_id, owner));
    Ok(())
}

pub fn get_asset<S: WillStore>(store: &S, owner: &PrincipalId, asset_id: AssetId) -> Result<Asset, WillError> {
    store
        .get_asset(owner, asset_id)
        .ok_or_else(|| WillError::NotFound(format!("Asset {}", asset_id)))
}

pub fn list_assets<S: WillStore>(store: &S, owner: &PrincipalId) -> Vec<Asset> {
    store.list_assets(owner)
}
