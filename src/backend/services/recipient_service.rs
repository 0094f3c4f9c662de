// src/backend/services/recipient_service.rs
use crate::{
    error::WillError,
    metrics,
    models::{
        audit_log::LogAction,
        common::{PrincipalId, RecipientId},
        Recipient, RecipientInput,
    },
    services::validate_input,
    storage::{audit_logs, IdKind, WillStore},
    utils::{logging, time::now_ns},
};

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_recipient_input(input: &RecipientInput) -> Result<(), WillError> {
    validate_input(input)?;
    if input.full_name.trim().is_empty() {
        return Err(WillError::InvalidInput("Recipient name cannot be blank".to_string()));
    }
    Ok(())
}

pub fn create_recipient<S: WillStore>(
    store: &S,
    owner: &PrincipalId,
    input: RecipientInput,
) -> Result<Recipient, WillError> {
    check_recipient_input(&input)?;
    let now = now_ns();
    let recipient = Recipient {
        recipient_id: store.next_id(IdKind::Recipient)?,
        owner: *owner,
        full_name: input.full_name.trim().to_string(),
        email: clean(input.email),
        phone: clean(input.phone),
        relationship: clean(input.relationship),
        address: clean(input.address),
        is_verified: false,
        created_at: now,
        updated_at: now,
    };
    store.put_recipient(&recipient)?;
    metrics::record_recipient_created();
    audit_logs::add_entry(
        owner,
        *owner,
        LogAction::RecipientCreated,
        Some(format!("recipient={}", recipient.recipient_id)),
    );
    Ok(recipient)
}

/// Replaces contact details. A changed email clears verification.
pub fn update_recipient<S: WillStore>(
    store: &S,
    owner: &PrincipalId,
    recipient_id: RecipientId,
    input: RecipientInput,
) -> Result<Recipient, WillError> {
    let existing = get_recipient(store, owner, recipient_id)?;
    check_recipient_input(&input)?;
    let email = clean(input.email);
    let is_verified = existing.is_verified && email == existing.email;
    let recipient = Recipient {
        full_name: input.full_name.trim().to_string(),
        email,
        phone: clean(input.phone),
        relationship: clean(input.relationship),
        address: clean(input.address),
        is_verified,
        updated_at: now_ns(),
        ..existing
    };
    store.put_recipient(&recipient)?;
    audit_logs::add_entry(
        owner,
        *owner,
        LogAction::RecipientUpdated,
        Some(format!("recipient={}", recipient_id)),
    );
    Ok(recipient)
}

/// Deletes a recipient and every allocation row naming it.
///
/// Affected assets may be left below 100% until they are re-allocated.
pub fn delete_recipient<S: WillStore>(
    store: &S,
    owner: &PrincipalId,
    recipient_id: RecipientId,
) -> Result<(), WillError> {
    let (_, touched_assets) = store.delete_recipient(owner, recipient_id)?;
    audit_logs::add_entry(
        owner,
        *owner,
        LogAction::RecipientDeleted,
        Some(format!("recipient={} assets_affected={:?}", recipient_id, touched_assets)),
    );
    if !touched_assets.is_empty() {
        logging::warn(format!(
            "Recipient {} removed; assets {:?} need re-allocation",
            recipient_id, touched_assets
        ));
    }
    Ok(())
}

pub fn set_verified<S: WillStore>(
    store: &S,
    owner: &PrincipalId,
    recipient_id: RecipientId,
    verified: bool,
) -> Result<Recipient, WillError> {
    let mut recipient = get_recipient(store, owner, recipient_id)?;
    if recipient.is_verified == verified {
        return Ok(recipient);
    }
    recipient.is_verified = verified;
    recipient.updated_at = now_ns();
    store.put_recipient(&recipient)?;
    audit_logs::add_entry(
        owner,
        *owner,
        LogAction::RecipientVerified,
        Some(format!("recipient={} verified={}", recipient_id, verified)),
    );
    Ok(recipient)
}

pub fn get_recipient<S: WillStore>(
    store: &S,
    owner: &PrincipalId,
    recipient_id: RecipientId,
) -> Result<Recipient, WillError> {
    store
        .get_recipient(owner, recipient_id)
        .ok_or_else(|| WillError::NotFound(format!("Recipient {}", recipient_id)))
}

pub fn list_recipients<S: WillStore>(store: &S, owner: &PrincipalId) -> Vec<Recipient> {
    store.list_recipients(owner)
}
