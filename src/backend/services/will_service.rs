// src/backend/services/will_service.rs
use crate::{
    error::WillError,
    metrics,
    models::{
        audit_log::LogAction,
        common::{AllocationState, AssetId, PrincipalId, WillId, WillStatus, WillType},
        FinalizeRequest, Will, WillContent,
    },
    services::{
        allocation_service,
        notification_service::{self, EmailSender, NotificationReport},
        validate_input,
    },
    storage::{audit_logs, IdKind, WillStore},
    utils::{crypto::checksum_fields, guards::InFlightGuard, logging, time::now_ns},
};
use candid::CandidType;
use serde::{Deserialize, Serialize};

/// Result of a finalize call. The will is completed even when `warning` is set.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct FinalizeOutcome {
    pub will: Will,
    pub notifications: NotificationReport,
    /// `NotificationPartialFailure` when some recipients could not be emailed.
    pub warning: Option<WillError>,
}

/// Checklist shown before finalizing. Informational only.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct WillReadiness {
    pub will_id: WillId,
    pub status: WillStatus,
    pub has_content: bool,
    pub asset_count: u32,
    pub recipient_count: u32,
    pub recipients_with_email: u32,
    pub unassigned_assets: Vec<AssetId>,
    pub incomplete_assets: Vec<AssetId>,
    pub ready: bool,
}

/// Allowed status moves. Self-loops are allowed; nothing moves backwards.
pub fn is_valid_transition(from: WillStatus, to: WillStatus) -> bool {
    use WillStatus::*;
    from == to
        || matches!(
            (from, to),
            (Draft, InProgress) | (InProgress, Review) | (InProgress, Completed) | (Review, Completed)
        )
}

fn ensure_transition(will: &Will, to: WillStatus) -> Result<(), WillError> {
    if is_valid_transition(will.status, to) {
        Ok(())
    } else {
        Err(WillError::InvalidStateTransition(format!(
            "Will {} cannot move from {:?} to {:?}",
            will.will_id, will.status, to
        )))
    }
}

fn content_checksum(will: &Will) -> String {
    checksum_fields(&[
        will.title.as_deref(),
        will.content.as_deref(),
        will.transcript.as_deref(),
        will.media_ref.as_deref(),
    ])
}

fn require_will<S: WillStore>(store: &S, owner: &PrincipalId, will_id: WillId) -> Result<Will, WillError> {
    store
        .get_will(owner, will_id)
        .ok_or_else(|| WillError::NotFound(format!("Will {}", will_id)))
}

/// Returns the owner's will of `will_type`, creating an empty draft if there is none.
pub fn start_will<S: WillStore>(store: &S, owner: &PrincipalId, will_type: WillType) -> Result<Will, WillError> {
    if let Some(existing) = store.get_will_by_type(owner, will_type) {
        return Ok(existing);
    }
    let now = now_ns();
    let will = Will {
        will_id: store.next_id(IdKind::Will)?,
        owner: *owner,
        will_type,
        status: WillStatus::Draft,
        title: None,
        content: None,
        transcript: None,
        media_ref: None,
        content_sha256: None,
        created_at: now,
        updated_at: now,
        finalized_at: None,
        finalize_count: 0,
    };
    store.insert_will(&will)?;
    metrics::record_will_created();
    audit_logs::add_entry(
        owner,
        *owner,
        LogAction::WillCreated,
        Some(format!("will={} type={}", will.will_id, will_type.as_str())),
    );
    logging::info(format!("Created {} will {} for {}", will_type.as_str(), will.will_id, owner));
    Ok(will)
}

/// Upserts the owner's will of `will_type` with `payload`.
///
/// A new will starts `InProgress`; an existing one has every content field
/// overwritten. Drafts advance to `InProgress`, later states keep their status.
pub fn save_content<S: WillStore>(
    store: &S,
    owner: &PrincipalId,
    will_type: WillType,
    payload: WillContent,
) -> Result<Will, WillError> {
    validate_input(&payload)?;
    let now = now_ns();

    match store.get_will_by_type(owner, will_type) {
        Some(mut will) => {
            will.title = payload.title;
            will.content = payload.content;
            will.transcript = payload.transcript;
            will.media_ref = payload.media_ref;
            will.content_sha256 = Some(content_checksum(&will));
            will.updated_at = now;
            if will.status == WillStatus::Draft {
                will.status = WillStatus::InProgress;
            }
            store.update_will(&will)?;
            audit_logs::add_entry(
                owner,
                *owner,
                LogAction::WillContentSaved,
                Some(format!("will={} status={:?}", will.will_id, will.status)),
            );
            Ok(will)
        }
        None => {
            let mut will = Will {
                will_id: store.next_id(IdKind::Will)?,
                owner: *owner,
                will_type,
                status: WillStatus::InProgress,
                title: payload.title,
                content: payload.content,
                transcript: payload.transcript,
                media_ref: payload.media_ref,
                content_sha256: None,
                created_at: now,
                updated_at: now,
                finalized_at: None,
                finalize_count: 0,
            };
            will.content_sha256 = Some(content_checksum(&will));
            store.insert_will(&will)?;
            metrics::record_will_created();
            audit_logs::add_entry(
                owner,
                *owner,
                LogAction::WillCreated,
                Some(format!("will={} type={}", will.will_id, will_type.as_str())),
            );
            logging::info(format!(
                "Created {} will {} for {} on first save",
                will_type.as_str(),
                will.will_id,
                owner
            ));
            Ok(will)
        }
    }
}

pub fn get_will<S: WillStore>(store: &S, owner: &PrincipalId, will_type: WillType) -> Option<Will> {
    store.get_will_by_type(owner, will_type)
}

pub fn list_wills<S: WillStore>(store: &S, owner: &PrincipalId) -> Vec<Will> {
    store.list_wills(owner)
}

/// Moves an in-progress will to `Review`.
pub fn submit_for_review<S: WillStore>(store: &S, owner: &PrincipalId, will_id: WillId) -> Result<Will, WillError> {
    let mut will = require_will(store, owner, will_id)?;
    ensure_transition(&will, WillStatus::Review)?;
    if will.status == WillStatus::Review {
        return Ok(will);
    }
    will.status = WillStatus::Review;
    will.updated_at = now_ns();
    store.update_will(&will)?;
    audit_logs::add_entry(
        owner,
        *owner,
        LogAction::WillStatusChanged,
        Some(format!("will={} status=Review", will_id)),
    );
    Ok(will)
}

/// Pre-finalize checklist: content saved, every asset fully allocated, recipients reachable.
pub fn readiness<S: WillStore>(store: &S, owner: &PrincipalId, will_id: WillId) -> Result<WillReadiness, WillError> {
    let will = require_will(store, owner, will_id)?;
    let overview = allocation_service::allocation_overview(store, owner);
    let recipients = store.list_recipients(owner);

    let ids_in = |state: AllocationState| -> Vec<AssetId> {
        overview
            .iter()
            .filter(|s| s.state == state)
            .map(|s| s.asset_id)
            .collect()
    };
    let unassigned_assets = ids_in(AllocationState::Unassigned);
    let incomplete_assets = ids_in(AllocationState::Incomplete);
    let has_content = will.has_content();
    let recipients_with_email = recipients.iter().filter(|r| r.notification_email().is_some()).count() as u32;

    Ok(WillReadiness {
        will_id,
        status: will.status,
        has_content,
        asset_count: overview.len() as u32,
        recipient_count: recipients.len() as u32,
        recipients_with_email,
        ready: has_content
            && !overview.is_empty()
            && !recipients.is_empty()
            && unassigned_assets.is_empty()
            && incomplete_assets.is_empty(),
        unassigned_assets,
        incomplete_assets,
    })
}

/// Completes a will and emails its recipients.
///
/// The status change is persisted before any email is sent; notification
/// failures are reported in the outcome and never undo it. Finalizing an
/// already completed will sends the notifications again. A will still in
/// `Draft` (never saved) is refused with `InvalidStateTransition`.
pub async fn finalize<S: WillStore, E: EmailSender>(
    store: &S,
    sender: &E,
    owner: &PrincipalId,
    request: FinalizeRequest,
) -> Result<FinalizeOutcome, WillError> {
    validate_input(&request)?;
    if !request.acknowledged {
        return Err(WillError::AcknowledgmentRequired);
    }
    let mut will = require_will(store, owner, request.will_id)?;
    ensure_transition(&will, WillStatus::Completed)?;

    let _guard = InFlightGuard::acquire(format!("finalize:{}", will.will_id))?;

    let first_completion = will.status != WillStatus::Completed;
    if !first_completion {
        logging::warn(format!(
            "Will {} is already completed; finalizing again re-sends notifications",
            will.will_id
        ));
    }

    let now = now_ns();
    will.status = WillStatus::Completed;
    will.finalized_at = Some(now);
    will.updated_at = now;
    will.finalize_count = will.finalize_count.saturating_add(1);
    store.update_will(&will)?;

    if first_completion {
        metrics::record_will_completed();
    }
    audit_logs::add_entry(
        owner,
        *owner,
        LogAction::WillFinalized,
        Some(format!("will={} round={}", will.will_id, will.finalize_count)),
    );

    let recipients = store.list_recipients(owner);
    let report = notification_service::notify(sender, &will, &request.owner_name, &recipients).await;

    audit_logs::add_entry(
        owner,
        *owner,
        LogAction::NotificationsDispatched,
        Some(format!("will={} sent={} total={}", will.will_id, report.sent, report.total)),
    );
    let warning = report.partial_failure();
    if let Some(w) = &warning {
        logging::warn(format!("Will {} finalized with warning: {}", will.will_id, w));
    }

    Ok(FinalizeOutcome {
        will,
        notifications: report,
        warning,
    })
}
