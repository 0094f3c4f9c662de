// src/backend/api.rs
// Candid endpoints. Every owner-scoped call acts on the caller's own rows.

use crate::{
    adapter::email_adapter::{self, HttpEmailSender},
    error::WillError,
    metrics::{self, WillMetrics},
    models::{
        audit_log::AuditLogEntry,
        common::{AssetId, PrincipalId, RecipientId, WillId, WillType},
        Allocation, AllocationDraft, AllocationRowInput, AllocationSet, Asset, AssetInput, FinalizeRequest,
        Recipient, RecipientInput, Will, WillContent,
    },
    services::{
        allocation_service::{self, AssetAllocationSummary},
        asset_service, recipient_service,
        will_service::{self, FinalizeOutcome, WillReadiness},
    },
    storage::{
        audit_logs,
        config::{self, EmailConfig},
        StableStore,
    },
    utils::{
        guards::{check_admin, check_authenticated},
        logging,
        rate_limit::rate_guard,
    },
};
use candid::{CandidType, Deserialize};
use ic_cdk::api::management_canister::http_request::{HttpResponse, TransformArgs};
use ic_cdk::caller;
use ic_cdk_macros::{query, update};
use serde::Serialize;

const STORE: StableStore = StableStore;

// --- Caller checks ---

fn owner() -> Result<PrincipalId, WillError> {
    let caller = caller();
    check_authenticated(caller)?;
    Ok(caller)
}

/// Owner check plus rate limiting, for state-changing calls.
fn mutating_owner() -> Result<PrincipalId, WillError> {
    let caller = owner()?;
    rate_guard(caller)?;
    Ok(caller)
}

fn admin_guard() -> Result<(), WillError> {
    check_admin(caller())
}

// --- Response types ---

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, Default)]
pub struct GetMetricsResponse {
    pub metrics: WillMetrics,
    pub cycle_balance: u128,
}

// --- Will Endpoints ---

#[update]
fn start_will(will_type: WillType) -> Result<Will, WillError> {
    let owner = mutating_owner()?;
    will_service::start_will(&STORE, &owner, will_type)
}

#[update]
fn save_will_content(will_type: WillType, payload: WillContent) -> Result<Will, WillError> {
    let owner = mutating_owner()?;
    will_service::save_content(&STORE, &owner, will_type, payload)
}

#[query]
fn get_will(will_type: WillType) -> Result<Option<Will>, WillError> {
    let owner = owner()?;
    Ok(will_service::get_will(&STORE, &owner, will_type))
}

#[query]
fn list_wills() -> Result<Vec<Will>, WillError> {
    let owner = owner()?;
    Ok(will_service::list_wills(&STORE, &owner))
}

#[update]
fn submit_will_for_review(will_id: WillId) -> Result<Will, WillError> {
    let owner = mutating_owner()?;
    will_service::submit_for_review(&STORE, &owner, will_id)
}

#[query]
fn get_will_readiness(will_id: WillId) -> Result<WillReadiness, WillError> {
    let owner = owner()?;
    will_service::readiness(&STORE, &owner, will_id)
}

#[update]
async fn finalize_will(request: FinalizeRequest) -> Result<FinalizeOutcome, WillError> {
    let owner = mutating_owner()?;
    let sender = HttpEmailSender::from_config();
    will_service::finalize(&STORE, &sender, &owner, request).await
}

// --- Asset Endpoints ---

#[update]
fn create_asset(input: AssetInput) -> Result<Asset, WillError> {
    let owner = mutating_owner()?;
    asset_service::create_asset(&STORE, &owner, input)
}

#[update]
fn update_asset(asset_id: AssetId, input: AssetInput) -> Result<Asset, WillError> {
    let owner = mutating_owner()?;
    asset_service::update_asset(&STORE, &owner, asset_id, input)
}

#[update]
fn delete_asset(asset_id: AssetId) -> Result<(), WillError> {
    let owner = mutating_owner()?;
    asset_service::delete_asset(&STORE, &owner, asset_id)
}

#[query]
fn get_asset(asset_id: AssetId) -> Result<Asset, WillError> {
    let owner = owner()?;
    asset_service::get_asset(&STORE, &owner, asset_id)
}

#[query]
fn list_assets() -> Result<Vec<Asset>, WillError> {
    let owner = owner()?;
    Ok(asset_service::list_assets(&STORE, &owner))
}

// --- Recipient Endpoints ---

#[update]
fn create_recipient(input: RecipientInput) -> Result<Recipient, WillError> {
    let owner = mutating_owner()?;
    recipient_service::create_recipient(&STORE, &owner, input)
}

#[update]
fn update_recipient(recipient_id: RecipientId, input: RecipientInput) -> Result<Recipient, WillError> {
    let owner = mutating_owner()?;
    recipient_service::update_recipient(&STORE, &owner, recipient_id, input)
}

#[update]
fn delete_recipient(recipient_id: RecipientId) -> Result<(), WillError> {
    let owner = mutating_owner()?;
    recipient_service::delete_recipient(&STORE, &owner, recipient_id)
}

#[update]
fn set_recipient_verified(recipient_id: RecipientId, verified: bool) -> Result<Recipient, WillError> {
    let owner = mutating_owner()?;
    recipient_service::set_verified(&STORE, &owner, recipient_id, verified)
}

#[query]
fn list_recipients() -> Result<Vec<Recipient>, WillError> {
    let owner = owner()?;
    Ok(recipient_service::list_recipients(&STORE, &owner))
}

// --- Allocation Endpoints ---

#[query]
fn load_allocations(asset_id: AssetId) -> Result<AllocationSet, WillError> {
    let owner = owner()?;
    Ok(allocation_service::load_allocations(&STORE, &owner, asset_id))
}

/// Dry-run of a commit's validation rules; touches no state.
#[query]
fn validate_allocations(rows: Vec<AllocationRowInput>) -> Result<(), WillError> {
    owner()?;
    allocation_service::validate_set(&rows).map(|_| ())
}

#[update]
fn commit_allocations(draft: AllocationDraft) -> Result<AllocationSet, WillError> {
    let owner = mutating_owner()?;
    allocation_service::commit_set(&STORE, &owner, &draft)
}

#[update]
fn remove_allocation_recipient(asset_id: AssetId, recipient_id: RecipientId) -> Result<AllocationSet, WillError> {
    let owner = mutating_owner()?;
    allocation_service::remove_recipient(&STORE, &owner, asset_id, recipient_id)
}

#[query]
fn list_allocations() -> Result<Vec<Allocation>, WillError> {
    let owner = owner()?;
    Ok(allocation_service::list_allocations(&STORE, &owner))
}

#[query]
fn get_allocation_overview() -> Result<Vec<AssetAllocationSummary>, WillError> {
    let owner = owner()?;
    Ok(allocation_service::allocation_overview(&STORE, &owner))
}

// --- Audit Log ---

#[query]
fn get_audit_log() -> Result<Vec<AuditLogEntry>, WillError> {
    let owner = owner()?;
    Ok(audit_logs::get_entries(&owner))
}

// --- Admin Endpoints ---

#[query]
fn get_metrics() -> Result<GetMetricsResponse, WillError> {
    admin_guard()?;
    Ok(GetMetricsResponse {
        metrics: metrics::get_will_metrics(),
        cycle_balance: ic_cdk::api::canister_balance128(),
    })
}

#[query]
fn get_email_config() -> Result<EmailConfig, WillError> {
    admin_guard()?;
    Ok(config::get_email_config())
}

#[update]
fn update_email_config(email_config: EmailConfig) -> Result<(), WillError> {
    admin_guard()?;
    if !email_config.relay_url.starts_with("https://") {
        return Err(WillError::InvalidInput("Relay URL must use https".to_string()));
    }
    config::set_email_config(email_config)?;
    logging::info(format!("Email config updated by {}", caller()));
    Ok(())
}

// --- HTTP outcall transform ---

#[query]
fn transform_email_response(args: TransformArgs) -> HttpResponse {
    email_adapter::transform_response(args)
}
