// src/backend/lib.rs

pub mod adapter;
pub mod api;
pub mod error;
pub mod metrics;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

// Types named in endpoint signatures, needed by export_candid!
use crate::api::GetMetricsResponse;
use crate::error::WillError;
use crate::models::{
    audit_log::AuditLogEntry,
    common::{AssetId, RecipientId, WillId, WillType},
    init::InitArgs,
    Allocation, AllocationDraft, AllocationRowInput, AllocationSet, Asset, AssetInput, FinalizeRequest, Recipient,
    RecipientInput, Will, WillContent,
};
use crate::services::{
    allocation_service::AssetAllocationSummary,
    will_service::{FinalizeOutcome, WillReadiness},
};
use crate::storage::config::EmailConfig;
use ic_cdk::api::management_canister::http_request::{HttpResponse, TransformArgs};

#[ic_cdk::init]
fn init(args: InitArgs) {
    if let Err(e) = storage::config::init_config(args) {
        ic_cdk::trap(&format!("Failed to apply init args: {}", e));
    }
    utils::logging::info("Will backend canister initialized.");
}

#[ic_cdk::post_upgrade]
fn post_upgrade(args: InitArgs) {
    if let Err(e) = storage::config::init_config(args) {
        ic_cdk::trap(&format!("Failed to apply upgrade args: {}", e));
    }
    utils::logging::info("Will backend canister upgraded.");
}

// Export Candid interface
ic_cdk::export_candid!();
