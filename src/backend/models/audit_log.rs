// src/backend/models/audit_log.rs
use crate::models::common::Timestamp;
use candid::{CandidType, Principal};
use serde::{Deserialize, Serialize};

/// Represents a single entry in an owner's audit log.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AuditLogEntry {
    /// Nanoseconds since epoch.
    pub timestamp: Timestamp,
    /// Principal that performed the action.
    pub actor: Principal,
    pub action: LogAction,
    /// Optional details about the action (e.g., asset id, recipient count).
    pub details: Option<String>,
}

#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum LogAction {
    WillCreated,
    WillContentSaved,
    WillStatusChanged,
    WillFinalized,
    AssetCreated,
    AssetUpdated,
    AssetDeleted,
    RecipientCreated,
    RecipientUpdated,
    RecipientDeleted,
    RecipientVerified,
    AllocationsCommitted,
    AllocationRemoved,
    NotificationsDispatched,
}
