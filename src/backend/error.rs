// src/backend/error.rs
use crate::models::allocation::Percentage;
use candid::CandidType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(CandidType, Serialize, Deserialize, Error, Debug, Clone, PartialEq, Eq)]
pub enum WillError {
    // --- Allocation validation (raised before any write) ---
    #[error("Row {row}: invalid percentage '{value}' ({reason})")]
    InvalidPercentage {
        row: u32,
        value: String,
        reason: String,
    },

    #[error("Recipient {recipient_id} appears more than once in the allocation set")]
    DuplicateRecipient { recipient_id: u64 },

    #[error("Allocations must total exactly 100%, got {actual_sum}%")]
    AllocationNotComplete { actual_sum: Percentage },

    #[error("Allocation set for asset {asset_id} changed since it was loaded (expected version {expected}, found {actual})")]
    StaleAllocation {
        asset_id: u64,
        expected: u64,
        actual: u64,
    },

    // --- Storage ---
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // --- Lifecycle ---
    #[error("Finalizing a will requires an explicit acknowledgment")]
    AcknowledgmentRequired,

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Operation already in progress: {0}")]
    OperationInProgress(String),

    // --- Notifications ---
    #[error("Notification failed: {0}")]
    NotificationFailed(String),

    #[error("Only {sent} of {total} recipient notifications were delivered")]
    NotificationPartialFailure { sent: u32, total: u32 },

    // --- Request handling ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),
}

impl WillError {
    /// Validation errors leave stored state untouched and keep the edit buffer open.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WillError::InvalidPercentage { .. }
                | WillError::DuplicateRecipient { .. }
                | WillError::AllocationNotComplete { .. }
                | WillError::InvalidInput(_)
        )
    }

    /// The caller should re-fetch before retrying.
    pub fn requires_refetch(&self) -> bool {
        matches!(
            self,
            WillError::PersistenceFailure(_) | WillError::StaleAllocation { .. }
        )
    }
}
