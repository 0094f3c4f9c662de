// src/backend/models/common.rs
use candid::{CandidType, Principal};
use serde::{Deserialize, Serialize};

pub type PrincipalId = Principal; // Caller principal, owns every row it creates
pub type WillId = u64;
pub type AssetId = u64;
pub type RecipientId = u64;
pub type AllocationId = u64;

pub type Timestamp = u64; // Nanoseconds since epoch

/// How the will content was captured.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy, Hash, PartialOrd, Ord)]
pub enum WillType {
    Audio,
    Video,
    Chat,
    Text,
}

impl WillType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WillType::Audio => "audio",
            WillType::Video => "video",
            WillType::Chat => "chat",
            WillType::Text => "text",
        }
    }
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy)]
pub enum WillStatus {
    Draft,      // Created, nothing saved yet
    InProgress, // Content saved at least once
    Review,     // Owner asked to review before finalizing
    Completed,  // Finalized & secured, recipients notified
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy, Hash)]
pub enum AssetCategory {
    Property,
    Investment,
    BankAccount,
    Vehicle,
    Jewelry,
    DigitalAsset,
    Insurance,
    Business,
    Other,
}

/// Allocation completeness of a single asset.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy)]
pub enum AllocationState {
    Unassigned, // No rows
    Complete,   // Rows sum to exactly 100%
    Incomplete, // Rows left behind by single-row removals
}
