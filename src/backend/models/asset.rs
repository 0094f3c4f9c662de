// src/backend/models/asset.rs
use crate::models::common::{AssetCategory, AssetId, PrincipalId, Timestamp, WillId};
use candid::CandidType;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Estimated value in minor units (cents) of an ISO 4217 currency.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Validate)]
pub struct MonetaryValue {
    pub amount_minor: u64,
    #[validate(length(equal = 3))]
    pub currency: String, // e.g., "USD"
}

impl MonetaryValue {
    pub fn has_valid_currency(&self) -> bool {
        self.currency.len() == 3 && self.currency.chars().all(|c| c.is_ascii_uppercase())
    }
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    pub asset_id: AssetId,
    pub owner: PrincipalId,
    pub name: String,
    pub category: AssetCategory,
    pub estimated_value: Option<MonetaryValue>,
    pub description: Option<String>,
    pub document_ref: Option<String>, // Reference to an uploaded deed, statement, etc.
    pub will_id: Option<WillId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Fields the owner supplies when creating or replacing an asset.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Validate)]
pub struct AssetInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub category: AssetCategory,
    #[validate(nested)]
    pub estimated_value: Option<MonetaryValue>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 500))]
    pub document_ref: Option<String>,
    pub will_id: Option<WillId>,
}

impl AssetInput {
    pub fn named(name: impl Into<String>, category: AssetCategory) -> Self {
        Self {
            name: name.into(),
            category,
            estimated_value: None,
            description: None,
            document_ref: None,
            will_id: None,
        }
    }
}
