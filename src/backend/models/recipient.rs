// src/backend/models/recipient.rs
use crate::models::common::{PrincipalId, RecipientId, Timestamp};
use candid::CandidType;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Recipient {
    pub recipient_id: RecipientId,
    pub owner: PrincipalId,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub relationship: Option<String>, // Free-form, e.g., "Daughter" or "Local shelter"
    pub address: Option<String>,
    pub is_verified: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Recipient {
    /// Email address usable for notifications, if any.
    pub fn notification_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Validate)]
pub struct RecipientInput {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(email, length(max = 254))]
    pub email: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub relationship: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
}

impl RecipientInput {
    pub fn named(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            email: None,
            phone: None,
            relationship: None,
            address: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}
