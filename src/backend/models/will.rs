// src/backend/models/will.rs
use crate::models::common::{PrincipalId, Timestamp, WillId, WillStatus, WillType};
use candid::CandidType;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Will {
    pub will_id: WillId,
    pub owner: PrincipalId,
    pub will_type: WillType,
    pub status: WillStatus,
    pub title: Option<String>,
    pub content: Option<String>,    // Written text or chat summary
    pub transcript: Option<String>, // Transcript of an audio/video recording
    pub media_ref: Option<String>,  // Reference to the uploaded recording
    pub content_sha256: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub finalized_at: Option<Timestamp>,
    pub finalize_count: u32,
}

impl Will {
    pub fn has_content(&self) -> bool {
        [&self.content, &self.transcript, &self.media_ref]
            .iter()
            .any(|field| field.as_deref().map_or(false, |v| !v.trim().is_empty()))
    }

    /// Title used in notification emails.
    pub fn display_title(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => format!("Last wishes ({})", self.will_type.as_str()),
        }
    }
}

/// Payload of a content save; overwrites every content field of the will.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Default, Validate)]
pub struct WillContent {
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 100_000))]
    pub content: Option<String>,
    #[validate(length(max = 100_000))]
    pub transcript: Option<String>,
    #[validate(length(max = 500))]
    pub media_ref: Option<String>,
}

impl WillContent {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }
}

/// Owner's request to finalize a will and notify its recipients.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Validate)]
pub struct FinalizeRequest {
    pub will_id: WillId,
    /// Owner confirmed the will reflects their wishes.
    pub acknowledged: bool,
    /// Name shown to recipients in the notification email.
    #[validate(length(max = 200))]
    pub owner_name: String,
}
