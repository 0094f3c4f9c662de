// src/backend/models/init.rs
use candid::{CandidType, Principal};
use serde::Deserialize;

#[derive(CandidType, Deserialize, Debug, Clone)]
pub struct InitArgs {
    pub admin_principal: Principal,
    /// Email relay endpoint receiving one POST per notification.
    pub email_relay_url: String,
    pub email_sender_address: String,
    pub http_outcall_cycles: Option<u128>,
}
