// src/backend/storage/config.rs
use crate::error::WillError;
use crate::models::init::InitArgs;
use crate::storage::memory::{get_admin_principal_memory, get_email_config_memory, Memory};
use crate::storage::storable::Cbor;
use crate::utils::logging;
use candid::{CandidType, Principal};
use ic_stable_structures::StableCell;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

// Default values (used until init args are applied)
const DEFAULT_ADMIN_PRINCIPAL: Principal = Principal::management_canister();
pub const DEFAULT_HTTP_OUTCALL_CYCLES: u128 = 100_000_000; // Cycles attached to each email outcall

/// Where and how recipient notifications are sent.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EmailConfig {
    pub relay_url: String,
    pub sender_address: String,
    pub outcall_cycles: u128,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            relay_url: String::new(),
            sender_address: String::new(),
            outcall_cycles: DEFAULT_HTTP_OUTCALL_CYCLES,
        }
    }
}

thread_local! {
    /// Stable cell for the Admin Principal
    static ADMIN_PRINCIPAL: RefCell<StableCell<Cbor<Principal>, Memory>> = RefCell::new(
        StableCell::init(get_admin_principal_memory(), Cbor(DEFAULT_ADMIN_PRINCIPAL))
            .expect("Failed to initialize admin principal stable cell")
    );

    /// Stable cell for the email relay settings
    static EMAIL_CONFIG: RefCell<StableCell<Cbor<EmailConfig>, Memory>> = RefCell::new(
        StableCell::init(get_email_config_memory(), Cbor(EmailConfig::default()))
            .expect("Failed to initialize email config stable cell")
    );
}

/// Applies InitArgs. Called from `init` and `post_upgrade`.
pub fn init_config(args: InitArgs) -> Result<(), WillError> {
    set_admin_principal(args.admin_principal)?;
    let email = EmailConfig {
        relay_url: args.email_relay_url,
        sender_address: args.email_sender_address,
        outcall_cycles: args.http_outcall_cycles.unwrap_or(DEFAULT_HTTP_OUTCALL_CYCLES),
    };
    set_email_config(email.clone())?;
    logging::info(format!(
        "Configuration initialized: Admin={}, EmailRelay={}, OutcallCycles={}",
        args.admin_principal, email.relay_url, email.outcall_cycles
    ));
    Ok(())
}

pub fn get_admin_principal() -> Principal {
    ADMIN_PRINCIPAL.with(|cell| cell.borrow().get().0)
}

pub fn set_admin_principal(admin: Principal) -> Result<(), WillError> {
    ADMIN_PRINCIPAL.with(|cell| {
        cell.borrow_mut()
            .set(Cbor(admin))
            .map(|_old| ())
            .map_err(|e| WillError::PersistenceFailure(format!("Failed to set admin principal: {:?}", e)))
    })
}

pub fn get_email_config() -> EmailConfig {
    EMAIL_CONFIG.with(|cell| cell.borrow().get().0.clone())
}

pub fn set_email_config(config: EmailConfig) -> Result<(), WillError> {
    EMAIL_CONFIG.with(|cell| {
        cell.borrow_mut()
            .set(Cbor(config))
            .map(|_old| ())
            .map_err(|e| WillError::PersistenceFailure(format!("Failed to set email config: {:?}", e)))
    })
}
