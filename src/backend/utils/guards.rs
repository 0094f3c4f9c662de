// src/backend/utils/guards.rs
use crate::error::WillError;
use crate::models::common::PrincipalId;
use crate::storage::config;
use candid::Principal;
use std::cell::RefCell;
use std::collections::BTreeSet;

/// Every row is owned by the caller, so anonymous callers cannot own anything.
///
/// # Errors
///
/// Returns `WillError::NotAuthorized` for the anonymous principal.
pub fn check_authenticated(caller: PrincipalId) -> Result<(), WillError> {
    if caller == Principal::anonymous() {
        Err(WillError::NotAuthorized(
            "Anonymous callers cannot manage wills.".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Checks if the caller is the configured admin principal.
///
/// # Errors
///
/// Returns `WillError::NotAuthorized` if the caller is not the admin.
pub fn check_admin(caller: PrincipalId) -> Result<(), WillError> {
    if caller == config::get_admin_principal() {
        Ok(())
    } else {
        Err(WillError::NotAuthorized(
            "Caller is not the configured admin.".to_string(),
        ))
    }
}

thread_local! {
    // Keys of operations currently suspended at an await point. Heap only, cleared on upgrade.
    static IN_FLIGHT: RefCell<BTreeSet<String>> = RefCell::new(BTreeSet::new());
}

/// Marks an operation as running until dropped.
///
/// Messages interleave at await points, so an async operation on the same key
/// (e.g., finalizing one will twice) must be rejected while the first is pending.
#[derive(Debug)]
pub struct InFlightGuard {
    key: String,
}

impl InFlightGuard {
    pub fn acquire(key: impl Into<String>) -> Result<Self, WillError> {
        let key = key.into();
        IN_FLIGHT.with(|set| {
            if set.borrow_mut().insert(key.clone()) {
                Ok(InFlightGuard { key })
            } else {
                Err(WillError::OperationInProgress(key))
            }
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        IN_FLIGHT.with(|set| {
            set.borrow_mut().remove(&self.key);
        });
    }
}
