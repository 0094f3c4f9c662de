use crate::models::audit_log::{AuditLogEntry, LogAction};
use crate::models::common::PrincipalId;
use crate::storage::memory::{get_audit_log_memory, Memory};
use crate::storage::storable::{Cbor, StorableString};
use crate::utils::time::now_ns;
use ic_stable_structures::StableBTreeMap;
use std::cell::RefCell;

type StorableAuditLogVec = Cbor<Vec<AuditLogEntry>>;

/// Oldest entries are dropped past this many per owner.
const MAX_ENTRIES_PER_OWNER: usize = 500;

thread_local! {
    /// Audit Logs: Key = "audit:{owner}", Value = Vec<AuditLogEntry>
    pub static LOGS: RefCell<StableBTreeMap<StorableString, StorableAuditLogVec, Memory>> = RefCell::new(
        StableBTreeMap::init(get_audit_log_memory())
    );
}

fn create_audit_log_key(owner: &PrincipalId) -> StorableString {
    Cbor(format!("audit:{}", owner.to_text()))
}

/// Appends an entry to the owner's log, stamping the current time.
pub fn add_entry(owner: &PrincipalId, actor: PrincipalId, action: LogAction, details: Option<String>) {
    let entry = AuditLogEntry {
        timestamp: now_ns(),
        actor,
        action,
        details,
    };
    LOGS.with(|map_ref| {
        let key = create_audit_log_key(owner);
        let mut map = map_ref.borrow_mut();
        let mut entries = map.get(&key).map(|cbor| cbor.0).unwrap_or_default();
        entries.push(entry);
        if entries.len() > MAX_ENTRIES_PER_OWNER {
            let overflow = entries.len() - MAX_ENTRIES_PER_OWNER;
            entries.drain(..overflow);
        }
        map.insert(key, Cbor(entries));
    });
}

/// Returns the owner's log, oldest first.
pub fn get_entries(owner: &PrincipalId) -> Vec<AuditLogEntry> {
    LOGS.with(|map_ref| {
        map_ref
            .borrow()
            .get(&create_audit_log_key(owner))
            .map(|cbor| cbor.0)
            .unwrap_or_default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use candid::Principal;

    #[test]
    fn log_is_capped_to_most_recent_entries() {
        let owner = Principal::from_slice(&[42]);
        for i in 0..(MAX_ENTRIES_PER_OWNER + 3) {
            add_entry(&owner, owner, LogAction::AssetCreated, Some(i.to_string()));
        }
        let entries = get_entries(&owner);
        assert_eq!(entries.len(), MAX_ENTRIES_PER_OWNER);
        assert_eq!(entries[0].details.as_deref(), Some("3"));
        assert!(get_entries(&Principal::from_slice(&[43])).is_empty());
    }
}
