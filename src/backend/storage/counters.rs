// src/backend/storage/counters.rs
use crate::error::WillError;
use crate::storage::memory::{get_id_counters_memory, Memory};
use ic_stable_structures::StableBTreeMap;
use std::cell::RefCell;

/// Identifier sequences, one per entity table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdKind {
    Will,
    Asset,
    Recipient,
    Allocation,
}

impl IdKind {
    fn key(self) -> u8 {
        match self {
            IdKind::Will => 0,
            IdKind::Asset => 1,
            IdKind::Recipient => 2,
            IdKind::Allocation => 3,
        }
    }
}

thread_local! {
    /// Last issued id per kind. Ids start at 1.
    static COUNTERS: RefCell<StableBTreeMap<u8, u64, Memory>> = RefCell::new(
        StableBTreeMap::init(get_id_counters_memory())
    );
}

/// Issues the next id of the given kind.
pub fn next_id(kind: IdKind) -> Result<u64, WillError> {
    COUNTERS.with(|map_ref| {
        let mut map = map_ref.borrow_mut();
        let current = map.get(&kind.key()).unwrap_or(0);
        let next = current
            .checked_add(1)
            .ok_or_else(|| WillError::PersistenceFailure(format!("{:?} id counter overflow", kind)))?;
        map.insert(kind.key(), next);
        Ok(next)
    })
}
