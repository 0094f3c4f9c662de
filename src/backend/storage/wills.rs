// src/backend/storage/wills.rs
use crate::error::WillError;
use crate::models::common::{PrincipalId, WillId, WillType};
use crate::models::will::Will;
use crate::storage::memory::{get_will_index_memory, get_wills_memory, Memory};
use crate::storage::storable::{Cbor, StorableString};
use ic_stable_structures::StableBTreeMap;
use std::cell::RefCell;

type StorableWill = Cbor<Will>;

thread_local! {
    /// Wills: Key = WillId, Value = Will
    static WILLS: RefCell<StableBTreeMap<WillId, StorableWill, Memory>> = RefCell::new(
        StableBTreeMap::init(get_wills_memory())
    );

    /// Unique index: Key = "{owner}:{type}", Value = WillId.
    /// At most one will per creation method per owner.
    static WILL_INDEX: RefCell<StableBTreeMap<StorableString, WillId, Memory>> = RefCell::new(
        StableBTreeMap::init(get_will_index_memory())
    );
}

fn create_index_key(owner: &PrincipalId, will_type: WillType) -> StorableString {
    Cbor(format!("{}:{}", owner.to_text(), will_type.as_str()))
}

/// Retrieves the will an owner created with the given method.
pub fn get_will_by_type(owner: &PrincipalId, will_type: WillType) -> Option<Will> {
    let key = create_index_key(owner, will_type);
    let will_id = WILL_INDEX.with(|index_ref| index_ref.borrow().get(&key))?;
    get_will(will_id)
}

pub fn get_will(will_id: WillId) -> Option<Will> {
    WILLS.with(|map_ref| map_ref.borrow().get(&will_id).map(|cbor| cbor.0))
}

/// Inserts a new will, enforcing the (owner, type) uniqueness constraint.
pub fn insert_will(will: &Will) -> Result<(), WillError> {
    let key = create_index_key(&will.owner, will.will_type);
    WILL_INDEX.with(|index_ref| {
        let mut index = index_ref.borrow_mut();
        if let Some(existing) = index.get(&key) {
            return Err(WillError::PersistenceFailure(format!(
                "Unique constraint violated: owner {} already has {} will {}",
                will.owner,
                will.will_type.as_str(),
                existing
            )));
        }
        index.insert(key, will.will_id);
        Ok(())
    })?;
    WILLS.with(|map_ref| {
        map_ref.borrow_mut().insert(will.will_id, Cbor(will.clone()));
    });
    Ok(())
}

/// Replaces a stored will. Owner and type are immutable.
pub fn update_will(will: &Will) -> Result<(), WillError> {
    WILLS.with(|map_ref| {
        let mut map = map_ref.borrow_mut();
        match map.get(&will.will_id) {
            Some(existing) if existing.0.owner == will.owner && existing.0.will_type == will.will_type => {
                map.insert(will.will_id, Cbor(will.clone()));
                Ok(())
            }
            Some(_) => Err(WillError::PersistenceFailure(format!(
                "Will {} owner or type cannot change",
                will.will_id
            ))),
            None => Err(WillError::NotFound(format!("Will {}", will.will_id))),
        }
    })
}

/// Lists all wills of an owner.
/// Note: This iterates the whole map, acceptable while owners have at most four wills each.
pub fn get_wills_by_owner(owner: &PrincipalId) -> Vec<Will> {
    WILLS.with(|map_ref| {
        map_ref
            .borrow()
            .iter()
            .map(|(_id, cbor)| cbor.0)
            .filter(|will| will.owner == *owner)
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::WillStatus;
    use candid::Principal;

    fn will(will_id: WillId, owner: PrincipalId, will_type: WillType) -> Will {
        Will {
            will_id,
            owner,
            will_type,
            status: WillStatus::Draft,
            title: None,
            content: None,
            transcript: None,
            media_ref: None,
            content_sha256: None,
            created_at: 0,
            updated_at: 0,
            finalized_at: None,
            finalize_count: 0,
        }
    }

    #[test]
    fn one_will_per_owner_and_type() {
        let owner = Principal::from_slice(&[21]);
        insert_will(&will(100, owner, WillType::Text)).unwrap();
        let err = insert_will(&will(101, owner, WillType::Text)).unwrap_err();
        assert!(matches!(err, WillError::PersistenceFailure(_)));
        assert!(get_will(101).is_none());

        insert_will(&will(102, owner, WillType::Audio)).unwrap();
        insert_will(&will(103, Principal::from_slice(&[22]), WillType::Text)).unwrap();
        assert_eq!(get_will_by_type(&owner, WillType::Text).map(|w| w.will_id), Some(100));
        assert_eq!(get_wills_by_owner(&owner).len(), 2);
    }

    #[test]
    fn update_keeps_owner_and_type_fixed() {
        let owner = Principal::from_slice(&[23]);
        insert_will(&will(200, owner, WillType::Chat)).unwrap();
        let mut changed = will(200, owner, WillType::Video);
        assert!(update_will(&changed).is_err());
        changed.will_type = WillType::Chat;
        changed.status = WillStatus::InProgress;
        update_will(&changed).unwrap();
        assert_eq!(get_will(200).map(|w| w.status), Some(WillStatus::InProgress));
        assert!(matches!(update_will(&will(299, owner, WillType::Chat)), Err(WillError::NotFound(_))));
    }
}
