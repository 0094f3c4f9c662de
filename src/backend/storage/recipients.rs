// src/backend/storage/recipients.rs
use crate::models::common::{PrincipalId, RecipientId};
use crate::models::recipient::Recipient;
use crate::storage::memory::{get_recipients_memory, Memory};
use crate::storage::storable::Cbor;
use ic_stable_structures::StableBTreeMap;
use std::cell::RefCell;

type StorableRecipient = Cbor<Recipient>;

thread_local! {
    /// Recipients: Key = RecipientId, Value = Recipient
    static RECIPIENTS: RefCell<StableBTreeMap<RecipientId, StorableRecipient, Memory>> = RefCell::new(
        StableBTreeMap::init(get_recipients_memory())
    );
}

/// Inserts or updates a recipient. Returns the previous value if any.
pub fn insert_recipient(recipient: &Recipient) -> Option<Recipient> {
    RECIPIENTS.with(|map_ref| {
        map_ref
            .borrow_mut()
            .insert(recipient.recipient_id, Cbor(recipient.clone()))
            .map(|prev| prev.0)
    })
}

pub fn get_recipient(recipient_id: RecipientId) -> Option<Recipient> {
    RECIPIENTS.with(|map_ref| map_ref.borrow().get(&recipient_id).map(|cbor| cbor.0))
}

pub fn remove_recipient(recipient_id: RecipientId) -> Option<Recipient> {
    RECIPIENTS.with(|map_ref| map_ref.borrow_mut().remove(&recipient_id).map(|cbor| cbor.0))
}

pub fn get_recipients_by_owner(owner: &PrincipalId) -> Vec<Recipient> {
    RECIPIENTS.with(|map_ref| {
        map_ref
            .borrow()
            .iter()
            .map(|(_id, cbor)| cbor.0)
            .filter(|recipient| recipient.owner == *owner)
            .collect()
    })
}
