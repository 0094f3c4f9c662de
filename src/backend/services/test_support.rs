// Shared fixtures for service tests.
use crate::error::WillError;
use crate::models::{
    common::{AssetCategory, AssetId, PrincipalId, RecipientId, WillId, WillType},
    Allocation, AllocationRowInput, Asset, Recipient, Will,
};
use crate::services::notification_service::{EmailSender, OutgoingEmail};
use crate::storage::{IdKind, StableStore, WillStore};
use candid::Principal;
use std::cell::RefCell;

/// Test principal; distinct `n` values never collide with each other or with anonymous.
pub fn owner(n: u8) -> PrincipalId {
    Principal::from_slice(&[0x5e, 0xed, n])
}

pub fn rows(input: &[(RecipientId, &str)]) -> Vec<AllocationRowInput> {
    input
        .iter()
        .map(|(recipient_id, pct)| AllocationRowInput::new(*recipient_id, *pct))
        .collect()
}

pub fn seed_asset(store: &impl WillStore, owner: &PrincipalId, name: &str) -> AssetId {
    let asset_id = store.next_id(IdKind::Asset).unwrap();
    store
        .put_asset(&Asset {
            asset_id,
            owner: *owner,
            name: name.to_string(),
            category: AssetCategory::Other,
            estimated_value: None,
            description: None,
            document_ref: None,
            will_id: None,
            created_at: 1,
            updated_at: 1,
        })
        .unwrap();
    asset_id
}

pub fn seed_recipient(
    store: &impl WillStore,
    owner: &PrincipalId,
    name: &str,
    email: Option<&str>,
) -> RecipientId {
    let recipient_id = store.next_id(IdKind::Recipient).unwrap();
    store
        .put_recipient(&Recipient {
            recipient_id,
            owner: *owner,
            full_name: name.to_string(),
            email: email.map(str::to_string),
            phone: None,
            relationship: None,
            address: None,
            is_verified: false,
            created_at: 1,
            updated_at: 1,
        })
        .unwrap();
    recipient_id
}

/// Faults a `FailingStore` can inject.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// `insert_allocations` fails after the delete phase.
    InsertAllocations,
    /// `insert_allocations` reports success but writes nothing.
    DropInsertedRows,
    /// `update_will` fails.
    UpdateWill,
}

/// `StableStore` with one injected fault.
pub struct FailingStore {
    inner: StableStore,
    fault: Fault,
}

impl FailingStore {
    pub fn new(fault: Fault) -> Self {
        Self {
            inner: StableStore,
            fault,
        }
    }
}

impl WillStore for FailingStore {
    fn next_id(&self, kind: IdKind) -> Result<u64, WillError> {
        self.inner.next_id(kind)
    }

    fn get_will(&self, owner: &PrincipalId, will_id: WillId) -> Option<Will> {
        self.inner.get_will(owner, will_id)
    }

    fn get_will_by_type(&self, owner: &PrincipalId, will_type: WillType) -> Option<Will> {
        self.inner.get_will_by_type(owner, will_type)
    }

    fn list_wills(&self, owner: &PrincipalId) -> Vec<Will> {
        self.inner.list_wills(owner)
    }

    fn insert_will(&self, will: &Will) -> Result<(), WillError> {
        self.inner.insert_will(will)
    }

    fn update_will(&self, will: &Will) -> Result<(), WillError> {
        if self.fault == Fault::UpdateWill {
            return Err(WillError::PersistenceFailure("injected update failure".to_string()));
        }
        self.inner.update_will(will)
    }

    fn get_asset(&self, owner: &PrincipalId, asset_id: AssetId) -> Option<Asset> {
        self.inner.get_asset(owner, asset_id)
    }

    fn list_assets(&self, owner: &PrincipalId) -> Vec<Asset> {
        self.inner.list_assets(owner)
    }

    fn put_asset(&self, asset: &Asset) -> Result<(), WillError> {
        self.inner.put_asset(asset)
    }

    fn delete_asset(&self, owner: &PrincipalId, asset_id: AssetId) -> Result<Asset, WillError> {
        self.inner.delete_asset(owner, asset_id)
    }

    fn get_recipient(&self, owner: &PrincipalId, recipient_id: RecipientId) -> Option<Recipient> {
        self.inner.get_recipient(owner, recipient_id)
    }

    fn list_recipients(&self, owner: &PrincipalId) -> Vec<Recipient> {
        self.inner.list_recipients(owner)
    }

    fn put_recipient(&self, recipient: &Recipient) -> Result<(), WillError> {
        self.inner.put_recipient(recipient)
    }

    fn delete_recipient(
        &self,
        owner: &PrincipalId,
        recipient_id: RecipientId,
    ) -> Result<(Recipient, Vec<AssetId>), WillError> {
        self.inner.delete_recipient(owner, recipient_id)
    }

    fn list_allocations_for_asset(&self, asset_id: AssetId) -> Vec<Allocation> {
        self.inner.list_allocations_for_asset(asset_id)
    }

    fn list_allocations_for_owner(&self, owner: &PrincipalId) -> Vec<Allocation> {
        self.inner.list_allocations_for_owner(owner)
    }

    fn delete_allocations_for_asset(&self, asset_id: AssetId) -> Result<usize, WillError> {
        self.inner.delete_allocations_for_asset(asset_id)
    }

    fn insert_allocations(&self, rows: &[Allocation]) -> Result<(), WillError> {
        match self.fault {
            Fault::InsertAllocations => Err(WillError::PersistenceFailure("injected insert failure".to_string())),
            Fault::DropInsertedRows => Ok(()),
            _ => self.inner.insert_allocations(rows),
        }
    }

    fn allocation_version(&self, asset_id: AssetId) -> u64 {
        self.inner.allocation_version(asset_id)
    }

    fn bump_allocation_version(&self, asset_id: AssetId) -> Result<u64, WillError> {
        self.inner.bump_allocation_version(asset_id)
    }
}

/// Records every email; sends to `failing_address` fail.
#[derive(Default)]
pub struct MockEmailSender {
    pub sent: RefCell<Vec<OutgoingEmail>>,
    pub failing_address: Option<String>,
}

impl MockEmailSender {
    pub fn failing_for(address: &str) -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            failing_address: Some(address.to_string()),
        }
    }

    pub fn recipients(&self) -> Vec<String> {
        let mut to: Vec<String> = self.sent.borrow().iter().map(|e| e.to.clone()).collect();
        to.sort();
        to
    }
}

impl EmailSender for MockEmailSender {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), WillError> {
        if self.failing_address.as_deref() == Some(email.to.as_str()) {
            return Err(WillError::NotificationFailed(format!("relay rejected {}", email.to)));
        }
        self.sent.borrow_mut().push(email.clone());
        Ok(())
    }
}
