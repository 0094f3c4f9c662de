// src/backend/services/allocation_service.rs
//
// Keeps, per asset, a set of (recipient, percentage) rows that is either empty
// or sums to exactly 100%. Edits are committed by replacing the whole set.

use crate::{
    error::WillError,
    metrics,
    models::{
        audit_log::LogAction,
        common::{AllocationState, AssetCategory, AssetId, PrincipalId, RecipientId},
        Allocation, AllocationDraft, AllocationRowInput, AllocationSet, Percentage,
    },
    services::validate_input,
    storage::{audit_logs, IdKind, WillStore},
    utils::{logging, time::now_ns},
};
use candid::CandidType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A row that passed validation, percentage normalized to hundredths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedRow {
    pub recipient_id: RecipientId,
    pub percentage: Percentage,
    pub notes: Option<String>,
}

/// Allocation status of one asset, for the dashboard and will readiness.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct AssetAllocationSummary {
    pub asset_id: AssetId,
    pub asset_name: String,
    pub category: AssetCategory,
    pub allocated: Percentage,
    pub recipient_count: u32,
    pub state: AllocationState,
}

/// Current allocation set of an asset. Missing or foreign assets yield an empty set.
pub fn load_allocations<S: WillStore>(store: &S, owner: &PrincipalId, asset_id: AssetId) -> AllocationSet {
    if store.get_asset(owner, asset_id).is_none() {
        return AllocationSet::empty(asset_id);
    }
    AllocationSet {
        asset_id,
        version: store.allocation_version(asset_id),
        rows: store.list_allocations_for_asset(asset_id),
    }
}

/// Every allocation row of the owner, across assets.
pub fn list_allocations<S: WillStore>(store: &S, owner: &PrincipalId) -> Vec<Allocation> {
    store.list_allocations_for_owner(owner)
}

/// Checks an edit buffer without touching storage.
///
/// Rows are checked in order: each percentage, then recipient uniqueness, then
/// the 100% total. An empty set is valid and means "not yet assigned".
pub fn validate_set(rows: &[AllocationRowInput]) -> Result<Vec<ValidatedRow>, WillError> {
    let mut validated = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let percentage = Percentage::parse(&row.percentage).map_err(|reason| WillError::InvalidPercentage {
            row: index as u32,
            value: row.percentage.clone(),
            reason,
        })?;
        validated.push(ValidatedRow {
            recipient_id: row.recipient_id,
            percentage,
            notes: row
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        });
    }

    let mut seen = BTreeSet::new();
    for row in &validated {
        if !seen.insert(row.recipient_id) {
            return Err(WillError::DuplicateRecipient {
                recipient_id: row.recipient_id,
            });
        }
    }

    if !validated.is_empty() {
        let total = Percentage::checked_sum(validated.iter().map(|r| r.percentage))
            .unwrap_or(Percentage::from_hundredths(u32::MAX));
        if total != Percentage::FULL {
            return Err(WillError::AllocationNotComplete { actual_sum: total });
        }
    }

    Ok(validated)
}

/// Replaces the asset's allocation set with the draft's rows.
///
/// Validation, ownership and version checks all run before the first write.
/// After the delete phase any failure is a `PersistenceFailure` and the
/// caller must re-fetch before editing again.
pub fn commit_set<S: WillStore>(
    store: &S,
    owner: &PrincipalId,
    draft: &AllocationDraft,
) -> Result<AllocationSet, WillError> {
    validate_input(draft)?;
    let validated = validate_set(&draft.rows)?;

    let asset = store
        .get_asset(owner, draft.asset_id)
        .ok_or_else(|| WillError::NotFound(format!("Asset {}", draft.asset_id)))?;
    for row in &validated {
        if store.get_recipient(owner, row.recipient_id).is_none() {
            return Err(WillError::NotFound(format!("Recipient {}", row.recipient_id)));
        }
    }

    let current_version = store.allocation_version(asset.asset_id);
    if draft.base_version != current_version {
        return Err(WillError::StaleAllocation {
            asset_id: asset.asset_id,
            expected: draft.base_version,
            actual: current_version,
        });
    }

    let now = now_ns();
    let mut rows = Vec::with_capacity(validated.len());
    for row in validated {
        rows.push(Allocation {
            allocation_id: store.next_id(IdKind::Allocation)?,
            owner: *owner,
            asset_id: asset.asset_id,
            recipient_id: row.recipient_id,
            percentage: row.percentage,
            notes: row.notes,
            created_at: now,
        });
    }

    let committed = replace_rows(store, asset.asset_id, rows)?;

    metrics::record_allocation_commit();
    audit_logs::add_entry(
        owner,
        *owner,
        LogAction::AllocationsCommitted,
        Some(format!(
            "asset={} rows={} version={}",
            asset.asset_id,
            committed.rows.len(),
            committed.version
        )),
    );
    logging::info(format!(
        "Committed {} allocation rows for asset {} (version {})",
        committed.rows.len(),
        asset.asset_id,
        committed.version
    ));
    Ok(committed)
}

/// Drops one recipient's row from an asset, keeping the others untouched.
///
/// The 100% total is not re-checked; the set may be left
/// incomplete until the next full commit.
pub fn remove_recipient<S: WillStore>(
    store: &S,
    owner: &PrincipalId,
    asset_id: AssetId,
    recipient_id: RecipientId,
) -> Result<AllocationSet, WillError> {
    if store.get_asset(owner, asset_id).is_none() {
        return Err(WillError::NotFound(format!("Asset {}", asset_id)));
    }
    let current = store.list_allocations_for_asset(asset_id);
    if !current.iter().any(|row| row.recipient_id == recipient_id) {
        return Err(WillError::NotFound(format!(
            "Allocation of asset {} to recipient {}",
            asset_id, recipient_id
        )));
    }
    let remaining: Vec<Allocation> = current
        .into_iter()
        .filter(|row| row.recipient_id != recipient_id)
        .collect();

    let updated = replace_rows(store, asset_id, remaining)?;

    audit_logs::add_entry(
        owner,
        *owner,
        LogAction::AllocationRemoved,
        Some(format!("asset={} recipient={}", asset_id, recipient_id)),
    );
    if !updated.rows.is_empty() && updated.total() != Percentage::FULL {
        logging::info(format!(
            "Asset {} now allocates {}% after removing recipient {}",
            asset_id,
            updated.total(),
            recipient_id
        ));
    }
    Ok(updated)
}

/// Per-asset allocation totals for the owner.
pub fn allocation_overview<S: WillStore>(store: &S, owner: &PrincipalId) -> Vec<AssetAllocationSummary> {
    store
        .list_assets(owner)
        .into_iter()
        .map(|asset| {
            let rows = store.list_allocations_for_asset(asset.asset_id);
            let allocated = Percentage::checked_sum(rows.iter().map(|r| r.percentage))
                .unwrap_or(Percentage::from_hundredths(u32::MAX));
            let state = if rows.is_empty() {
                AllocationState::Unassigned
            } else if allocated == Percentage::FULL {
                AllocationState::Complete
            } else {
                AllocationState::Incomplete
            };
            AssetAllocationSummary {
                asset_id: asset.asset_id,
                asset_name: asset.name,
                category: asset.category,
                allocated,
                recipient_count: rows.len() as u32,
                state,
            }
        })
        .collect()
}

/// Two-phase replace: delete the stored set, insert `rows`, bump the version,
/// then read back to detect a partial write.
fn replace_rows<S: WillStore>(
    store: &S,
    asset_id: AssetId,
    rows: Vec<Allocation>,
) -> Result<AllocationSet, WillError> {
    store.delete_allocations_for_asset(asset_id).map_err(|e| {
        logging::error(format!("Deleting allocations of asset {} failed: {}", asset_id, e));
        WillError::PersistenceFailure(format!("Could not clear allocations of asset {}: {}", asset_id, e))
    })?;

    if let Err(e) = store.insert_allocations(&rows) {
        // The old set is gone; mark the set as changed so stale drafts are refused.
        if let Err(bump_err) = store.bump_allocation_version(asset_id) {
            logging::error(format!(
                "Could not bump allocation version of asset {} after failed insert: {}",
                asset_id, bump_err
            ));
        }
        logging::error(format!(
            "Inserting allocations of asset {} failed after delete, state indeterminate: {}",
            asset_id, e
        ));
        return Err(WillError::PersistenceFailure(format!(
            "Allocations of asset {} are in an unknown state, re-fetch before retrying: {}",
            asset_id, e
        )));
    }

    let version = store.bump_allocation_version(asset_id).map_err(|e| {
        WillError::PersistenceFailure(format!("Could not update allocation version of asset {}: {}", asset_id, e))
    })?;

    let stored = store.list_allocations_for_asset(asset_id);
    if !same_rows(&stored, &rows) {
        logging::error(format!(
            "Read-back of asset {} returned {} rows, expected {}",
            asset_id,
            stored.len(),
            rows.len()
        ));
        return Err(WillError::PersistenceFailure(format!(
            "Allocations of asset {} did not persist as written, re-fetch before retrying",
            asset_id
        )));
    }

    Ok(AllocationSet {
        asset_id,
        version,
        rows: stored,
    })
}

fn same_rows(stored: &[Allocation], written: &[Allocation]) -> bool {
    let key = |r: &Allocation| (r.recipient_id, r.percentage, r.notes.clone());
    let mut a: Vec<_> = stored.iter().map(key).collect();
    let mut b: Vec<_> = written.iter().map(key).collect();
    a.sort();
    b.sort();
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{
        owner, rows, seed_asset, seed_recipient, FailingStore, Fault,
    };
    use crate::storage::StableStore;

    fn commit(
        store: &impl WillStore,
        owner: &PrincipalId,
        asset_id: AssetId,
        input: &[(RecipientId, &str)],
    ) -> Result<AllocationSet, WillError> {
        let base_version = load_allocations(store, owner, asset_id).version;
        commit_set(
            store,
            owner,
            &AllocationDraft {
                asset_id,
                base_version,
                rows: rows(input),
            },
        )
    }

    fn shares(set: &AllocationSet) -> Vec<(RecipientId, Percentage)> {
        let mut out: Vec<_> = set.rows.iter().map(|r| (r.recipient_id, r.percentage)).collect();
        out.sort();
        out
    }

    #[test]
    fn validate_accepts_empty_and_exact_sets() {
        assert_eq!(validate_set(&[]), Ok(vec![]));
        let ok = validate_set(&rows(&[(1, "33.33"), (2, "33.33"), (3, "33.34")])).unwrap();
        assert_eq!(ok.len(), 3);
    }

    #[test]
    fn validate_reports_the_offending_row() {
        let err = validate_set(&rows(&[(1, "50"), (2, "abc"), (3, "0")])).unwrap_err();
        assert!(matches!(err, WillError::InvalidPercentage { row: 1, .. }));
        assert!(err.is_validation());

        let over = validate_set(&rows(&[(1, "100.5")])).unwrap_err();
        assert!(matches!(over, WillError::InvalidPercentage { row: 0, .. }));
    }

    #[test]
    fn validate_rejects_shares_beyond_two_decimals() {
        assert!(matches!(
            validate_set(&rows(&[(1, "100.004")])).unwrap_err(),
            WillError::InvalidPercentage { row: 0, .. }
        ));
        assert!(matches!(
            validate_set(&rows(&[(1, "50"), (2, "0.004")])).unwrap_err(),
            WillError::InvalidPercentage { row: 1, .. }
        ));
        let err = validate_set(&rows(&[(1, "50.004"), (2, "50.004")])).unwrap_err();
        assert_eq!(
            err,
            WillError::InvalidPercentage {
                row: 0,
                value: "50.004".to_string(),
                reason: "at most two decimals".to_string(),
            }
        );
    }

    #[test]
    fn validate_checks_duplicates_before_the_total() {
        let err = validate_set(&rows(&[(1, "50"), (1, "40")])).unwrap_err();
        assert_eq!(err, WillError::DuplicateRecipient { recipient_id: 1 });
    }

    #[test]
    fn commit_sixty_forty_round_trips() {
        let store = StableStore;
        let me = owner(1);
        let asset = seed_asset(&store, &me, "House");
        let r1 = seed_recipient(&store, &me, "Ana", None);
        let r2 = seed_recipient(&store, &me, "Ben", None);

        let committed = commit(&store, &me, asset, &[(r1, "60"), (r2, "40")]).unwrap();
        assert_eq!(committed.total(), Percentage::FULL);

        let loaded = load_allocations(&store, &me, asset);
        assert_eq!(loaded.version, committed.version);
        assert_eq!(
            shares(&loaded),
            vec![(r1, Percentage::whole(60)), (r2, Percentage::whole(40))]
        );
    }

    #[test]
    fn commit_over_one_hundred_changes_nothing() {
        let store = StableStore;
        let me = owner(2);
        let asset = seed_asset(&store, &me, "Car");
        let r1 = seed_recipient(&store, &me, "Ana", None);
        let r2 = seed_recipient(&store, &me, "Ben", None);
        commit(&store, &me, asset, &[(r1, "100")]).unwrap();
        let before = load_allocations(&store, &me, asset);

        let err = commit(&store, &me, asset, &[(r1, "60"), (r2, "50")]).unwrap_err();
        assert_eq!(
            err,
            WillError::AllocationNotComplete {
                actual_sum: Percentage::whole(110)
            }
        );
        assert_eq!(load_allocations(&store, &me, asset), before);
    }

    #[test]
    fn commit_rejects_duplicate_and_zero_rows() {
        let store = StableStore;
        let me = owner(3);
        let asset = seed_asset(&store, &me, "Ring");
        let r1 = seed_recipient(&store, &me, "Ana", None);

        assert_eq!(
            commit(&store, &me, asset, &[(r1, "50"), (r1, "50")]).unwrap_err(),
            WillError::DuplicateRecipient { recipient_id: r1 }
        );
        assert!(matches!(
            commit(&store, &me, asset, &[(r1, "0")]).unwrap_err(),
            WillError::InvalidPercentage { row: 0, .. }
        ));
        assert!(load_allocations(&store, &me, asset).rows.is_empty());
    }

    #[test]
    fn recommit_replaces_instead_of_merging() {
        let store = StableStore;
        let me = owner(4);
        let asset = seed_asset(&store, &me, "Savings");
        let r1 = seed_recipient(&store, &me, "Ana", None);
        let r2 = seed_recipient(&store, &me, "Ben", None);

        commit(&store, &me, asset, &[(r1, "100")]).unwrap();
        commit(&store, &me, asset, &[(r2, "100")]).unwrap();

        let loaded = load_allocations(&store, &me, asset);
        assert_eq!(shares(&loaded), vec![(r2, Percentage::FULL)]);
    }

    #[test]
    fn empty_commit_clears_the_asset() {
        let store = StableStore;
        let me = owner(5);
        let asset = seed_asset(&store, &me, "Shares");
        let r1 = seed_recipient(&store, &me, "Ana", None);
        commit(&store, &me, asset, &[(r1, "100")]).unwrap();

        let cleared = commit(&store, &me, asset, &[]).unwrap();
        assert!(cleared.rows.is_empty());
        assert!(load_allocations(&store, &me, asset).rows.is_empty());
    }

    #[test]
    fn stale_draft_is_refused() {
        let store = StableStore;
        let me = owner(6);
        let asset = seed_asset(&store, &me, "Cabin");
        let r1 = seed_recipient(&store, &me, "Ana", None);
        let r2 = seed_recipient(&store, &me, "Ben", None);

        // Two editors load the same version
        let tab_a = load_allocations(&store, &me, asset).to_draft();
        let mut tab_b = tab_a.clone();

        let mut first = tab_a;
        first.rows = rows(&[(r1, "100")]);
        commit_set(&store, &me, &first).unwrap();

        tab_b.rows = rows(&[(r2, "100")]);
        let err = commit_set(&store, &me, &tab_b).unwrap_err();
        assert!(matches!(err, WillError::StaleAllocation { expected: 0, actual: 1, .. }));
        assert!(err.requires_refetch());
        assert_eq!(shares(&load_allocations(&store, &me, asset)), vec![(r1, Percentage::FULL)]);
    }

    #[test]
    fn unknown_or_foreign_references_are_not_found() {
        let store = StableStore;
        let me = owner(7);
        let someone_else = owner(8);
        let asset = seed_asset(&store, &me, "Boat");
        let foreign_recipient = seed_recipient(&store, &someone_else, "Eve", None);

        assert!(matches!(
            commit(&store, &me, asset, &[(foreign_recipient, "100")]).unwrap_err(),
            WillError::NotFound(_)
        ));
        assert!(matches!(
            commit(&store, &someone_else, asset, &[(foreign_recipient, "100")]).unwrap_err(),
            WillError::NotFound(_)
        ));
        // Loading a nonexistent asset is not an error
        let missing = load_allocations(&store, &me, 999_999);
        assert!(missing.rows.is_empty());
        assert_eq!(missing.version, 0);
    }

    #[test]
    fn over_precise_commit_changes_nothing() {
        let store = StableStore;
        let me = owner(14);
        let asset = seed_asset(&store, &me, "Orchard");
        let r1 = seed_recipient(&store, &me, "Ana", None);
        let r2 = seed_recipient(&store, &me, "Ben", None);

        let err = commit(&store, &me, asset, &[(r1, "50.004"), (r2, "50.004")]).unwrap_err();
        assert!(matches!(err, WillError::InvalidPercentage { .. }));
        let loaded = load_allocations(&store, &me, asset);
        assert!(loaded.rows.is_empty());
        assert_eq!(loaded.version, 0);
    }

    #[test]
    fn foreign_asset_loads_as_empty() {
        let store = StableStore;
        let me = owner(15);
        let someone_else = owner(16);
        let asset = seed_asset(&store, &me, "Gallery");
        let r1 = seed_recipient(&store, &me, "Ana", None);
        commit(&store, &me, asset, &[(r1, "100")]).unwrap();

        let seen_by_other = load_allocations(&store, &someone_else, asset);
        assert_eq!(seen_by_other, AllocationSet::empty(asset));
        assert_eq!(load_allocations(&store, &me, asset).rows.len(), 1);
    }

    #[test]
    fn remove_recipient_from_missing_asset_is_not_found() {
        let store = StableStore;
        let me = owner(17);
        let r1 = seed_recipient(&store, &me, "Ana", None);
        assert!(matches!(
            remove_recipient(&store, &me, 888_888, r1).unwrap_err(),
            WillError::NotFound(_)
        ));
    }

    #[test]
    fn remove_recipient_leaves_an_incomplete_set() {
        let store = StableStore;
        let me = owner(9);
        let asset = seed_asset(&store, &me, "Art");
        let r1 = seed_recipient(&store, &me, "Ana", None);
        let r2 = seed_recipient(&store, &me, "Ben", None);
        commit(&store, &me, asset, &[(r1, "70"), (r2, "30")]).unwrap();

        let after = remove_recipient(&store, &me, asset, r2).unwrap();
        assert_eq!(shares(&after), vec![(r1, Percentage::whole(70))]);

        let overview = allocation_overview(&store, &me);
        let summary = overview.iter().find(|s| s.asset_id == asset).unwrap();
        assert_eq!(summary.state, AllocationState::Incomplete);
        assert_eq!(summary.allocated, Percentage::whole(70));

        assert!(matches!(
            remove_recipient(&store, &me, asset, r2).unwrap_err(),
            WillError::NotFound(_)
        ));
    }

    #[test]
    fn overview_distinguishes_unassigned_and_complete() {
        let store = StableStore;
        let me = owner(10);
        let empty = seed_asset(&store, &me, "Empty");
        let full = seed_asset(&store, &me, "Full");
        let r1 = seed_recipient(&store, &me, "Ana", None);
        commit(&store, &me, full, &[(r1, "100")]).unwrap();

        let overview = allocation_overview(&store, &me);
        let state_of = |id| overview.iter().find(|s| s.asset_id == id).map(|s| s.state);
        assert_eq!(state_of(empty), Some(AllocationState::Unassigned));
        assert_eq!(state_of(full), Some(AllocationState::Complete));
    }

    #[test]
    fn insert_failure_after_delete_is_a_persistence_failure() {
        let store = FailingStore::new(Fault::InsertAllocations);
        let me = owner(11);
        let asset = seed_asset(&store, &me, "Farm");
        let r1 = seed_recipient(&store, &me, "Ana", None);

        let err = commit(&store, &me, asset, &[(r1, "100")]).unwrap_err();
        assert!(matches!(err, WillError::PersistenceFailure(_)));
        assert!(!err.is_validation());
        assert!(err.requires_refetch());
        // Version moved, so the old draft cannot be replayed blindly
        assert_eq!(store.allocation_version(asset), 1);
    }

    #[test]
    fn read_back_mismatch_is_detected() {
        let store = FailingStore::new(Fault::DropInsertedRows);
        let me = owner(12);
        let asset = seed_asset(&store, &me, "Studio");
        let r1 = seed_recipient(&store, &me, "Ana", None);

        let err = commit(&store, &me, asset, &[(r1, "100")]).unwrap_err();
        assert!(matches!(err, WillError::PersistenceFailure(_)));
    }

    #[test]
    fn stored_rows_stay_unique_per_recipient() {
        let store = StableStore;
        let me = owner(13);
        let asset = seed_asset(&store, &me, "Bonds");
        let r1 = seed_recipient(&store, &me, "Ana", None);
        let r2 = seed_recipient(&store, &me, "Ben", None);
        commit(&store, &me, asset, &[(r1, "50"), (r2, "50")]).unwrap();
        commit(&store, &me, asset, &[(r2, "25.5"), (r1, "74.5")]).unwrap();

        let loaded = load_allocations(&store, &me, asset);
        let unique: BTreeSet<_> = loaded.rows.iter().map(|r| r.recipient_id).collect();
        assert_eq!(unique.len(), loaded.rows.len());
        assert_eq!(loaded.total(), Percentage::FULL);
        assert_eq!(list_allocations(&store, &me).len(), 2);
    }
}
