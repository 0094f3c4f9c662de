use crate::storage::metrics::{get_metrics, update_metrics};
use crate::utils::logging;
use candid::{CandidType, Deserialize};
use serde::Serialize;

/// Canister-wide counters exposed to the admin.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct WillMetrics {
    pub wills_created: u64,
    pub wills_completed: u64,
    pub assets_created: u64,
    pub recipients_created: u64,
    pub allocation_commits: u64,
    pub notifications_sent: u64,
    pub notifications_failed: u64,
}

// Metric writes never fail a user operation; errors are logged.
fn record<F: FnOnce(&mut WillMetrics)>(what: &str, update_fn: F) {
    if let Err(e) = update_metrics(update_fn) {
        logging::error(format!("Failed to record metric {}: {}", what, e));
    }
}

pub fn record_will_created() {
    record("wills_created", |m| m.wills_created = m.wills_created.saturating_add(1));
}

pub fn record_will_completed() {
    record("wills_completed", |m| m.wills_completed = m.wills_completed.saturating_add(1));
}

pub fn record_asset_created() {
    record("assets_created", |m| m.assets_created = m.assets_created.saturating_add(1));
}

pub fn record_recipient_created() {
    record("recipients_created", |m| {
        m.recipients_created = m.recipients_created.saturating_add(1)
    });
}

pub fn record_allocation_commit() {
    record("allocation_commits", |m| {
        m.allocation_commits = m.allocation_commits.saturating_add(1)
    });
}

pub fn record_notifications(sent: u32, failed: u32) {
    record("notifications", |m| {
        m.notifications_sent = m.notifications_sent.saturating_add(sent as u64);
        m.notifications_failed = m.notifications_failed.saturating_add(failed as u64);
    });
}

pub fn get_will_metrics() -> WillMetrics {
    get_metrics()
}
