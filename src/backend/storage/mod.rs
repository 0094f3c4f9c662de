// src/backend/storage/mod.rs
// Stable memory management using ic-stable-structures

pub mod allocations;
pub mod assets;
pub mod audit_logs;
pub mod config;
pub mod counters;
pub mod memory;
pub mod metrics;
pub mod recipients;
pub mod storable;
pub mod store;
pub mod wills;

// Re-export key storage structures for easier access
pub use counters::IdKind;
pub use memory::Memory;
pub use storable::{Cbor, StorableString};
pub use store::{StableStore, WillStore};
