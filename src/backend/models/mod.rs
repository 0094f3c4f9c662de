pub mod allocation;
pub mod asset;
pub mod audit_log;
pub mod common;
pub mod init;
pub mod recipient;
pub mod will;

// Re-export common types/enums for easier access
pub use allocation::{Allocation, AllocationDraft, AllocationRowInput, AllocationSet, Percentage};
pub use asset::{Asset, AssetInput, MonetaryValue};
pub use common::*;
pub use recipient::{Recipient, RecipientInput};
pub use will::{FinalizeRequest, Will, WillContent};
