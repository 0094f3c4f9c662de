// src/backend/models/allocation.rs
use crate::models::common::{AllocationId, AssetId, PrincipalId, RecipientId, Timestamp};
use candid::CandidType;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// A share of an asset in hundredths of a percent (`10_000` == 100%).
///
/// Fixed-point keeps sums exact: `33.33 + 33.33 + 33.34` is exactly `100.00`.
#[derive(CandidType, Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percentage(u32);

impl Percentage {
    pub const SCALE: u32 = 2;
    pub const FULL: Percentage = Percentage(10_000);
    pub const ZERO: Percentage = Percentage(0);

    pub const fn from_hundredths(hundredths: u32) -> Self {
        Percentage(hundredths)
    }

    pub const fn hundredths(&self) -> u32 {
        self.0
    }

    /// Whole percent helper, mostly for tests and seed data.
    pub const fn whole(percent: u32) -> Self {
        Percentage(percent * 100)
    }

    /// Share must lie in (0, 100].
    pub fn is_valid_share(&self) -> bool {
        self.0 > 0 && *self <= Self::FULL
    }

    /// Parses user input such as `"60"`, `"33.33"` or `" 12.5 "`.
    ///
    /// The range is checked on the value as typed, and more than two decimal
    /// places is rejected, so the stored share always equals the input.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("value is empty".to_string());
        }
        let decimal = Decimal::from_str(trimmed).map_err(|_| "not a number".to_string())?;
        if decimal <= Decimal::ZERO {
            return Err("must be greater than 0".to_string());
        }
        if decimal > Decimal::ONE_HUNDRED {
            return Err("must not exceed 100".to_string());
        }
        let normalized = decimal.normalize();
        if normalized.scale() > Self::SCALE {
            return Err("at most two decimals".to_string());
        }
        let hundredths = (normalized * Decimal::ONE_HUNDRED)
            .to_u32()
            .ok_or_else(|| "out of range".to_string())?;
        Ok(Percentage(hundredths))
    }

    /// Sums shares without overflow; `None` only past `u32::MAX` hundredths.
    pub fn checked_sum<I: IntoIterator<Item = Percentage>>(shares: I) -> Option<Percentage> {
        shares
            .into_iter()
            .try_fold(0u32, |acc, p| acc.checked_add(p.0))
            .map(Percentage)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// A persisted allocation row.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    pub allocation_id: AllocationId,
    pub owner: PrincipalId,
    pub asset_id: AssetId,
    pub recipient_id: RecipientId,
    pub percentage: Percentage,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

/// One row of the allocation edit buffer, percentage still as typed.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Validate)]
pub struct AllocationRowInput {
    pub recipient_id: RecipientId,
    pub percentage: String,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

impl AllocationRowInput {
    pub fn new(recipient_id: RecipientId, percentage: impl Into<String>) -> Self {
        Self {
            recipient_id,
            percentage: percentage.into(),
            notes: None,
        }
    }
}

/// The in-progress edit buffer for one asset, handed to the commit as a value.
///
/// `base_version` is the set version observed when the rows were loaded.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Validate)]
pub struct AllocationDraft {
    pub asset_id: AssetId,
    pub base_version: u64,
    #[validate(length(max = 200), nested)]
    pub rows: Vec<AllocationRowInput>,
}

/// Current allocations of an asset together with the set version.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct AllocationSet {
    pub asset_id: AssetId,
    pub version: u64,
    pub rows: Vec<Allocation>,
}

impl AllocationSet {
    pub fn empty(asset_id: AssetId) -> Self {
        Self {
            asset_id,
            version: 0,
            rows: Vec::new(),
        }
    }

    pub fn total(&self) -> Percentage {
        Percentage::checked_sum(self.rows.iter().map(|r| r.percentage)).unwrap_or(Percentage(u32::MAX))
    }

    /// Converts the stored rows back into an edit buffer.
    pub fn to_draft(&self) -> AllocationDraft {
        AllocationDraft {
            asset_id: self.asset_id,
            base_version: self.version,
            rows: self
                .rows
                .iter()
                .map(|r| AllocationRowInput {
                    recipient_id: r.recipient_id,
                    percentage: r.percentage.to_string(),
                    notes: r.notes.clone(),
                })
                .collect(),
        }
    }
}
