// src/backend/utils/rate_limit.rs
use crate::error::WillError;
use crate::models::common::{PrincipalId, Timestamp};
use crate::utils::time::now_ns;
use std::cell::RefCell;
use std::collections::HashMap;

// --- Configuration ---
const RATE_LIMIT_CAPACITY: u32 = 20; // Max tokens in bucket (burst capacity)
const RATE_LIMIT_REFILL_RATE_PER_SEC: f64 = 1.0; // Tokens added per second

struct TokenBucket {
    tokens: f64,
    last_refill_time_ns: Timestamp,
}

impl TokenBucket {
    fn new(now_ns: Timestamp) -> Self {
        TokenBucket {
            tokens: RATE_LIMIT_CAPACITY as f64,
            last_refill_time_ns: now_ns,
        }
    }

    fn refill(&mut self, now_ns: Timestamp) {
        let elapsed_secs = (now_ns.saturating_sub(self.last_refill_time_ns)) as f64 / 1_000_000_000.0;
        let tokens_to_add = elapsed_secs * RATE_LIMIT_REFILL_RATE_PER_SEC;

        self.tokens = (self.tokens + tokens_to_add).min(RATE_LIMIT_CAPACITY as f64);
        self.last_refill_time_ns = now_ns;
    }

    fn take(&mut self, now_ns: Timestamp) -> bool {
        self.refill(now_ns);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

thread_local! {
    // In-memory map for rate limiting. Cleared on upgrade.
    static PRINCIPAL_BUCKETS: RefCell<HashMap<PrincipalId, TokenBucket>> = RefCell::new(HashMap::new());
}

/// Takes one token from the caller's bucket at `now_ns`.
pub fn check_rate_at(caller: PrincipalId, now_ns: Timestamp) -> Result<(), WillError> {
    PRINCIPAL_BUCKETS.with(|buckets_refcell| {
        let mut buckets = buckets_refcell.borrow_mut();
        let bucket = buckets
            .entry(caller)
            .or_insert_with(|| TokenBucket::new(now_ns));

        if bucket.take(now_ns) {
            Ok(())
        } else {
            Err(WillError::RateLimitExceeded(format!(
                "Rate limit exceeded for principal {}. Please try again later.",
                caller
            )))
        }
    })
}

/// Rate limiting for update calls.
pub fn rate_guard(caller: PrincipalId) -> Result<(), WillError> {
    check_rate_at(caller, now_ns())
}
