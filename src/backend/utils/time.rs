use crate::models::common::Timestamp;

/// Returns the current time as nanoseconds since epoch.
///
/// Inside a canister this is the replica's consensus time. Native builds (unit
/// tests) fall back to the system clock.
#[cfg(target_arch = "wasm32")]
pub fn now_ns() -> Timestamp {
    ic_cdk::api::time()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ns() -> Timestamp {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as Timestamp)
        .unwrap_or(0)
}
