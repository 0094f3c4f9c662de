// src/backend/utils/crypto.rs
use sha2::{Digest, Sha256};

/// Checksum over several optional text fields.
///
/// Each field is length-prefixed so `("ab", "c")` and `("a", "bc")` differ.
pub fn checksum_fields(fields: &[Option<&str>]) -> String {
    let mut hasher = Sha256::new();
    for field in fields {
        match field {
            Some(value) => {
                hasher.update([1u8]);
                hasher.update((value.len() as u64).to_be_bytes());
                hasher.update(value.as_bytes());
            }
            None => hasher.update([0u8]),
        }
    }
    hex::encode(hasher.finalize())
}
