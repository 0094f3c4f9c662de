pub mod allocation_service;
pub mod asset_service;
pub mod notification_service;
pub mod recipient_service;
pub mod will_service;

#[cfg(test)]
pub(crate) mod test_support;

use crate::error::WillError;
use validator::Validate;

/// Runs `validator` rules and maps failures to `WillError::InvalidInput`.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), WillError> {
    input
        .validate()
        .map_err(|e| WillError::InvalidInput(e.to_string()))
}
