//! Credential validity checks.

use std::collections::HashMap;

use serde_json::Value;
use time::OffsetDateTime;

/// Response key under which the expiry outcome is reported.
pub const VALIDATE_EXPIRY_DATE: &str = "validateExpiryDate";

/// Check a credential's expiration date against wall-clock time.
///
/// When `check_expiry` is false the check is considered passed and the
/// response map is left untouched. Otherwise the outcome is written under
/// [`VALIDATE_EXPIRY_DATE`] and returned.
pub fn validate_expiry(
    check_expiry: bool,
    expiration: OffsetDateTime,
    response: &mut HashMap<String, Value>,
) -> bool {
    if !check_expiry {
        return true;
    }

    let valid = expiration >= OffsetDateTime::now_utc();
    response.insert(VALIDATE_EXPIRY_DATE.to_string(), Value::Bool(valid));
    valid
}
