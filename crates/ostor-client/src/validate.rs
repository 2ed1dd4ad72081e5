//! Argument validation for the public façade.
//!
//! Content checks on caller-supplied values, following the rules in the
//! [Amazon S3 documentation](https://docs.aws.amazon.com/AmazonS3/latest/userguide/bucketnamingrules.html).
//! All checks run synchronously at the call site and return
//! [`ClientError::InvalidArgument`] before any network activity.

use std::net::Ipv4Addr;

use crate::error::ClientError;

/// Minimum bucket name length.
const MIN_BUCKET_NAME_LEN: usize = 3;

/// Maximum bucket name length.
const MAX_BUCKET_NAME_LEN: usize = 63;

/// Maximum object key length in bytes.
const MAX_KEY_BYTES: usize = 1024;

/// Validate an S3 bucket name.
///
/// Rules (per AWS documentation):
/// - 3-63 characters long
/// - Only lowercase letters, numbers, hyphens, and dots
/// - Must start and end with a letter or number
/// - No consecutive dots (`..`)
/// - Not formatted as an IPv4 address (e.g. `192.168.0.1`)
///
/// # Errors
///
/// Returns [`ClientError::InvalidArgument`] naming the violated rule.
pub fn validate_bucket_name(name: &str) -> Result<(), ClientError> {
    let len = name.len();

    if !(MIN_BUCKET_NAME_LEN..=MAX_BUCKET_NAME_LEN).contains(&len) {
        return Err(ClientError::invalid_argument(format!(
            "bucket name '{name}' must be between {MIN_BUCKET_NAME_LEN} and {MAX_BUCKET_NAME_LEN} characters long"
        )));
    }

    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.')
    {
        return Err(ClientError::invalid_argument(format!(
            "bucket name '{name}' must only contain lowercase letters, numbers, hyphens, and dots"
        )));
    }

    let first = name.as_bytes()[0];
    let last = name.as_bytes()[len - 1];
    if !(first.is_ascii_lowercase() || first.is_ascii_digit())
        || !(last.is_ascii_lowercase() || last.is_ascii_digit())
    {
        return Err(ClientError::invalid_argument(format!(
            "bucket name '{name}' must start and end with a letter or number"
        )));
    }

    if name.contains("..") {
        return Err(ClientError::invalid_argument(format!(
            "bucket name '{name}' must not contain consecutive dots"
        )));
    }

    if name.parse::<Ipv4Addr>().is_ok() {
        return Err(ClientError::invalid_argument(format!(
            "bucket name '{name}' must not be formatted as an IP address"
        )));
    }

    Ok(())
}

/// Validate an S3 object key: non-empty, at most 1024 bytes.
///
/// # Errors
///
/// Returns [`ClientError::InvalidArgument`] on violation.
pub fn validate_object_key(key: &str) -> Result<(), ClientError> {
    if key.is_empty() {
        return Err(ClientError::invalid_argument("object key must not be empty"));
    }
    if key.len() > MAX_KEY_BYTES {
        return Err(ClientError::invalid_argument(format!(
            "object key must be at most {MAX_KEY_BYTES} bytes, got {}",
            key.len()
        )));
    }
    Ok(())
}

/// Validate a region code: non-empty, no whitespace.
///
/// # Errors
///
/// Returns [`ClientError::InvalidArgument`] on violation.
pub fn validate_region(region: &str) -> Result<(), ClientError> {
    if region.is_empty() || region.chars().any(char::is_whitespace) {
        return Err(ClientError::invalid_argument(format!(
            "invalid region '{region}'"
        )));
    }
    Ok(())
}
