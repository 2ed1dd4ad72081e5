//! Error types for request signing.

/// Errors that can occur while signing requests, presigning URLs, or
/// building POST policies.
#[derive(Debug, thiserror::Error)]
pub enum SignError {
    /// The presign expiry is out of the `1..=604_800` second range.
    #[error("expiry must be between 1 second and 7 days, got {0} seconds")]
    InvalidExpiry(u64),

    /// The POST policy is missing a required field.
    #[error("post policy is missing required field: {0}")]
    IncompletePolicy(&'static str),

    /// The POST policy expiration is already in the past.
    #[error("post policy expiration is in the past")]
    ExpiredPolicy,

    /// A POST policy value is malformed.
    #[error("invalid post policy value: {0}")]
    InvalidPolicy(String),
}
