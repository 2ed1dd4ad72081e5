//! Browser POST policy construction and signing.
//!
//! A POST policy is a JSON document constraining what a browser form may
//! upload:
//!
//! ```json
//! {
//!   "expiration": "2026-08-02T00:00:00.000Z",
//!   "conditions": [
//!     ["eq", "$bucket", "my-bucket"],
//!     ["starts-with", "$key", "photos/"],
//!     ["content-length-range", 1, 10485760]
//!   ]
//! }
//! ```
//!
//! The policy is base64-encoded, signed with the SigV4 signing key
//! ([`sign_post_policy`]), and shipped alongside the companion form fields as
//! `multipart/form-data`.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Value, json};

use crate::error::SignError;
use crate::signer::{SERVICE, derive_signing_key};

/// A browser POST policy under construction.
///
/// Setters accumulate both the policy conditions and the companion form
/// fields; [`PostPolicy::policy_json`] renders the document to sign.
#[derive(Debug, Clone, Default)]
pub struct PostPolicy {
    expiration: Option<DateTime<Utc>>,
    conditions: Vec<Value>,
    form_data: BTreeMap<String, String>,
}

impl PostPolicy {
    /// Create an empty policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the policy expiration time.
    pub fn set_expires(&mut self, t: DateTime<Utc>) {
        self.expiration = Some(t);
    }

    /// The policy expiration time, if set.
    #[must_use]
    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.expiration
    }

    /// Constrain the upload to an exact bucket.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::InvalidPolicy`] if the bucket name is empty.
    pub fn set_bucket(&mut self, bucket: &str) -> Result<(), SignError> {
        if bucket.is_empty() {
            return Err(SignError::InvalidPolicy("bucket must not be empty".to_owned()));
        }
        self.push_eq_condition("bucket", bucket);
        Ok(())
    }

    /// Constrain the upload to an exact object key.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::InvalidPolicy`] if the key is empty.
    pub fn set_key(&mut self, key: &str) -> Result<(), SignError> {
        if key.is_empty() {
            return Err(SignError::InvalidPolicy("key must not be empty".to_owned()));
        }
        self.push_eq_condition("key", key);
        Ok(())
    }

    /// Constrain the upload to object keys beginning with `prefix`, and seed
    /// the form's `key` field with that prefix.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::InvalidPolicy`] if the prefix is empty.
    pub fn set_key_starts_with(&mut self, prefix: &str) -> Result<(), SignError> {
        if prefix.is_empty() {
            return Err(SignError::InvalidPolicy("key prefix must not be empty".to_owned()));
        }
        self.conditions
            .push(json!(["starts-with", "$key", prefix]));
        self.form_data.insert("key".to_owned(), prefix.to_owned());
        Ok(())
    }

    /// Constrain the upload's `Content-Type`.
    pub fn set_content_type(&mut self, content_type: &str) {
        self.push_eq_condition("Content-Type", content_type);
    }

    /// Constrain the upload size to `min..=max` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::InvalidPolicy`] if `min > max`.
    pub fn set_content_length_range(&mut self, min: u64, max: u64) -> Result<(), SignError> {
        if min > max {
            return Err(SignError::InvalidPolicy(format!(
                "content-length-range minimum {min} exceeds maximum {max}"
            )));
        }
        self.conditions
            .push(json!(["content-length-range", min, max]));
        Ok(())
    }

    /// Append an exact-match condition and mirror it into the form fields.
    ///
    /// Used for the `x-amz-*` fields the signing flow stamps onto the policy.
    pub fn push_eq_condition(&mut self, field: &str, value: &str) {
        self.conditions
            .push(json!(["eq", format!("${field}"), value]));
        self.form_data.insert(field.to_owned(), value.to_owned());
    }

    /// Whether a condition on `field` is present.
    #[must_use]
    pub fn has_condition(&self, field: &str) -> bool {
        let dollar = format!("${field}");
        self.conditions.iter().any(|c| {
            c.as_array()
                .and_then(|triple| triple.get(1))
                .and_then(Value::as_str)
                .is_some_and(|f| f == dollar)
        })
    }

    /// The bucket this policy constrains uploads to, when set.
    #[must_use]
    pub fn bucket(&self) -> Option<&str> {
        self.form_data.get("bucket").map(String::as_str)
    }

    /// The companion form fields accumulated so far.
    #[must_use]
    pub fn form_data(&self) -> &BTreeMap<String, String> {
        &self.form_data
    }

    /// Consume the policy, yielding its form fields.
    #[must_use]
    pub fn into_form_data(self) -> BTreeMap<String, String> {
        self.form_data
    }

    /// Check the policy is complete enough to sign: expiration set, bucket
    /// condition present, key (or key-prefix) condition present.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::IncompletePolicy`] naming the missing field.
    pub fn validate(&self) -> Result<(), SignError> {
        if self.expiration.is_none() {
            return Err(SignError::IncompletePolicy("expiration"));
        }
        if !self.has_condition("bucket") {
            return Err(SignError::IncompletePolicy("bucket"));
        }
        if !self.has_condition("key") {
            return Err(SignError::IncompletePolicy("key"));
        }
        Ok(())
    }

    /// Render the policy document as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::IncompletePolicy`] if no expiration is set.
    pub fn policy_json(&self) -> Result<String, SignError> {
        let expiration = self
            .expiration
            .ok_or(SignError::IncompletePolicy("expiration"))?;
        let doc = json!({
            "expiration": expiration.to_rfc3339_opts(SecondsFormat::Millis, true),
            "conditions": self.conditions,
        });
        Ok(doc.to_string())
    }
}

/// Sign a base64-encoded POST policy.
///
/// Returns the hex HMAC-SHA256 of the policy under the signing key derived
/// from `(secret_key, date, region, "s3")`. The caller supplies the matching
/// `x-amz-algorithm`, `x-amz-credential`, and `x-amz-date` form fields.
#[must_use]
pub fn sign_post_policy(policy_base64: &str, secret_key: &str, date: &str, region: &str) -> String {
    let signing_key = derive_signing_key(secret_key, date, region, SERVICE);
    crate::signer::compute_signature(&signing_key, policy_base64)
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
    use chrono::TimeZone;

    use super::*;

    fn expiry() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 2, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_should_render_policy_json_with_conditions() {
        let mut policy = PostPolicy::new();
        policy.set_expires(expiry());
        policy.set_bucket("my-bucket").unwrap();
        policy.set_key("photos/cat.png").unwrap();
        policy.set_content_length_range(1, 10_485_760).unwrap();

        let doc = policy.policy_json().unwrap();
        assert!(doc.contains("\"expiration\":\"2026-08-02T00:00:00.000Z\""));
        assert!(doc.contains("[\"eq\",\"$bucket\",\"my-bucket\"]"));
        assert!(doc.contains("[\"eq\",\"$key\",\"photos/cat.png\"]"));
        assert!(doc.contains("[\"content-length-range\",1,10485760]"));
    }

    #[test]
    fn test_should_mirror_conditions_into_form_data() {
        let mut policy = PostPolicy::new();
        policy.set_bucket("my-bucket").unwrap();
        policy.set_key("k.txt").unwrap();
        policy.set_content_type("text/plain");

        let form = policy.form_data();
        assert_eq!(form.get("bucket").unwrap(), "my-bucket");
        assert_eq!(form.get("key").unwrap(), "k.txt");
        assert_eq!(form.get("Content-Type").unwrap(), "text/plain");
    }

    #[test]
    fn test_should_set_key_prefix_condition_and_form_key() {
        let mut policy = PostPolicy::new();
        policy.set_key_starts_with("uploads/").unwrap();

        let doc = {
            policy.set_expires(expiry());
            policy.policy_json().unwrap()
        };
        assert!(doc.contains("[\"starts-with\",\"$key\",\"uploads/\"]"));
        assert_eq!(policy.form_data().get("key").unwrap(), "uploads/");
        assert!(policy.has_condition("key"));
    }

    #[test]
    fn test_should_reject_incomplete_policy() {
        let mut policy = PostPolicy::new();
        assert!(matches!(
            policy.validate(),
            Err(SignError::IncompletePolicy("expiration"))
        ));

        policy.set_expires(expiry());
        assert!(matches!(
            policy.validate(),
            Err(SignError::IncompletePolicy("bucket"))
        ));

        policy.set_bucket("b-ok").unwrap();
        assert!(matches!(
            policy.validate(),
            Err(SignError::IncompletePolicy("key"))
        ));

        policy.set_key("k").unwrap();
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_should_reject_inverted_content_length_range() {
        let mut policy = PostPolicy::new();
        assert!(policy.set_content_length_range(10, 1).is_err());
    }

    #[test]
    fn test_should_sign_policy_deterministically() {
        let policy_b64 = BASE64_STANDARD.encode(b"{\"expiration\":\"2026-08-02T00:00:00.000Z\",\"conditions\":[]}");
        let a = sign_post_policy(
            &policy_b64,
            "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY",
            "20260802",
            "us-east-1",
        );
        let b = sign_post_policy(
            &policy_b64,
            "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY",
            "20260802",
            "us-east-1",
        );
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.bytes().all(|b| b.is_ascii_hexdigit()));
    }
}
