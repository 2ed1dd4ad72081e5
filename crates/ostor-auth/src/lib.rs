//! AWS Signature Version 4 request signing for ostor.
//!
//! This crate implements the client side of SigV4 for the S3 service in
//! three modes:
//!
//! - **Header signing** ([`sign_request`]) for live requests: produces the
//!   `Authorization` header value from the canonical request.
//! - **Query pre-signing** ([`presign_url`]): moves the authentication into
//!   `X-Amz-*` query parameters, yielding a URL an unauthenticated client
//!   can use until it expires.
//! - **POST policy signing** ([`sign_post_policy`]): signs a base64-encoded
//!   browser upload policy built with [`PostPolicy`].
//!
//! All three modes are deterministic: identical inputs produce byte-identical
//! output. Timestamps are explicit parameters rather than being read from the
//! clock, which is what makes the published AWS test vectors directly
//! checkable.
//!
//! # Modules
//!
//! - [`canonical`] - Canonical request construction per the SigV4 specification
//! - [`error`] - Signing error types
//! - [`post_policy`] - Browser POST policy document builder and signer
//! - [`presign`] - Presigned URL production
//! - [`signer`] - Key derivation and header signing

pub mod canonical;
pub mod error;
pub mod post_policy;
pub mod presign;
pub mod signer;

pub use error::SignError;
pub use post_policy::{PostPolicy, sign_post_policy};
pub use presign::{MAX_EXPIRY_SECONDS, PresignRequest, presign_url};
pub use signer::{
    ALGORITHM, Authorization, SERVICE, SignRequest, UNSIGNED_PAYLOAD, amz_date, hash_payload,
    sign_request,
};
