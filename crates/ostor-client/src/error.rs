//! Client error types.
//!
//! Defines [`ClientError`], the single error enum every public operation
//! returns. Variants follow the taxonomy of failures a client can hit:
//! caller mistakes (`InvalidArgument`, endpoint variants), transport
//! failures, parsed server errors, and the multipart size check.

use ostor_model::response::ErrorDocument;

use crate::transport::TransportError;

/// A parsed S3 `<Error>` response, with request context attached.
#[derive(Debug, Clone, thiserror::Error)]
#[error("server error {code}: {message}")]
pub struct ServerError {
    /// The S3 error code (e.g. `NoSuchBucket`).
    pub code: String,
    /// The human-readable message.
    pub message: String,
    /// HTTP status the error arrived with.
    pub status: u16,
    /// The request ID, when reported.
    pub request_id: Option<String>,
    /// The resource the error refers to, when reported.
    pub resource: Option<String>,
    /// The bucket the failed operation targeted, when known.
    pub bucket: Option<String>,
    /// The object key the failed operation targeted, when known.
    pub key: Option<String>,
}

impl ServerError {
    /// Build a server error from a parsed error document plus call context.
    #[must_use]
    pub fn from_document(
        doc: ErrorDocument,
        status: u16,
        bucket: Option<&str>,
        key: Option<&str>,
    ) -> Self {
        Self {
            code: doc.code,
            message: doc.message,
            status,
            request_id: doc.request_id,
            resource: doc.resource,
            bucket: bucket.map(ToOwned::to_owned),
            key: key.map(ToOwned::to_owned),
        }
    }
}

/// Errors surfaced by client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A caller-supplied argument is malformed or out of range.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong.
        message: String,
    },

    /// The endpoint URL is unusable.
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The endpoint as supplied.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The endpoint scheme is neither `http` nor `https`.
    #[error("invalid protocol '{scheme}': expected http or https")]
    InvalidProtocol {
        /// The scheme as supplied.
        scheme: String,
    },

    /// A transport-level I/O failure, surfaced verbatim.
    #[error(transparent)]
    Network(#[from] TransportError),

    /// The server answered with a parseable `<Error>` document.
    #[error(transparent)]
    Server(#[from] ServerError),

    /// The server answered with an unexpected status and an unparseable body.
    #[error("unexpected status {status}: {snippet}")]
    UnexpectedStatus {
        /// The HTTP status.
        status: u16,
        /// The beginning of the response body.
        snippet: String,
    },

    /// The caller's stream produced a different number of bytes than the
    /// declared object size.
    #[error("size mismatch: declared {expected} bytes, observed {actual}")]
    SizeMismatch {
        /// The declared size.
        expected: u64,
        /// The observed byte count.
        actual: u64,
    },

    /// The server refused a bucket listing.
    ///
    /// Rewritten from the `TemporaryRedirect` answer S3 gives unauthorized
    /// `ListBuckets` calls.
    #[error("access denied")]
    AccessDenied,

    /// The bucket's grant list does not correspond to any canned ACL.
    #[error("unsupported ACL grant combination: {grants}")]
    UnsupportedAcl {
        /// A rendering of the grants seen.
        grants: String,
    },

    /// A metadata or error response body exceeded the buffering bound.
    #[error("metadata response exceeded {limit} bytes")]
    ResponseTooLarge {
        /// The bound that was hit.
        limit: usize,
    },

    /// A signing failure (expiry bounds, incomplete POST policy).
    #[error(transparent)]
    Sign(#[from] ostor_auth::SignError),

    /// A response document failed to parse.
    #[error("xml error: {0}")]
    Xml(#[from] ostor_xml::XmlError),

    /// The caller's input stream failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Shorthand for an [`ClientError::InvalidArgument`].
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// The S3 error code, when this is a server error.
    #[must_use]
    pub fn server_code(&self) -> Option<&str> {
        match self {
            Self::Server(err) => Some(&err.code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_render_server_error() {
        let err = ServerError {
            code: "NoSuchBucket".to_owned(),
            message: "The specified bucket does not exist".to_owned(),
            status: 404,
            request_id: None,
            resource: None,
            bucket: Some("missing".to_owned()),
            key: None,
        };
        let rendered = err.to_string();
        assert!(rendered.contains("NoSuchBucket"));
        assert!(rendered.contains("does not exist"));
    }

    #[test]
    fn test_should_expose_server_code() {
        let err = ClientError::Server(ServerError {
            code: "TemporaryRedirect".to_owned(),
            message: String::new(),
            status: 307,
            request_id: None,
            resource: None,
            bucket: None,
            key: None,
        });
        assert_eq!(err.server_code(), Some("TemporaryRedirect"));
        assert_eq!(ClientError::AccessDenied.server_code(), None);
    }
}
