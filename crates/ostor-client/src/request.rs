//! Request descriptors and the URL & header builder.
//!
//! Each operation builds a [`RequestDescriptor`] naming the method, bucket,
//! key, query parameters, headers, and payload; [`build_request`] turns that
//! plus the [`ClientConfig`] into the concrete request line: host, path, and
//! canonical query, addressed path-style or virtual-host-style.
//!
//! Escaping rules:
//! - Object keys keep `/` as the separator and percent-encode every other
//!   byte outside the unreserved set.
//! - Query keys and values percent-encode everything outside the unreserved
//!   set, including `/`.
//! - The query string is assembled sorted and every parameter carries an
//!   `=` (valueless tokens like `uploads` become `uploads=`), so the string
//!   that is signed is byte-for-byte the string that goes on the wire.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE, HOST, USER_AGENT};
use http::{HeaderMap, Method};

use ostor_auth::canonical::{sort_query, uri_escape, uri_escape_path};

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Default content type for uploads when the caller does not set one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A logical request, before addressing and signing.
///
/// Built fresh per call; immutable once handed to the signer.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: Method,
    /// Target bucket, when the operation addresses one.
    pub bucket: Option<String>,
    /// Target object key, raw (unescaped).
    pub key: Option<String>,
    /// Query parameters, raw; `None` values are valueless tokens (`acl`).
    pub query: Vec<(String, Option<String>)>,
    /// Extra headers beyond the ones the builder adds.
    pub headers: HeaderMap,
    /// Request payload; empty permitted.
    pub payload: Bytes,
    /// Address path-style even on a virtual-host endpoint. Used by the
    /// bucket-region bootstrap, which cannot depend on the region it is
    /// discovering.
    pub force_path_style: bool,
}

impl RequestDescriptor {
    /// Start a descriptor for the given method.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            bucket: None,
            key: None,
            query: Vec::new(),
            headers: HeaderMap::new(),
            payload: Bytes::new(),
            force_path_style: false,
        }
    }

    /// Address a bucket.
    #[must_use]
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// Address an object key (raw, unescaped).
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Append a `key=value` query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), Some(value.into())));
        self
    }

    /// Append a valueless query token (`uploads`, `acl`, `location`); it is
    /// sent as `key=`.
    #[must_use]
    pub fn query_token(mut self, key: impl Into<String>) -> Self {
        self.query.push((key.into(), None));
        self
    }

    /// Set a header.
    ///
    /// # Panics
    ///
    /// Never: invalid names/values are rejected at the call sites, which all
    /// use static names and validated values.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach a payload.
    #[must_use]
    pub fn payload(mut self, payload: Bytes) -> Self {
        self.payload = payload;
        self
    }

    /// Force path-style addressing for this request.
    #[must_use]
    pub fn path_style(mut self) -> Self {
        self.force_path_style = true;
        self
    }
}

/// A request with addressing resolved, ready to sign and send.
#[derive(Debug)]
pub struct BuiltRequest {
    /// The URL to send to.
    pub url: String,
    /// The authority (host header value).
    pub authority: String,
    /// The escaped path, as signed and sent.
    pub path: String,
    /// The canonical query string (may be empty).
    pub query: String,
    /// All request headers, including `Host` and `User-Agent`.
    pub headers: HeaderMap,
}

/// Assemble the canonical query string from raw parameters: escape each key
/// and value, render valueless tokens as `key=`, and sort.
#[must_use]
pub fn canonical_query(params: &[(String, Option<String>)]) -> String {
    let joined = params
        .iter()
        .map(|(key, value)| match value {
            Some(value) => format!("{}={}", uri_escape(key), uri_escape(value)),
            None => format!("{}=", uri_escape(key)),
        })
        .collect::<Vec<_>>()
        .join("&");
    sort_query(&joined)
}

/// Resolve addressing and assemble the request line and headers.
///
/// Path-style: the bucket is the first path segment. Virtual-host style: the
/// bucket becomes a host label and the path carries only the key.
///
/// # Errors
///
/// Returns [`ClientError::InvalidArgument`] if the descriptor names a key
/// without a bucket, or if a header value is malformed.
pub fn build_request(
    config: &ClientConfig,
    desc: &RequestDescriptor,
    user_agent: &str,
) -> Result<BuiltRequest, ClientError> {
    if desc.key.is_some() && desc.bucket.is_none() {
        return Err(ClientError::invalid_argument(
            "object operations require a bucket",
        ));
    }

    let path_style = config.path_style || desc.force_path_style;
    let authority = if path_style {
        config.authority()
    } else {
        config.bucket_authority(desc.bucket.as_deref())
    };

    let mut path = String::from("/");
    if path_style {
        if let Some(bucket) = &desc.bucket {
            path.push_str(bucket);
            if desc.key.is_some() {
                path.push('/');
            }
        }
    }
    if let Some(key) = &desc.key {
        path.push_str(&uri_escape_path(key));
    }

    let query = canonical_query(&desc.query);

    let mut headers = desc.headers.clone();
    headers.insert(
        HOST,
        HeaderValue::from_str(&authority)
            .map_err(|_| ClientError::invalid_argument("bucket name is not a valid host label"))?,
    );
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent)
            .map_err(|_| ClientError::invalid_argument("app info is not a valid header value"))?,
    );
    if !desc.payload.is_empty() && !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    }

    let mut url = format!("{}://{authority}{path}", config.scheme.as_str());
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query);
    }

    Ok(BuiltRequest {
        url,
        authority,
        path,
        query,
        headers,
    })
}
