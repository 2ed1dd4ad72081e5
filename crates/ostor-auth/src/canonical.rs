//! Canonical request assembly for AWS Signature Version 4.
//!
//! The client builds requests in canonical form from the start: object paths
//! are escaped once with [`uri_escape_path`], and query strings are rendered
//! with every parameter in `key=value` form and sorted before they go on the
//! wire. What gets signed is therefore exactly what gets sent, and this
//! module only has to normalize headers and stitch the pieces together:
//!
//! ```text
//! HTTPRequestMethod\n
//! CanonicalURI\n
//! CanonicalQueryString\n
//! CanonicalHeaders\n\n
//! SignedHeaders\n
//! HashedPayload
//! ```

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// The set of characters that must be percent-encoded in URI path segments
/// and query values: everything outside the RFC 3986 unreserved set
/// (A-Z, a-z, 0-9, `-`, `_`, `.`, `~`).
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a single path segment or query value using the AWS SigV4
/// encoding rules: every byte outside the unreserved set is encoded,
/// including `/`.
///
/// # Examples
///
/// ```
/// use ostor_auth::canonical::uri_escape;
///
/// assert_eq!(uri_escape("some key.txt"), "some%20key.txt");
/// assert_eq!(uri_escape("a/b"), "a%2Fb");
/// ```
#[must_use]
pub fn uri_escape(input: &str) -> String {
    utf8_percent_encode(input, URI_ENCODE_SET).to_string()
}

/// Percent-encode an object path, preserving `/` as the segment separator.
///
/// Every segment is encoded with [`uri_escape`]; empty segments (leading
/// slash, doubled slashes) pass through unchanged.
///
/// # Examples
///
/// ```
/// use ostor_auth::canonical::uri_escape_path;
///
/// assert_eq!(uri_escape_path("photos/some key.txt"), "photos/some%20key.txt");
/// ```
#[must_use]
pub fn uri_escape_path(path: &str) -> String {
    path.split('/')
        .map(uri_escape)
        .collect::<Vec<_>>()
        .join("/")
}

/// Sort a `&`-joined query string by parameter name, then by value for
/// duplicate names. Tokens arrive already escaped and keep their exact
/// bytes; only their order changes.
///
/// # Examples
///
/// ```
/// use ostor_auth::canonical::sort_query;
///
/// assert_eq!(sort_query("b=2&a=1"), "a=1&b=2");
/// assert_eq!(sort_query("k=b&k=a"), "k=a&k=b");
/// ```
#[must_use]
pub fn sort_query(query: &str) -> String {
    let mut params: Vec<&str> = query.split('&').filter(|t| !t.is_empty()).collect();
    params.sort_unstable_by_key(|t| t.split_once('=').unwrap_or((*t, "")));
    params.join("&")
}

/// A canonical request plus the signed-headers list derived with it.
#[derive(Debug, Clone)]
pub struct CanonicalRequest {
    /// The canonical request text, ready to hash.
    pub text: String,
    /// The semicolon-joined, sorted, lowercase signed-header names.
    pub signed_headers: String,
}

/// Assemble the canonical request.
///
/// `path` and `query` are taken verbatim: the path already resource-escaped
/// (an empty path canonicalizes to `/`), the query already sorted with every
/// parameter in `key=value` form. Every header given is signed: names are
/// lowercased, values trimmed with interior whitespace collapsed, repeats
/// merged with commas, and the whole set ordered by name.
///
/// # Examples
///
/// ```
/// use ostor_auth::canonical::canonical_request;
///
/// let canonical = canonical_request(
///     "GET",
///     "/test.txt",
///     "",
///     &[("host".to_owned(), "examplebucket.s3.amazonaws.com".to_owned())],
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
/// );
/// assert!(canonical.text.starts_with("GET\n/test.txt\n"));
/// assert_eq!(canonical.signed_headers, "host");
/// ```
#[must_use]
pub fn canonical_request(
    method: &str,
    path: &str,
    query: &str,
    headers: &[(String, String)],
    payload_hash: &str,
) -> CanonicalRequest {
    let mut header_map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = collapse_whitespace(value);
        header_map
            .entry(name.to_lowercase())
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    let signed_headers = header_map.keys().cloned().collect::<Vec<_>>().join(";");
    let canonical_headers = header_map
        .iter()
        .map(|(name, value)| format!("{name}:{value}"))
        .collect::<Vec<_>>()
        .join("\n");

    let path = if path.is_empty() { "/" } else { path };
    let text = format!(
        "{method}\n{path}\n{query}\n{canonical_headers}\n\n{signed_headers}\n{payload_hash}"
    );

    CanonicalRequest {
        text,
        signed_headers,
    }
}

/// Trim a header value and collapse interior whitespace runs to one space.
fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
