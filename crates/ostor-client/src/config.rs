//! Client configuration and endpoint parsing.
//!
//! Provides [`ClientConfig`], holding everything that is fixed at client
//! construction time: the endpoint (scheme, host, port), the credentials,
//! and the addressing style. The addressing style is derived from the host:
//! any host under `amazonaws.com` is Amazon proper and must be exactly
//! `s3.amazonaws.com`, addressed virtual-host style; every other host is a
//! self-hosted deployment addressed path-style.

use http::Uri;
use typed_builder::TypedBuilder;

use crate::error::ClientError;

/// The default region, used for self-hosted endpoints and as the bootstrap
/// region for bucket-region discovery.
pub const DEFAULT_REGION: &str = "us-east-1";

/// URL scheme the endpoint speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Plain HTTP, default port 80.
    Http,
    /// HTTPS, default port 443.
    Https,
}

impl Scheme {
    /// The scheme string, as it appears in URLs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    /// The default port for this scheme.
    #[must_use]
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }
}

/// Configuration fixed at client construction.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ClientConfig {
    /// Endpoint scheme.
    pub scheme: Scheme,
    /// Endpoint host, without port.
    pub host: String,
    /// Endpoint port.
    pub port: u16,
    /// Access key ID.
    pub access_key: String,
    /// Secret access key.
    pub secret_key: String,
    /// Whether requests use path-style addressing (bucket in the path)
    /// rather than virtual-host-style (bucket in the host).
    pub path_style: bool,
}

impl ClientConfig {
    /// Parse an endpoint URL into a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidProtocol`] for schemes other than
    /// `http`/`https`, and [`ClientError::InvalidEndpoint`] for malformed
    /// URLs or `amazonaws.com` hosts other than `s3.amazonaws.com`.
    pub fn from_endpoint(
        endpoint: &str,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let invalid = |reason: &str| ClientError::InvalidEndpoint {
            endpoint: endpoint.to_owned(),
            reason: reason.to_owned(),
        };

        let uri: Uri = endpoint.parse().map_err(|_| invalid("not a valid URL"))?;

        let scheme = match uri.scheme_str() {
            Some("http") => Scheme::Http,
            Some("https") => Scheme::Https,
            Some(other) => {
                return Err(ClientError::InvalidProtocol {
                    scheme: other.to_owned(),
                });
            }
            None => return Err(invalid("missing scheme")),
        };

        let host = uri.host().ok_or_else(|| invalid("missing host"))?.to_owned();
        if host.is_empty() {
            return Err(invalid("missing host"));
        }
        if !(uri.path().is_empty() || uri.path() == "/") || uri.query().is_some() {
            return Err(invalid("endpoint must not carry a path or query"));
        }

        // Amazon endpoints are virtual-host style and must be the bare S3
        // endpoint; region-specific hosts are reached through bucket-region
        // discovery, not through the configured endpoint.
        let path_style = if host == "amazonaws.com" || host.ends_with(".amazonaws.com") {
            if host != "s3.amazonaws.com" {
                return Err(invalid("Amazon endpoint must be s3.amazonaws.com"));
            }
            false
        } else {
            true
        };

        let port = uri.port_u16().unwrap_or_else(|| scheme.default_port());

        Ok(Self {
            scheme,
            host,
            port,
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            path_style,
        })
    }

    /// The authority (`host` or `host:port`) clients address, with the port
    /// omitted when it is the scheme default.
    #[must_use]
    pub fn authority(&self) -> String {
        if self.port == self.scheme.default_port() {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// The authority for a given bucket: `bucket.host` for virtual-host
    /// addressing, the plain endpoint authority otherwise.
    #[must_use]
    pub fn bucket_authority(&self, bucket: Option<&str>) -> String {
        match bucket {
            Some(bucket) if !self.path_style => {
                if self.port == self.scheme.default_port() {
                    format!("{bucket}.{}", self.host)
                } else {
                    format!("{bucket}.{}:{}", self.host, self.port)
                }
            }
            _ => self.authority(),
        }
    }
}

/// The library user agent: `Minio (OS; ARCH) lib/VERSION`.
#[must_use]
pub fn base_user_agent() -> String {
    format!(
        "Minio ({}; {}) ostor/{}",
        std::env::consts::OS,
        std::env::consts::ARCH,
        env!("CARGO_PKG_VERSION")
    )
}
