//! The HTTP transport seam.
//!
//! The client core builds fully-signed `http::Request` values and hands them
//! to a [`Transport`]. The default implementation wraps `reqwest`; tests and
//! embedders can substitute their own (a recorded transport, a custom pool,
//! a proxy-aware stack) without touching the pipeline.
//!
//! Response bodies are exposed as a stream of byte chunks so that object
//! downloads pass through without buffering while small metadata responses
//! are collected by the response pipeline.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use http::{HeaderMap, StatusCode};

/// A lazily-consumed response body.
pub type BodyStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// Transport-level failures, surfaced verbatim to the caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The request could not be built or sent.
    #[error("request error: {0}")]
    Request(String),

    /// The connection failed or was interrupted.
    #[error("connection error: {0}")]
    Connect(String),

    /// The response body stream failed mid-read.
    #[error("body error: {0}")]
    Body(String),
}

/// An HTTP response as the pipeline consumes it.
pub struct HttpResponse {
    /// The response status.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The response body, as a lazy chunk stream.
    pub body: BodyStream,
}

impl HttpResponse {
    /// A response with an in-memory body, chunked as a single item.
    #[must_use]
    pub fn from_bytes(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        let chunks: Vec<Result<Bytes, TransportError>> =
            if body.is_empty() { vec![] } else { vec![Ok(body)] };
        Self {
            status,
            headers,
            body: futures::stream::iter(chunks).boxed(),
        }
    }

    /// A header value as a string, when present and valid UTF-8.
    #[must_use]
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// The HTTP edge of the client.
///
/// Implementations send one fully-built request and return the response with
/// a streamed body. They must not retry, redirect, or otherwise reinterpret
/// the request; the pipeline depends on seeing the server's answer as-is.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send one request.
    async fn execute(&self, request: http::Request<Bytes>) -> Result<HttpResponse, TransportError>;
}

/// The default transport, backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with a fresh connection pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a transport over an existing `reqwest` client.
    #[must_use]
    pub fn from_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: http::Request<Bytes>) -> Result<HttpResponse, TransportError> {
        let request = reqwest::Request::try_from(request.map(reqwest::Body::from))
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let response = self.inner.execute(request).await.map_err(|e| {
            if e.is_connect() {
                TransportError::Connect(e.to_string())
            } else {
                TransportError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| TransportError::Body(e.to_string())))
            .boxed();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
