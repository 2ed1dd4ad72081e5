#![allow(dead_code)] // each test binary uses a subset of the harness

//! Shared test harness: a scripted in-process transport.
//!
//! Tests run the full client pipeline (addressing, signing, response
//! classification, multipart orchestration) against a handler closure that
//! plays the server, and then assert on the recorded requests.

use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};

use ostor_client::{Client, ClientConfig, HttpResponse, Transport, TransportError};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// One request as the transport saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub url: String,
    pub path: String,
    pub query: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Recorded {
    /// A header value by (lowercase) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the query string contains the given token.
    pub fn query_has(&self, token: &str) -> bool {
        self.query.split('&').any(|t| t == token || t.starts_with(&format!("{token}=")))
    }

    /// The value of a query parameter, if present.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .split('&')
            .find_map(|t| t.strip_prefix(&format!("{name}=")))
    }

    /// Whether this is the bucket-region discovery request.
    pub fn is_location_request(&self) -> bool {
        self.method == "GET" && self.query_has("location")
    }
}

/// The scripted response a handler returns.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl MockResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn xml(status: u16, body: &str) -> Self {
        Self::new(status)
            .header("content-type", "application/xml")
            .body(body.as_bytes().to_vec())
    }
}

type Handler = dyn Fn(&Recorded) -> MockResponse + Send + Sync;

/// A transport that answers from a handler closure and records every
/// request it sees.
pub struct MockTransport {
    handler: Box<Handler>,
    log: Mutex<Vec<Recorded>>,
}

impl MockTransport {
    pub fn new(handler: impl Fn(&Recorded) -> MockResponse + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            log: Mutex::new(Vec::new()),
        })
    }

    /// Every request seen so far, in order.
    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().expect("mock log lock").clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: http::Request<Bytes>) -> Result<HttpResponse, TransportError> {
        let recorded = Recorded {
            method: request.method().to_string(),
            url: request.uri().to_string(),
            path: request.uri().path().to_owned(),
            query: request.uri().query().unwrap_or("").to_owned(),
            headers: request
                .headers()
                .iter()
                .map(|(k, v)| {
                    (
                        k.as_str().to_owned(),
                        String::from_utf8_lossy(v.as_bytes()).into_owned(),
                    )
                })
                .collect(),
            body: request.body().to_vec(),
        };

        let response = (self.handler)(&recorded);
        self.log.lock().expect("mock log lock").push(recorded);

        let mut headers = HeaderMap::new();
        for (name, value) in &response.headers {
            headers.insert(
                http::header::HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| TransportError::Request(e.to_string()))?,
                http::HeaderValue::from_str(value)
                    .map_err(|e| TransportError::Request(e.to_string()))?,
            );
        }

        Ok(HttpResponse::from_bytes(
            StatusCode::from_u16(response.status)
                .map_err(|e| TransportError::Request(e.to_string()))?,
            headers,
            Bytes::from(response.body),
        ))
    }
}

/// A client against a self-hosted (path-style) endpoint.
pub fn play_client(transport: Arc<MockTransport>) -> Client {
    init_tracing();
    let config = ClientConfig::from_endpoint("http://play.example.com:9000", "ak", "sk")
        .expect("test endpoint");
    Client::with_transport(config, transport)
}

/// A client against Amazon (virtual-host-style).
pub fn amazon_client(transport: Arc<MockTransport>) -> Client {
    init_tracing();
    let config =
        ClientConfig::from_endpoint("https://s3.amazonaws.com", "ak", "sk").expect("test endpoint");
    Client::with_transport(config, transport)
}

/// An S3 `<Error>` document.
pub fn error_xml(code: &str, message: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <Error><Code>{code}</Code><Message>{message}</Message>\
         <RequestId>tx0001</RequestId></Error>"
    )
}
