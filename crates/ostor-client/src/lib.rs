//! Client for Amazon S3 and S3-compatible object storage.
//!
//! The entry point is [`Client`]: construct it from an endpoint URL and a
//! key pair, then call one method per S3 operation. The client handles the
//! request pipeline end to end:
//!
//! - Path-style addressing for self-hosted servers, virtual-host-style for
//!   Amazon, with correct URI escaping of object keys ([`request`]).
//! - AWS Signature Version 4 signing, presigned URLs, and browser POST
//!   policies (the `ostor-auth` crate).
//! - Per-bucket region discovery with a process-local cache ([`region`]).
//! - Streamed response handling: incremental XML listings as lazy paginated
//!   streams, typed errors for non-2xx responses ([`pipeline`]).
//! - Transparent multipart uploads with resume: interrupted uploads are
//!   picked up where they left off, reusing parts already on the server
//!   ([`multipart`]).
//!
//! # Example
//!
//! ```no_run
//! use ostor_client::Client;
//!
//! # async fn run() -> Result<(), ostor_client::ClientError> {
//! let client = Client::new("http://play.example.com:9000", "ACCESS", "SECRET")?;
//! client.make_bucket("my-bucket", None, None).await?;
//! let etag = client
//!     .put_object("my-bucket", "hello.txt", "hello world", 11, Some("text/plain"))
//!     .await?;
//! println!("uploaded, etag {etag}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod multipart;
pub mod pipeline;
pub mod region;
pub mod request;
pub mod source;
pub mod transport;
pub mod validate;

pub use client::{Client, ObjectBody};
pub use config::{ClientConfig, DEFAULT_REGION, Scheme};
pub use error::{ClientError, ServerError};
pub use multipart::{MAX_PART_SIZE, MAX_PARTS, MIN_PART_SIZE, optimal_part_size};
pub use source::ObjectSource;
pub use transport::{BodyStream, HttpResponse, ReqwestTransport, Transport, TransportError};

// The façade re-exports the model and policy types callers interact with.
pub use ostor_auth::PostPolicy;
pub use ostor_model::{
    BucketInfo, CannedAcl, Grant, ListEntry, ObjectInfo, ObjectStat, PartInfo, Permission,
    UploadEntry, UploadInfo,
};
