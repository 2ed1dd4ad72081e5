//! Parsed response documents.
//!
//! One struct per S3 XML response the client consumes. Pagination cursors are
//! carried as optional fields; the response pipeline turns pages into lazy
//! streams.

use chrono::{DateTime, Utc};

use crate::types::{BucketInfo, ObjectInfo, Owner, PartInfo, UploadInfo};

/// Result of `GET /` (ListBuckets).
#[derive(Debug, Clone, Default)]
pub struct ListBucketsResult {
    /// The account owner.
    pub owner: Owner,
    /// All buckets owned by the account.
    pub buckets: Vec<BucketInfo>,
}

/// One page of `GET /{bucket}` (ListObjects).
#[derive(Debug, Clone, Default)]
pub struct ListObjectsPage {
    /// Objects on this page.
    pub objects: Vec<ObjectInfo>,
    /// Common prefixes on this page (delimiter listings only).
    pub prefixes: Vec<String>,
    /// Whether more pages follow.
    pub is_truncated: bool,
    /// Marker for the next page, when truncated.
    pub next_marker: Option<String>,
}

/// One page of `GET /{bucket}?uploads` (ListMultipartUploads).
#[derive(Debug, Clone, Default)]
pub struct ListUploadsPage {
    /// In-progress uploads on this page.
    pub uploads: Vec<UploadInfo>,
    /// Common prefixes on this page (delimiter listings only).
    pub prefixes: Vec<String>,
    /// Whether more pages follow.
    pub is_truncated: bool,
    /// Key marker for the next page, when truncated.
    pub next_key_marker: Option<String>,
    /// Upload-ID marker for the next page, when truncated.
    pub next_upload_id_marker: Option<String>,
}

/// One page of `GET /{bucket}/{key}?uploadId=…` (ListParts).
#[derive(Debug, Clone, Default)]
pub struct ListPartsPage {
    /// Parts on this page.
    pub parts: Vec<PartInfo>,
    /// Whether more pages follow.
    pub is_truncated: bool,
    /// Part-number marker for the next page, when truncated.
    pub next_part_number_marker: Option<u16>,
}

/// Result of `POST /{bucket}/{key}?uploads` (InitiateMultipartUpload).
#[derive(Debug, Clone, Default)]
pub struct InitiateMultipartResult {
    /// The bucket the upload targets.
    pub bucket: String,
    /// The key the upload will create.
    pub key: String,
    /// The server-issued upload ID.
    pub upload_id: String,
}

/// Result of `POST /{bucket}/{key}?uploadId=…` (CompleteMultipartUpload).
#[derive(Debug, Clone, Default)]
pub struct CompleteMultipartResult {
    /// URL of the created object, when reported.
    pub location: Option<String>,
    /// The bucket.
    pub bucket: Option<String>,
    /// The key.
    pub key: Option<String>,
    /// Entity tag of the assembled object, unquoted.
    pub etag: String,
}

/// A parsed S3 `<Error>` document.
#[derive(Debug, Clone, Default)]
pub struct ErrorDocument {
    /// The S3 error code (e.g. `NoSuchBucket`).
    pub code: String,
    /// The human-readable message.
    pub message: String,
    /// The request ID, when reported.
    pub request_id: Option<String>,
    /// The host ID, when reported.
    pub host_id: Option<String>,
    /// The resource the error refers to, when reported.
    pub resource: Option<String>,
}

/// A parsed object stat, assembled from HEAD response headers.
#[derive(Debug, Clone)]
pub struct ObjectStat {
    /// The bucket.
    pub bucket: String,
    /// The key.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
    /// Entity tag, unquoted.
    pub etag: String,
    /// Content type, when reported.
    pub content_type: Option<String>,
    /// Last modification time, when reported.
    pub last_modified: Option<DateTime<Utc>>,
}
