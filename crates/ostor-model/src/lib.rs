//! Shared S3 domain types for ostor.
//!
//! This crate holds the plain data types the rest of the workspace passes
//! around: buckets, objects, multipart uploads and their parts, ACL grants
//! and canned ACL classification, and the parsed shapes of every response
//! document the client consumes. It has no I/O and no XML knowledge; the
//! `ostor-xml` crate maps these types to and from the wire.

pub mod request;
pub mod response;
pub mod types;

pub use request::{CompleteMultipartUpload, CreateBucketConfiguration};
pub use response::{
    CompleteMultipartResult, ErrorDocument, InitiateMultipartResult, ListBucketsResult,
    ListObjectsPage, ListPartsPage, ListUploadsPage, ObjectStat,
};
pub use types::{
    ALL_USERS_URI, AUTHENTICATED_USERS_URI, AccessControlPolicy, BucketInfo, CannedAcl,
    CompletedPart, Grant, ListEntry, ObjectInfo, Owner, PartInfo, Permission, UploadEntry,
    UploadInfo,
};
