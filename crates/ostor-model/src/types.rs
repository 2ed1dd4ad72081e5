//! Core S3 domain types shared across the workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Group URI identifying all anonymous users in ACL grants.
pub const ALL_USERS_URI: &str = "http://acs.amazonaws.com/groups/global/AllUsers";

/// Group URI identifying all authenticated AWS users in ACL grants.
pub const AUTHENTICATED_USERS_URI: &str =
    "http://acs.amazonaws.com/groups/global/AuthenticatedUsers";

/// A bucket, as reported by `ListBuckets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketInfo {
    /// The bucket name.
    pub name: String,
    /// When the bucket was created.
    pub creation_date: DateTime<Utc>,
}

/// The owner of a bucket or object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    /// Canonical user ID.
    pub id: Option<String>,
    /// Display name, when the service reports one.
    pub display_name: Option<String>,
}

/// An object, as reported by `ListObjects` or `StatObject`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInfo {
    /// The object key.
    pub key: String,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
    /// Entity tag, without the surrounding quotes the wire carries.
    pub etag: String,
    /// Object size in bytes.
    pub size: u64,
    /// Storage class, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

/// One entry in an object listing: either an object or, when listing
/// non-recursively, a common prefix standing in for a "directory".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEntry {
    /// A concrete object.
    Object(ObjectInfo),
    /// A common prefix (always ends with the delimiter).
    Prefix(String),
}

/// An in-progress multipart upload, as reported by `ListMultipartUploads`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadInfo {
    /// The object key the upload will create.
    pub key: String,
    /// The server-issued upload ID.
    pub upload_id: String,
    /// When the upload was initiated.
    pub initiated: DateTime<Utc>,
}

/// One entry in a multipart-upload listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEntry {
    /// A concrete in-progress upload.
    Upload(UploadInfo),
    /// A common prefix.
    Prefix(String),
}

/// A single part within a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartInfo {
    /// The part number (1-based, up to 10 000).
    pub part_number: u16,
    /// Entity tag for this part, unquoted. For parts uploaded by this
    /// client it is the hex MD5 of the part body.
    pub etag: String,
    /// Size of this part in bytes.
    pub size: u64,
    /// When this part was uploaded, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

/// A `(part_number, etag)` pair for the `CompleteMultipartUpload` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedPart {
    /// The part number.
    pub part_number: u16,
    /// The part's entity tag, unquoted.
    pub etag: String,
}

/// An ACL permission, as carried in a `<Grant>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Full control over the resource.
    FullControl,
    /// Read access.
    Read,
    /// Write access.
    Write,
    /// Permission to read the ACL itself.
    ReadAcp,
    /// Permission to write the ACL itself.
    WriteAcp,
}

impl Permission {
    /// Returns the wire representation of this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullControl => "FULL_CONTROL",
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::ReadAcp => "READ_ACP",
            Self::WriteAcp => "WRITE_ACP",
        }
    }

    /// Parse the wire representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "FULL_CONTROL" => Some(Self::FullControl),
            "READ" => Some(Self::Read),
            "WRITE" => Some(Self::Write),
            "READ_ACP" => Some(Self::ReadAcp),
            "WRITE_ACP" => Some(Self::WriteAcp),
            _ => None,
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single ACL grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    /// Group URI of the grantee, for group grants.
    pub grantee_uri: Option<String>,
    /// Canonical user ID of the grantee, for user grants.
    pub grantee_id: Option<String>,
    /// The granted permission.
    pub permission: Permission,
}

/// A parsed access-control policy: the owner plus the grant list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessControlPolicy {
    /// The resource owner.
    pub owner: Owner,
    /// The grants, in document order.
    pub grants: Vec<Grant>,
}

/// A canned (preset) ACL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CannedAcl {
    /// Owner-only access.
    #[default]
    Private,
    /// Anonymous read access.
    PublicRead,
    /// Anonymous read and write access.
    PublicReadWrite,
    /// Read access for any authenticated AWS user.
    AuthenticatedRead,
}

impl CannedAcl {
    /// Returns the wire representation (the `x-amz-acl` header value).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::PublicRead => "public-read",
            Self::PublicReadWrite => "public-read-write",
            Self::AuthenticatedRead => "authenticated-read",
        }
    }

    /// Parse the wire representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "private" => Some(Self::Private),
            "public-read" => Some(Self::PublicRead),
            "public-read-write" => Some(Self::PublicReadWrite),
            "authenticated-read" => Some(Self::AuthenticatedRead),
            _ => None,
        }
    }

    /// Classify a grant list as a canned ACL.
    ///
    /// `public-read-write` requires both the READ and WRITE grants for the
    /// anonymous group; a WRITE grant without READ does not correspond to any
    /// canned ACL and yields `None`.
    #[must_use]
    pub fn from_grants(grants: &[Grant]) -> Option<Self> {
        let mut public_read = false;
        let mut public_write = false;
        let mut authenticated_read = false;

        for grant in grants {
            let Some(uri) = grant.grantee_uri.as_deref() else {
                continue;
            };
            match (uri, grant.permission) {
                (ALL_USERS_URI, Permission::Read) => public_read = true,
                (ALL_USERS_URI, Permission::Write) => public_write = true,
                (AUTHENTICATED_USERS_URI, Permission::Read) => authenticated_read = true,
                _ => {}
            }
        }

        match (public_read, public_write, authenticated_read) {
            (true, true, _) => Some(Self::PublicReadWrite),
            (true, false, _) => Some(Self::PublicRead),
            (false, false, true) => Some(Self::AuthenticatedRead),
            (false, false, false) => Some(Self::Private),
            // WRITE without READ has no canned equivalent.
            (false, true, _) => None,
        }
    }
}

impl std::fmt::Display for CannedAcl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
