//! The client façade.
//!
//! [`Client`] exposes one method per S3 operation. Every method follows the
//! same path: validate arguments, build a [`RequestDescriptor`], resolve the
//! bucket's region, sign, send through the [`Transport`], and classify the
//! response. Listings come back as lazy paginated streams; `put_object`
//! routes through the multipart orchestrator.
//!
//! A `Client` is cheap to clone and safe to share: the only mutable state is
//! the region cache, and reads that race a write simply observe the old or
//! the new value.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, OnceLock};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::stream::BoxStream;
use futures::{StreamExt, stream};
use http::header::{AUTHORIZATION, CONTENT_LENGTH, HeaderValue, RANGE};
use http::Method;
use tracing::debug;

use ostor_auth::{
    ALGORITHM, PostPolicy, PresignRequest, SignRequest, amz_date, hash_payload, presign_url,
    sign_post_policy, sign_request,
};
use ostor_model::request::CreateBucketConfiguration;
use ostor_model::response::{ListBucketsResult, ListObjectsPage, ListUploadsPage, ObjectStat};
use ostor_model::types::{
    BucketInfo, CannedAcl, ListEntry, UploadEntry, UploadInfo,
};
use ostor_xml::{from_xml, to_xml};

use crate::config::{ClientConfig, DEFAULT_REGION, base_user_agent};
use crate::error::ClientError;
use crate::pipeline::{check_status, concat_body, drain_body};
use crate::request::{RequestDescriptor, build_request};
use crate::source::ObjectSource;
use crate::transport::{HttpResponse, ReqwestTransport, Transport};
use crate::validate::{validate_bucket_name, validate_object_key, validate_region};

/// Keys requested per listing page.
const LIST_PAGE_SIZE: u32 = 1000;

/// An S3 client.
///
/// Cloning is cheap; all clones share one configuration, transport, and
/// region cache.
#[derive(Clone)]
pub struct Client {
    shared: Arc<Shared>,
}

struct Shared {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    regions: DashMap<String, String>,
    app_info: OnceLock<String>,
}

/// A downloaded object: response metadata plus the raw body stream.
pub struct ObjectBody {
    /// Object size from `Content-Length`, when reported.
    pub size: Option<u64>,
    /// Entity tag, unquoted, when reported.
    pub etag: Option<String>,
    /// Content type, when reported.
    pub content_type: Option<String>,
    /// Last modification time, when reported.
    pub last_modified: Option<DateTime<Utc>>,
    stream: BoxStream<'static, Result<Bytes, ClientError>>,
}

impl ObjectBody {
    /// The body as a lazy chunk stream. The stream must be fully consumed
    /// or dropped; dropping releases the underlying connection.
    #[must_use]
    pub fn stream(self) -> BoxStream<'static, Result<Bytes, ClientError>> {
        self.stream
    }

    /// Collect the whole body into memory.
    ///
    /// # Errors
    ///
    /// Propagates transport errors from the body stream.
    pub async fn bytes(self) -> Result<Bytes, ClientError> {
        let mut stream = self.stream;
        let mut buf = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }
}

impl std::fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectBody")
            .field("size", &self.size)
            .field("etag", &self.etag)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Build a client for the given endpoint with the default transport.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidEndpoint`] / [`ClientError::InvalidProtocol`]
    /// for unusable endpoints.
    pub fn new(
        endpoint: &str,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let config = ClientConfig::from_endpoint(endpoint, access_key, secret_key)?;
        Ok(Self::with_transport(
            config,
            Arc::new(ReqwestTransport::new()),
        ))
    }

    /// Build a client over an explicit transport.
    #[must_use]
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                transport,
                regions: DashMap::new(),
                app_info: OnceLock::new(),
            }),
        }
    }

    /// Append `name/version` to the user agent. May be called at most once.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidArgument`] for empty components or a
    /// repeated call.
    pub fn set_app_info(&self, name: &str, version: &str) -> Result<(), ClientError> {
        if name.is_empty() || version.is_empty() {
            return Err(ClientError::invalid_argument(
                "app name and version must not be empty",
            ));
        }
        self.shared
            .app_info
            .set(format!("{name}/{version}"))
            .map_err(|_| ClientError::invalid_argument("app info is already set"))
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.shared.config
    }

    fn user_agent(&self) -> String {
        match self.shared.app_info.get() {
            Some(app) => format!("{} {app}", base_user_agent()),
            None => base_user_agent(),
        }
    }

    pub(crate) fn cached_region(&self, bucket: &str) -> Option<String> {
        self.shared.regions.get(bucket).map(|r| r.value().clone())
    }

    /// Record a bucket's region. First write wins, keeping the mapping
    /// monotonic under concurrent discovery.
    pub(crate) fn prime_region(&self, bucket: &str, region: &str) {
        self.shared
            .regions
            .entry(bucket.to_owned())
            .or_insert_with(|| region.to_owned());
    }

    // -----------------------------------------------------------------------
    // Request execution
    // -----------------------------------------------------------------------

    /// Resolve the bucket's region, then sign and send.
    pub(crate) async fn execute_for_bucket(
        &self,
        desc: RequestDescriptor,
    ) -> Result<HttpResponse, ClientError> {
        let region = match desc.bucket.as_deref() {
            Some(bucket) => self.bucket_region(bucket).await?,
            None => DEFAULT_REGION.to_owned(),
        };
        self.execute_signed(desc, &region).await
    }

    /// Sign a request against an explicit region and send it.
    pub(crate) async fn execute_signed(
        &self,
        desc: RequestDescriptor,
        region: &str,
    ) -> Result<HttpResponse, ClientError> {
        let built = build_request(self.config(), &desc, &self.user_agent())?;

        let timestamp = amz_date(&Utc::now());
        let payload_hash = hash_payload(&desc.payload);

        let mut headers = built.headers;
        headers.insert("x-amz-date", header_value(&timestamp)?);
        headers.insert("x-amz-content-sha256", header_value(&payload_hash)?);
        if !desc.payload.is_empty() {
            headers.insert(CONTENT_LENGTH, header_value(&desc.payload.len().to_string())?);
        }

        let auth = sign_request(&SignRequest {
            method: desc.method.as_str(),
            path: &built.path,
            query: &built.query,
            headers: &headers,
            payload_hash: &payload_hash,
            access_key: &self.config().access_key,
            secret_key: &self.config().secret_key,
            region,
            timestamp: &timestamp,
        });
        headers.insert(AUTHORIZATION, header_value(&auth.header_value)?);

        debug!(method = %desc.method, url = %built.url, region, "issuing request");

        let mut request = http::Request::builder()
            .method(desc.method.clone())
            .uri(built.url.as_str())
            .body(desc.payload.clone())
            .map_err(|e| ClientError::invalid_argument(e.to_string()))?;
        *request.headers_mut() = headers;

        Ok(self.shared.transport.execute(request).await?)
    }

    // -----------------------------------------------------------------------
    // Bucket operations
    // -----------------------------------------------------------------------

    /// Create a bucket, optionally with a canned ACL and an explicit region.
    ///
    /// The request is signed against the default region (the bucket does not
    /// exist yet, so its region cannot be discovered); the target region
    /// travels in the `CreateBucketConfiguration` body. On success the
    /// mapping is primed into the region cache.
    ///
    /// # Errors
    ///
    /// Validation, transport, and server errors.
    pub async fn make_bucket(
        &self,
        bucket: &str,
        acl: Option<CannedAcl>,
        region: Option<&str>,
    ) -> Result<(), ClientError> {
        validate_bucket_name(bucket)?;
        if let Some(region) = region {
            validate_region(region)?;
        }
        let region = region.unwrap_or(DEFAULT_REGION);

        let mut desc = RequestDescriptor::new(Method::PUT).bucket(bucket).path_style();
        if let Some(acl) = acl {
            desc = desc.header(
                http::header::HeaderName::from_static("x-amz-acl"),
                HeaderValue::from_static(acl.as_str()),
            );
        }
        if region != DEFAULT_REGION {
            let body = to_xml(
                "CreateBucketConfiguration",
                &CreateBucketConfiguration {
                    location_constraint: region.to_owned(),
                },
            )?;
            desc = desc.payload(Bytes::from(body));
        }

        let resp = self.execute_signed(desc, DEFAULT_REGION).await?;
        let resp = check_status(resp, &[200], Some(bucket), None).await?;
        drain_body(resp).await;
        self.prime_region(bucket, region);
        Ok(())
    }

    /// List all buckets owned by the account.
    ///
    /// # Errors
    ///
    /// [`ClientError::AccessDenied`] when the server answers with its
    /// `TemporaryRedirect` refusal; other transport and server errors
    /// verbatim.
    pub async fn list_buckets(&self) -> Result<Vec<BucketInfo>, ClientError> {
        let desc = RequestDescriptor::new(Method::GET);
        let resp = self.execute_signed(desc, DEFAULT_REGION).await?;
        let resp = match check_status(resp, &[200], None, None).await {
            Ok(resp) => resp,
            // The server's refusal for unauthorized ListBuckets.
            Err(err) if err.server_code() == Some("TemporaryRedirect") => {
                return Err(ClientError::AccessDenied);
            }
            Err(err) => return Err(err),
        };
        let body = concat_body(resp).await?;
        let result: ListBucketsResult = from_xml(&body)?;
        Ok(result.buckets)
    }

    /// Whether a bucket exists and is accessible.
    ///
    /// # Errors
    ///
    /// Errors other than "no such bucket" propagate.
    pub async fn bucket_exists(&self, bucket: &str) -> Result<bool, ClientError> {
        validate_bucket_name(bucket)?;
        let desc = RequestDescriptor::new(Method::HEAD).bucket(bucket);
        let resp = self.execute_for_bucket(desc).await?;
        match check_status(resp, &[200], Some(bucket), None).await {
            Ok(resp) => {
                drain_body(resp).await;
                Ok(true)
            }
            Err(err) if is_not_found(&err) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Delete an empty bucket.
    ///
    /// # Errors
    ///
    /// Validation, transport, and server errors.
    pub async fn remove_bucket(&self, bucket: &str) -> Result<(), ClientError> {
        validate_bucket_name(bucket)?;
        let desc = RequestDescriptor::new(Method::DELETE).bucket(bucket);
        let resp = self.execute_for_bucket(desc).await?;
        let resp = check_status(resp, &[204], Some(bucket), None).await?;
        drain_body(resp).await;
        Ok(())
    }

    /// Fetch a bucket's ACL, classified as a canned ACL.
    ///
    /// # Errors
    ///
    /// [`ClientError::UnsupportedAcl`] when the grant list matches no canned
    /// ACL (for example WRITE without READ for the anonymous group).
    pub async fn get_bucket_acl(&self, bucket: &str) -> Result<CannedAcl, ClientError> {
        validate_bucket_name(bucket)?;
        let desc = RequestDescriptor::new(Method::GET)
            .bucket(bucket)
            .query_token("acl");
        let resp = self.execute_for_bucket(desc).await?;
        let resp = check_status(resp, &[200], Some(bucket), None).await?;
        let body = concat_body(resp).await?;
        let policy: ostor_model::types::AccessControlPolicy = from_xml(&body)?;

        CannedAcl::from_grants(&policy.grants).ok_or_else(|| ClientError::UnsupportedAcl {
            grants: format!("{:?}", policy.grants),
        })
    }

    /// Set a bucket's canned ACL.
    ///
    /// # Errors
    ///
    /// Validation, transport, and server errors.
    pub async fn set_bucket_acl(&self, bucket: &str, acl: CannedAcl) -> Result<(), ClientError> {
        validate_bucket_name(bucket)?;
        let desc = RequestDescriptor::new(Method::PUT)
            .bucket(bucket)
            .query_token("acl")
            .header(
                http::header::HeaderName::from_static("x-amz-acl"),
                HeaderValue::from_static(acl.as_str()),
            );
        let resp = self.execute_for_bucket(desc).await?;
        let resp = check_status(resp, &[200], Some(bucket), None).await?;
        drain_body(resp).await;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Object listings
    // -----------------------------------------------------------------------

    /// List objects under a prefix as a lazy stream.
    ///
    /// With `recursive = false` the listing is delimited on `/` and common
    /// prefixes interleave with objects as directory markers. Pagination is
    /// internal; the stream ends when the server reports the listing
    /// complete, or with the first error.
    pub fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        recursive: bool,
    ) -> BoxStream<'static, Result<ListEntry, ClientError>> {
        if let Err(err) = validate_bucket_name(bucket) {
            return stream::once(async move { Err(err) }).boxed();
        }

        struct State {
            client: Client,
            bucket: String,
            prefix: Option<String>,
            delimiter: Option<String>,
            marker: Option<String>,
            buffered: VecDeque<ListEntry>,
            done: bool,
        }

        let state = State {
            client: self.clone(),
            bucket: bucket.to_owned(),
            prefix: prefix.map(ToOwned::to_owned),
            delimiter: (!recursive).then(|| "/".to_owned()),
            marker: None,
            buffered: VecDeque::new(),
            done: false,
        };

        stream::try_unfold(state, |mut st| async move {
            loop {
                if let Some(entry) = st.buffered.pop_front() {
                    return Ok(Some((entry, st)));
                }
                if st.done {
                    return Ok(None);
                }

                let page = st
                    .client
                    .list_objects_page(
                        &st.bucket,
                        st.prefix.as_deref(),
                        st.marker.as_deref(),
                        st.delimiter.as_deref(),
                    )
                    .await?;

                let mut last_key = None;
                for object in page.objects {
                    last_key = Some(object.key.clone());
                    st.buffered.push_back(ListEntry::Object(object));
                }
                for prefix in page.prefixes {
                    st.buffered.push_back(ListEntry::Prefix(prefix));
                }

                if page.is_truncated {
                    st.marker = page.next_marker.or(last_key);
                    // A truncated page with no usable marker cannot advance.
                    if st.marker.is_none() {
                        st.done = true;
                    }
                } else {
                    st.done = true;
                }
            }
        })
        .boxed()
    }

    /// Fetch one listing page.
    async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        marker: Option<&str>,
        delimiter: Option<&str>,
    ) -> Result<ListObjectsPage, ClientError> {
        let mut desc = RequestDescriptor::new(Method::GET)
            .bucket(bucket)
            .query("max-keys", LIST_PAGE_SIZE.to_string());
        if let Some(prefix) = prefix {
            desc = desc.query("prefix", prefix);
        }
        if let Some(marker) = marker {
            desc = desc.query("marker", marker);
        }
        if let Some(delimiter) = delimiter {
            desc = desc.query("delimiter", delimiter);
        }

        let resp = self.execute_for_bucket(desc).await?;
        let resp = check_status(resp, &[200], Some(bucket), None).await?;
        let body = concat_body(resp).await?;
        Ok(from_xml(&body)?)
    }

    // -----------------------------------------------------------------------
    // Object operations
    // -----------------------------------------------------------------------

    /// Fetch an object's metadata without its body.
    ///
    /// # Errors
    ///
    /// Validation, transport, and server errors.
    pub async fn stat_object(&self, bucket: &str, key: &str) -> Result<ObjectStat, ClientError> {
        validate_bucket_name(bucket)?;
        validate_object_key(key)?;

        let desc = RequestDescriptor::new(Method::HEAD).bucket(bucket).key(key);
        let resp = self.execute_for_bucket(desc).await?;
        let resp = check_status(resp, &[200], Some(bucket), Some(key)).await?;

        let stat = ObjectStat {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            size: resp
                .header_str("content-length")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            etag: resp
                .header_str("etag")
                .map(|v| v.trim_matches('"').to_owned())
                .unwrap_or_default(),
            content_type: resp.header_str("content-type").map(ToOwned::to_owned),
            last_modified: resp
                .header_str("last-modified")
                .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
                .map(|dt| dt.with_timezone(&Utc)),
        };
        drain_body(resp).await;
        Ok(stat)
    }

    /// Download an object.
    ///
    /// # Errors
    ///
    /// Validation, transport, and server errors.
    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectBody, ClientError> {
        self.get_object_inner(bucket, key, None).await
    }

    /// Download a byte range of an object. A `length` of zero means
    /// everything from `offset` to the end.
    ///
    /// # Errors
    ///
    /// Validation, transport, and server errors.
    pub async fn get_partial_object(
        &self,
        bucket: &str,
        key: &str,
        offset: u64,
        length: u64,
    ) -> Result<ObjectBody, ClientError> {
        let range = if length == 0 {
            format!("bytes={offset}-")
        } else {
            format!("bytes={offset}-{}", offset.saturating_add(length - 1))
        };
        self.get_object_inner(bucket, key, Some(range)).await
    }

    async fn get_object_inner(
        &self,
        bucket: &str,
        key: &str,
        range: Option<String>,
    ) -> Result<ObjectBody, ClientError> {
        validate_bucket_name(bucket)?;
        validate_object_key(key)?;

        let mut desc = RequestDescriptor::new(Method::GET).bucket(bucket).key(key);
        if let Some(range) = range {
            desc = desc.header(RANGE, header_value(&range)?);
        }

        let resp = self.execute_for_bucket(desc).await?;
        // Ranged reads answer 206; whole-object reads 200.
        let resp = check_status(resp, &[200, 206], Some(bucket), Some(key)).await?;

        Ok(ObjectBody {
            size: resp
                .header_str("content-length")
                .and_then(|v| v.parse().ok()),
            etag: resp
                .header_str("etag")
                .map(|v| v.trim_matches('"').to_owned()),
            content_type: resp.header_str("content-type").map(ToOwned::to_owned),
            last_modified: resp
                .header_str("last-modified")
                .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
                .map(|dt| dt.with_timezone(&Utc)),
            stream: resp.body.map(|chunk| chunk.map_err(ClientError::from)).boxed(),
        })
    }

    /// Upload an object from a byte stream of a declared size.
    ///
    /// Objects up to 5 MiB go up as a single PUT; larger ones use multipart,
    /// resuming any in-progress upload for the same key. Returns the
    /// object's ETag.
    ///
    /// # Errors
    ///
    /// [`ClientError::SizeMismatch`] when the stream yields a byte count
    /// different from `size`; validation, transport, and server errors
    /// otherwise.
    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        source: impl Into<ObjectSource>,
        size: u64,
        content_type: Option<&str>,
    ) -> Result<String, ClientError> {
        validate_bucket_name(bucket)?;
        validate_object_key(key)?;
        self.upload_object(bucket, key, source.into(), size, content_type)
            .await
    }

    /// Delete an object.
    ///
    /// # Errors
    ///
    /// Validation, transport, and server errors.
    pub async fn remove_object(&self, bucket: &str, key: &str) -> Result<(), ClientError> {
        validate_bucket_name(bucket)?;
        validate_object_key(key)?;

        let desc = RequestDescriptor::new(Method::DELETE).bucket(bucket).key(key);
        let resp = self.execute_for_bucket(desc).await?;
        let resp = check_status(resp, &[204], Some(bucket), Some(key)).await?;
        drain_body(resp).await;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Multipart listings and abort
    // -----------------------------------------------------------------------

    /// List in-progress multipart uploads under a prefix as a lazy stream.
    ///
    /// With `recursive = false` the listing is delimited on `/`.
    pub fn list_incomplete_uploads(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        recursive: bool,
    ) -> BoxStream<'static, Result<UploadEntry, ClientError>> {
        if let Err(err) = validate_bucket_name(bucket) {
            return stream::once(async move { Err(err) }).boxed();
        }
        self.stream_uploads(
            bucket.to_owned(),
            prefix.map(ToOwned::to_owned),
            (!recursive).then(|| "/".to_owned()),
        )
    }

    /// Abort the in-progress multipart upload for a key, if any. A missing
    /// upload is a no-op success.
    ///
    /// # Errors
    ///
    /// Validation, transport, and server errors.
    pub async fn remove_incomplete_upload(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<(), ClientError> {
        validate_bucket_name(bucket)?;
        validate_object_key(key)?;

        let Some(upload_id) = self.find_upload_id(bucket, key).await? else {
            return Ok(());
        };

        let desc = RequestDescriptor::new(Method::DELETE)
            .bucket(bucket)
            .key(key)
            .query("uploadId", upload_id);
        let resp = self.execute_for_bucket(desc).await?;
        let resp = check_status(resp, &[204], Some(bucket), Some(key)).await?;
        drain_body(resp).await;
        Ok(())
    }

    /// The uploads stream with prefixes filtered out, for upload discovery.
    pub(crate) fn stream_uploads_flat(
        &self,
        bucket: String,
        prefix: Option<String>,
    ) -> BoxStream<'static, Result<UploadInfo, ClientError>> {
        self.stream_uploads(bucket, prefix, None)
            .filter_map(|entry| async move {
                match entry {
                    Ok(UploadEntry::Upload(upload)) => Some(Ok(upload)),
                    Ok(UploadEntry::Prefix(_)) => None,
                    Err(err) => Some(Err(err)),
                }
            })
            .boxed()
    }

    fn stream_uploads(
        &self,
        bucket: String,
        prefix: Option<String>,
        delimiter: Option<String>,
    ) -> BoxStream<'static, Result<UploadEntry, ClientError>> {
        struct State {
            client: Client,
            bucket: String,
            prefix: Option<String>,
            delimiter: Option<String>,
            key_marker: Option<String>,
            upload_id_marker: Option<String>,
            buffered: VecDeque<UploadEntry>,
            done: bool,
        }

        let state = State {
            client: self.clone(),
            bucket,
            prefix,
            delimiter,
            key_marker: None,
            upload_id_marker: None,
            buffered: VecDeque::new(),
            done: false,
        };

        stream::try_unfold(state, |mut st| async move {
            loop {
                if let Some(entry) = st.buffered.pop_front() {
                    return Ok(Some((entry, st)));
                }
                if st.done {
                    return Ok(None);
                }

                let page = st
                    .client
                    .list_uploads_page(
                        &st.bucket,
                        st.prefix.as_deref(),
                        st.key_marker.as_deref(),
                        st.upload_id_marker.as_deref(),
                        st.delimiter.as_deref(),
                    )
                    .await?;

                for upload in page.uploads {
                    st.buffered.push_back(UploadEntry::Upload(upload));
                }
                for prefix in page.prefixes {
                    st.buffered.push_back(UploadEntry::Prefix(prefix));
                }

                if page.is_truncated {
                    st.key_marker = page.next_key_marker;
                    st.upload_id_marker = page.next_upload_id_marker;
                    if st.key_marker.is_none() && st.upload_id_marker.is_none() {
                        st.done = true;
                    }
                } else {
                    st.done = true;
                }
            }
        })
        .boxed()
    }

    async fn list_uploads_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        key_marker: Option<&str>,
        upload_id_marker: Option<&str>,
        delimiter: Option<&str>,
    ) -> Result<ListUploadsPage, ClientError> {
        let mut desc = RequestDescriptor::new(Method::GET)
            .bucket(bucket)
            .query_token("uploads");
        if let Some(prefix) = prefix {
            desc = desc.query("prefix", prefix);
        }
        if let Some(key_marker) = key_marker {
            desc = desc.query("key-marker", key_marker);
        }
        if let Some(upload_id_marker) = upload_id_marker {
            desc = desc.query("upload-id-marker", upload_id_marker);
        }
        if let Some(delimiter) = delimiter {
            desc = desc.query("delimiter", delimiter);
        }

        let resp = self.execute_for_bucket(desc).await?;
        let resp = check_status(resp, &[200], Some(bucket), None).await?;
        let body = concat_body(resp).await?;
        Ok(from_xml(&body)?)
    }

    // -----------------------------------------------------------------------
    // Presigning
    // -----------------------------------------------------------------------

    /// Mint a presigned GET URL for an object.
    ///
    /// # Errors
    ///
    /// Validation errors, expiry bounds, and region-discovery failures.
    pub async fn presigned_get_object(
        &self,
        bucket: &str,
        key: &str,
        expires: u64,
    ) -> Result<String, ClientError> {
        self.presigned_url(Method::GET, bucket, key, expires).await
    }

    /// Mint a presigned PUT URL for an object.
    ///
    /// # Errors
    ///
    /// Validation errors, expiry bounds, and region-discovery failures.
    pub async fn presigned_put_object(
        &self,
        bucket: &str,
        key: &str,
        expires: u64,
    ) -> Result<String, ClientError> {
        self.presigned_url(Method::PUT, bucket, key, expires).await
    }

    async fn presigned_url(
        &self,
        method: Method,
        bucket: &str,
        key: &str,
        expires: u64,
    ) -> Result<String, ClientError> {
        validate_bucket_name(bucket)?;
        validate_object_key(key)?;
        // Checked again by the signer, but region discovery must not go on
        // the wire for an expiry that can never sign.
        if expires == 0 || expires > ostor_auth::MAX_EXPIRY_SECONDS {
            return Err(ostor_auth::SignError::InvalidExpiry(expires).into());
        }

        let region = self.bucket_region(bucket).await?;
        let desc = RequestDescriptor::new(method.clone()).bucket(bucket).key(key);
        let built = build_request(self.config(), &desc, &self.user_agent())?;

        Ok(presign_url(&PresignRequest {
            method: method.as_str(),
            scheme: self.config().scheme.as_str(),
            authority: &built.authority,
            path: &built.path,
            extra_query: &built.query,
            access_key: &self.config().access_key,
            secret_key: &self.config().secret_key,
            region: &region,
            timestamp: Utc::now(),
            expires,
        })?)
    }

    /// Sign a browser POST policy, returning the complete form-data map
    /// (`key`, `bucket`, `policy`, `x-amz-*` fields, `x-amz-signature`).
    ///
    /// # Errors
    ///
    /// [`ClientError::Sign`] for incomplete or expired policies; region
    /// discovery errors otherwise.
    pub async fn presigned_post_policy(
        &self,
        mut policy: PostPolicy,
    ) -> Result<BTreeMap<String, String>, ClientError> {
        policy.validate()?;

        let now = Utc::now();
        let expiration = policy
            .expiration()
            .ok_or(ostor_auth::SignError::IncompletePolicy("expiration"))?;
        if expiration < now {
            return Err(ostor_auth::SignError::ExpiredPolicy.into());
        }

        let bucket = policy
            .bucket()
            .ok_or(ostor_auth::SignError::IncompletePolicy("bucket"))?
            .to_owned();
        let region = self.bucket_region(&bucket).await?;

        let timestamp = amz_date(&now);
        let date = &timestamp[..8];
        let credential = format!(
            "{}/{}",
            self.config().access_key,
            ostor_auth::signer::credential_scope(date, &region)
        );

        policy.push_eq_condition("x-amz-date", &timestamp);
        policy.push_eq_condition("x-amz-algorithm", ALGORITHM);
        policy.push_eq_condition("x-amz-credential", &credential);

        let policy_b64 = BASE64_STANDARD.encode(policy.policy_json()?);
        let signature = sign_post_policy(&policy_b64, &self.config().secret_key, date, &region);

        let mut form = policy.into_form_data();
        form.insert("policy".to_owned(), policy_b64);
        form.insert("x-amz-signature".to_owned(), signature);
        Ok(form)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("host", &self.shared.config.host)
            .field("path_style", &self.shared.config.path_style)
            .finish_non_exhaustive()
    }
}

/// Whether an error means "the bucket or object is not there".
fn is_not_found(err: &ClientError) -> bool {
    match err {
        ClientError::Server(server) => server.status == 404 || server.code == "NoSuchBucket",
        // HEAD errors carry no body to parse.
        ClientError::UnexpectedStatus { status: 404, .. } => true,
        _ => false,
    }
}

fn header_value(value: &str) -> Result<HeaderValue, ClientError> {
    HeaderValue::from_str(value)
        .map_err(|_| ClientError::invalid_argument(format!("invalid header value: {value}")))
}
