//! The multipart upload orchestrator.
//!
//! `put_object` picks a strategy by declared size: small objects go up as a
//! single PUT, everything else through the multipart flow:
//!
//! 1. Look for an in-progress upload for the same key and resume it, or
//!    initiate a fresh one.
//! 2. Chunk the caller's stream at part boundaries, verifying the total
//!    byte count against the declared size.
//! 3. Upload each part, skipping parts the server already holds with a
//!    matching size and MD5.
//! 4. Complete the upload with the assembled `(part number, etag)` list.
//!
//! Parts upload one at a time, so part *n* always has a confirmed ETag
//! before part *n+1* is finalized. A failure anywhere aborts the current
//! call but leaves the server-side upload intact; a retry picks up the
//! surviving parts.

use std::collections::HashMap;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use http::Method;
use md5::{Digest, Md5};
use tracing::debug;

use ostor_model::request::CompleteMultipartUpload;
use ostor_model::response::{CompleteMultipartResult, InitiateMultipartResult, ListPartsPage};
use ostor_model::types::{CompletedPart, PartInfo, UploadInfo};
use ostor_xml::{from_xml, to_xml};

use crate::client::Client;
use crate::error::ClientError;
use crate::pipeline::{PartChunker, SizeVerifier, check_status, concat_body, drain_body};
use crate::request::RequestDescriptor;
use crate::source::ObjectSource;

/// Minimum part size, and the single-PUT threshold: 5 MiB.
pub const MIN_PART_SIZE: u64 = 5 * 1024 * 1024;

/// Maximum part size: 5 GiB.
pub const MAX_PART_SIZE: u64 = 5 * 1024 * 1024 * 1024;

/// Maximum number of parts per upload.
pub const MAX_PARTS: u16 = 10_000;

/// Part-size denominator; dividing by slightly under [`MAX_PARTS`] keeps the
/// part count under the cap for any object up to 5 TiB.
const PART_SIZE_DENOMINATOR: u64 = 9999;

/// Pick the part size for an object of the given size.
///
/// `clamp(size / 9999, 5 MiB, 5 GiB)`: at most 10 000 parts, every part at
/// least 5 MiB (except a final short one when the object itself is smaller).
#[must_use]
pub fn optimal_part_size(size: u64) -> u64 {
    (size / PART_SIZE_DENOMINATOR).clamp(MIN_PART_SIZE, MAX_PART_SIZE)
}

impl Client {
    /// Upload strategy entry point: single PUT under the threshold,
    /// multipart above it. Returns the object's ETag.
    pub(crate) async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        source: ObjectSource,
        size: u64,
        content_type: Option<&str>,
    ) -> Result<String, ClientError> {
        if size <= MIN_PART_SIZE {
            self.upload_single(bucket, key, source, size, content_type)
                .await
        } else {
            self.upload_multipart(bucket, key, source, size, content_type)
                .await
        }
    }

    /// Buffer the stream and issue one PUT.
    async fn upload_single(
        &self,
        bucket: &str,
        key: &str,
        source: ObjectSource,
        size: u64,
        content_type: Option<&str>,
    ) -> Result<String, ClientError> {
        let mut verified = SizeVerifier::new(source.into_stream(), size);
        let mut buf = Vec::with_capacity(usize::try_from(size).unwrap_or(0));
        while let Some(chunk) = verified.next().await {
            buf.extend_from_slice(&chunk?);
        }

        debug!(bucket, key, size, "uploading object with a single PUT");

        let mut desc = RequestDescriptor::new(Method::PUT)
            .bucket(bucket)
            .key(key)
            .payload(Bytes::from(buf));
        desc = with_content_type(desc, content_type)?;

        let resp = self.execute_for_bucket(desc).await?;
        let resp = check_status(resp, &[200], Some(bucket), Some(key)).await?;
        let etag = etag_header(&resp);
        drain_body(resp).await;
        Ok(etag)
    }

    /// The multipart path: discover or initiate, chunk, upload, complete.
    async fn upload_multipart(
        &self,
        bucket: &str,
        key: &str,
        source: ObjectSource,
        size: u64,
        content_type: Option<&str>,
    ) -> Result<String, ClientError> {
        let part_size = optimal_part_size(size);

        // Resume a pre-existing upload when one is on the server.
        let (upload_id, existing) = match self.find_upload_id(bucket, key).await? {
            Some(upload_id) => {
                let parts = self.collect_parts(bucket, key, &upload_id).await?;
                debug!(
                    bucket,
                    key,
                    upload_id = %upload_id,
                    existing_parts = parts.len(),
                    "resuming multipart upload"
                );
                (upload_id, parts)
            }
            None => {
                let upload_id = self.initiate_upload(bucket, key, content_type).await?;
                debug!(bucket, key, upload_id = %upload_id, "initiated multipart upload");
                (upload_id, Vec::new())
            }
        };
        let existing: HashMap<u16, PartInfo> =
            existing.into_iter().map(|p| (p.part_number, p)).collect();

        let chunker = PartChunker::new(
            source.into_stream(),
            usize::try_from(part_size).unwrap_or(usize::MAX),
        );
        let mut blocks = SizeVerifier::new(chunker, size);

        let mut completed: Vec<CompletedPart> = Vec::new();
        let mut part_number: u16 = 0;

        while let Some(block) = blocks.next().await {
            let block = block?;
            part_number += 1;
            if part_number > MAX_PARTS {
                return Err(ClientError::invalid_argument(format!(
                    "object requires more than {MAX_PARTS} parts"
                )));
            }

            let md5_hex = hex::encode(Md5::digest(&block));

            // A server-side part with the same size and MD5 is work already
            // done; reuse its ETag instead of re-uploading.
            if let Some(existing_part) = existing.get(&part_number) {
                if existing_part.size == block.len() as u64 && existing_part.etag == md5_hex {
                    debug!(part_number, "reusing server-side part");
                    completed.push(CompletedPart {
                        part_number,
                        etag: existing_part.etag.clone(),
                    });
                    continue;
                }
            }

            let etag = self
                .upload_part(bucket, key, &upload_id, part_number, block)
                .await?;
            completed.push(CompletedPart { part_number, etag });
        }

        self.complete_upload(bucket, key, &upload_id, completed)
            .await
    }

    /// Find the active upload ID for `(bucket, key)`: the in-progress upload
    /// with the latest initiation time, or `None`.
    pub(crate) async fn find_upload_id(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<String>, ClientError> {
        let mut uploads: BoxStream<'_, Result<UploadInfo, ClientError>> =
            self.stream_uploads_flat(bucket.to_owned(), Some(key.to_owned()));

        let mut latest: Option<UploadInfo> = None;
        while let Some(upload) = uploads.next().await {
            let upload = upload?;
            if upload.key != key {
                continue;
            }
            let newer = latest
                .as_ref()
                .is_none_or(|current| upload.initiated > current.initiated);
            if newer {
                latest = Some(upload);
            }
        }
        Ok(latest.map(|u| u.upload_id))
    }

    /// Fetch the complete part list of an upload, following pagination.
    pub(crate) async fn collect_parts(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> Result<Vec<PartInfo>, ClientError> {
        let mut parts = Vec::new();
        let mut marker: Option<u16> = None;

        loop {
            let mut desc = RequestDescriptor::new(Method::GET)
                .bucket(bucket)
                .key(key)
                .query("uploadId", upload_id);
            if let Some(marker) = marker {
                desc = desc.query("part-number-marker", marker.to_string());
            }

            let resp = self.execute_for_bucket(desc).await?;
            let resp = check_status(resp, &[200], Some(bucket), Some(key)).await?;
            let body = concat_body(resp).await?;
            let page: ListPartsPage = from_xml(&body)?;

            parts.extend(page.parts);
            if page.is_truncated {
                marker = page.next_part_number_marker;
            } else {
                return Ok(parts);
            }
        }
    }

    /// `POST ?uploads`: start a fresh upload, returning its ID.
    async fn initiate_upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: Option<&str>,
    ) -> Result<String, ClientError> {
        let mut desc = RequestDescriptor::new(Method::POST)
            .bucket(bucket)
            .key(key)
            .query_token("uploads");
        desc = with_content_type(desc, content_type)?;

        let resp = self.execute_for_bucket(desc).await?;
        let resp = check_status(resp, &[200], Some(bucket), Some(key)).await?;
        let body = concat_body(resp).await?;
        let result: InitiateMultipartResult = from_xml(&body)?;
        Ok(result.upload_id)
    }

    /// `PUT ?partNumber=n&uploadId=…`: upload one part, returning its ETag.
    async fn upload_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: u16,
        block: Bytes,
    ) -> Result<String, ClientError> {
        debug!(part_number, size = block.len(), "uploading part");

        let desc = RequestDescriptor::new(Method::PUT)
            .bucket(bucket)
            .key(key)
            .query("partNumber", part_number.to_string())
            .query("uploadId", upload_id)
            .payload(block);

        let resp = self.execute_for_bucket(desc).await?;
        let resp = check_status(resp, &[200], Some(bucket), Some(key)).await?;
        let etag = etag_header(&resp);
        drain_body(resp).await;
        Ok(etag)
    }

    /// `POST ?uploadId=…`: assemble the parts into the final object.
    async fn complete_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: Vec<CompletedPart>,
    ) -> Result<String, ClientError> {
        let payload = to_xml(
            "CompleteMultipartUpload",
            &CompleteMultipartUpload::new(parts),
        )?;

        debug!(bucket, key, upload_id = %upload_id, "completing multipart upload");

        let desc = RequestDescriptor::new(Method::POST)
            .bucket(bucket)
            .key(key)
            .query("uploadId", upload_id)
            .payload(Bytes::from(payload));

        let resp = self.execute_for_bucket(desc).await?;
        let resp = check_status(resp, &[200], Some(bucket), Some(key)).await?;
        let body = concat_body(resp).await?;
        let result: CompleteMultipartResult = from_xml(&body)?;
        Ok(result.etag)
    }
}

/// Attach an explicit content type to an upload descriptor.
fn with_content_type(
    desc: RequestDescriptor,
    content_type: Option<&str>,
) -> Result<RequestDescriptor, ClientError> {
    match content_type {
        Some(value) => {
            let value = http::HeaderValue::from_str(value)
                .map_err(|_| ClientError::invalid_argument("content type is not a valid header value"))?;
            Ok(desc.header(http::header::CONTENT_TYPE, value))
        }
        None => Ok(desc),
    }
}

/// Read the unquoted ETag from a response.
fn etag_header(resp: &crate::transport::HttpResponse) -> String {
    resp.header_str("etag")
        .map(|v| v.trim_matches('"').to_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;
    const GIB: u64 = 1024 * MIB;

    #[test]
    fn test_should_clamp_part_size_to_minimum_for_small_objects() {
        assert_eq!(optimal_part_size(6 * MIB), 5 * MIB);
        assert_eq!(optimal_part_size(30 * MIB), 5 * MIB);
    }

    #[test]
    fn test_should_scale_part_size_with_object_size() {
        let size = 500 * GIB;
        let part = optimal_part_size(size);
        assert!(part >= 5 * MIB);
        assert!(part <= 5 * GIB);
        assert!(size.div_ceil(part) <= u64::from(MAX_PARTS));
    }

    #[test]
    fn test_should_keep_part_count_under_cap_up_to_5_tib() {
        for size in [
            5 * MIB + 1,
            100 * MIB,
            1024 * GIB,
            5 * 1024 * GIB, // 5 TiB
        ] {
            let part = optimal_part_size(size);
            assert!((5 * MIB..=5 * GIB).contains(&part), "size {size}");
            assert!(
                size.div_ceil(part) <= u64::from(MAX_PARTS),
                "size {size} gives {} parts",
                size.div_ceil(part)
            );
        }
    }
}
