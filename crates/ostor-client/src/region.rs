//! Bucket-region discovery and caching.
//!
//! SigV4 signatures are scoped to a region, so before signing a request for
//! a bucket on Amazon the client has to know which region the bucket lives
//! in. The resolver asks once per bucket (`GET /{bucket}?location`, signed
//! against the default region) and caches the answer for the life of the
//! client. Self-hosted endpoints are single-region: the cache is bypassed
//! and every bucket resolves to `us-east-1`.
//!
//! Failures propagate to the caller and leave the cache untouched, so a
//! transient error does not pin a bucket to a wrong region. Concurrent
//! lookups for the same bucket may each issue the request; the first write
//! wins and later writers observe the cached value, keeping the mapping
//! monotonic.

use http::Method;
use tracing::debug;

use ostor_xml::parse_location_constraint;

use crate::client::Client;
use crate::config::DEFAULT_REGION;
use crate::error::ClientError;
use crate::pipeline::{check_status, concat_body};
use crate::request::RequestDescriptor;

impl Client {
    /// Resolve the region for a bucket, consulting the cache first.
    ///
    /// # Errors
    ///
    /// Propagates transport and server errors from the discovery request.
    pub(crate) async fn bucket_region(&self, bucket: &str) -> Result<String, ClientError> {
        if self.config().path_style {
            return Ok(DEFAULT_REGION.to_owned());
        }
        if let Some(region) = self.cached_region(bucket) {
            return Ok(region);
        }

        let region = self.fetch_bucket_region(bucket).await?;
        debug!(bucket, region = %region, "discovered bucket region");
        self.prime_region(bucket, &region);

        // A racing lookup may have written first; return the cached value so
        // every caller observes one consistent mapping.
        Ok(self.cached_region(bucket).unwrap_or(region))
    }

    /// Issue `GET /{bucket}?location` against the default region.
    ///
    /// The discovery request is always path-style: the virtual-host form
    /// would itself need the region being discovered.
    async fn fetch_bucket_region(&self, bucket: &str) -> Result<String, ClientError> {
        let desc = RequestDescriptor::new(Method::GET)
            .bucket(bucket)
            .query_token("location")
            .path_style();

        let resp = self.execute_signed(desc, DEFAULT_REGION).await?;
        let resp = check_status(resp, &[200], Some(bucket), None).await?;
        let body = concat_body(resp).await?;
        Ok(parse_location_constraint(&body)?)
    }
}
