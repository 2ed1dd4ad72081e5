//! Caller-supplied upload data.
//!
//! [`ObjectSource`] wraps whatever byte stream the caller has — an in-memory
//! buffer, a chunked producer, a file reader adapted to a stream — behind one
//! type the orchestrator can chunk and verify.

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};

use crate::error::ClientError;

/// A stream of bytes to upload.
pub struct ObjectSource {
    inner: BoxStream<'static, std::io::Result<Bytes>>,
}

impl ObjectSource {
    /// Wrap an arbitrary fallible byte stream.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = std::io::Result<Bytes>> + Send + 'static,
    {
        Self {
            inner: stream.boxed(),
        }
    }

    /// Wrap an in-memory buffer.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self::from_stream(futures::stream::iter(
            if bytes.is_empty() { vec![] } else { vec![Ok(bytes)] },
        ))
    }

    /// Convert into the pipeline's stream type.
    pub(crate) fn into_stream(self) -> BoxStream<'static, Result<Bytes, ClientError>> {
        self.inner.map(|chunk| chunk.map_err(ClientError::Io)).boxed()
    }
}

impl From<Bytes> for ObjectSource {
    fn from(bytes: Bytes) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Vec<u8>> for ObjectSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<&'static [u8]> for ObjectSource {
    fn from(bytes: &'static [u8]) -> Self {
        Self::from_bytes(Bytes::from_static(bytes))
    }
}

impl From<&'static str> for ObjectSource {
    fn from(s: &'static str) -> Self {
        Self::from_bytes(Bytes::from_static(s.as_bytes()))
    }
}

impl std::fmt::Debug for ObjectSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectSource").finish_non_exhaustive()
    }
}
