//! The response and byte-stream pipeline.
//!
//! Responses are consumed as lazy chunk streams and routed through small
//! composable transformers:
//!
//! - [`concat_body`] buffers a metadata or error body up to a fixed bound
//!   and yields a single `Bytes` value.
//! - [`check_status`] dispatches on the HTTP status: expected statuses pass
//!   the response through untouched, everything else is fed to the error
//!   parser and surfaced as a typed error (draining the body either way so
//!   the connection can be reused).
//! - [`SizeVerifier`] passes chunks through unchanged and fails if the total
//!   byte count differs from the declared size.
//! - [`PartChunker`] re-blocks an arbitrary chunk stream into fixed-size
//!   part boundaries for the multipart orchestrator.
//!
//! Object downloads bypass the buffering transformers entirely; the caller
//! receives the raw stream.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use tracing::debug;

use ostor_model::response::ErrorDocument;
use ostor_xml::from_xml;

use crate::error::{ClientError, ServerError};
use crate::transport::HttpResponse;

/// Upper bound for buffered metadata and error bodies. Listing pages and
/// error documents are small; anything larger indicates a broken server or
/// a body routed to the wrong transformer.
pub const MAX_METADATA_BODY: usize = 8 * 1024 * 1024;

/// Collect a body stream into a single `Bytes`, bounded by
/// [`MAX_METADATA_BODY`].
///
/// # Errors
///
/// Returns [`ClientError::ResponseTooLarge`] when the bound is exceeded and
/// [`ClientError::Network`] on transport failures mid-body.
pub async fn concat_body(resp: HttpResponse) -> Result<Bytes, ClientError> {
    let mut body = resp.body;
    let mut buf = BytesMut::new();
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        if buf.len() + chunk.len() > MAX_METADATA_BODY {
            return Err(ClientError::ResponseTooLarge {
                limit: MAX_METADATA_BODY,
            });
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

/// Consume and discard a body stream so the connection can return to the
/// pool. Transport errors during the drain are ignored; the caller is
/// already on an error path.
pub async fn drain_body(resp: HttpResponse) {
    let mut body = resp.body;
    while let Some(chunk) = body.next().await {
        if chunk.is_err() {
            break;
        }
    }
}

/// Translate a non-expected response into a typed error, consuming the body.
///
/// A parseable `<Error>` document becomes [`ClientError::Server`]; anything
/// else becomes [`ClientError::UnexpectedStatus`] with a body snippet.
pub async fn error_from_response(
    resp: HttpResponse,
    bucket: Option<&str>,
    key: Option<&str>,
) -> ClientError {
    let status = resp.status.as_u16();
    let body = match concat_body(resp).await {
        Ok(body) => body,
        Err(err) => return err,
    };

    match from_xml::<ErrorDocument>(&body) {
        Ok(doc) if !doc.code.is_empty() => {
            debug!(status, code = %doc.code, "server error response");
            ClientError::Server(ServerError::from_document(doc, status, bucket, key))
        }
        _ => {
            let snippet = String::from_utf8_lossy(&body[..body.len().min(256)]).into_owned();
            ClientError::UnexpectedStatus { status, snippet }
        }
    }
}

/// Dispatch on the response status.
///
/// `expected` lists the statuses routed to the success parser; an empty
/// slice accepts any 2xx/3xx. Everything else is routed to the error parser,
/// which also drains the body.
///
/// # Errors
///
/// Returns the translated error for non-expected statuses.
pub async fn check_status(
    resp: HttpResponse,
    expected: &[u16],
    bucket: Option<&str>,
    key: Option<&str>,
) -> Result<HttpResponse, ClientError> {
    let status = resp.status.as_u16();
    let ok = if expected.is_empty() {
        resp.status.is_success() || resp.status.is_redirection()
    } else {
        expected.contains(&status)
    };

    if ok {
        Ok(resp)
    } else {
        Err(error_from_response(resp, bucket, key).await)
    }
}

/// A pass-through transformer that counts bytes and fails on a total
/// different from the declared size.
///
/// Overruns fail as soon as the count exceeds the expectation; underruns
/// fail at end-of-stream. After yielding an error the stream is fused.
pub struct SizeVerifier<S> {
    inner: S,
    expected: u64,
    seen: u64,
    done: bool,
}

impl<S> SizeVerifier<S> {
    /// Wrap a stream, expecting exactly `expected` bytes in total.
    pub fn new(inner: S, expected: u64) -> Self {
        Self {
            inner,
            expected,
            seen: 0,
            done: false,
        }
    }
}

impl<S> Stream for SizeVerifier<S>
where
    S: Stream<Item = Result<Bytes, ClientError>> + Unpin,
{
    type Item = Result<Bytes, ClientError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.seen += chunk.len() as u64;
                if this.seen > this.expected {
                    this.done = true;
                    Poll::Ready(Some(Err(ClientError::SizeMismatch {
                        expected: this.expected,
                        actual: this.seen,
                    })))
                } else {
                    Poll::Ready(Some(Ok(chunk)))
                }
            }
            Poll::Ready(Some(Err(err))) => {
                this.done = true;
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                this.done = true;
                if this.seen == this.expected {
                    Poll::Ready(None)
                } else {
                    Poll::Ready(Some(Err(ClientError::SizeMismatch {
                        expected: this.expected,
                        actual: this.seen,
                    })))
                }
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Re-block a chunk stream into blocks of exactly `part_size` bytes; the
/// final block may be shorter. Input chunk boundaries are invisible to the
/// output.
pub struct PartChunker {
    source: BoxStream<'static, Result<Bytes, ClientError>>,
    part_size: usize,
    buf: BytesMut,
    source_done: bool,
    failed: bool,
}

impl PartChunker {
    /// Wrap a stream, emitting `part_size`-byte blocks.
    #[must_use]
    pub fn new(source: BoxStream<'static, Result<Bytes, ClientError>>, part_size: usize) -> Self {
        Self {
            source,
            part_size,
            buf: BytesMut::new(),
            source_done: false,
            failed: false,
        }
    }
}

impl Stream for PartChunker {
    type Item = Result<Bytes, ClientError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.failed {
            return Poll::Ready(None);
        }
        loop {
            if this.buf.len() >= this.part_size {
                return Poll::Ready(Some(Ok(this.buf.split_to(this.part_size).freeze())));
            }
            if this.source_done {
                if this.buf.is_empty() {
                    return Poll::Ready(None);
                }
                let rest = this.buf.split().freeze();
                return Poll::Ready(Some(Ok(rest)));
            }
            match this.source.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => this.buf.extend_from_slice(&chunk),
                Poll::Ready(Some(Err(err))) => {
                    this.failed = true;
                    return Poll::Ready(Some(Err(err)));
                }
                Poll::Ready(None) => this.source_done = true,
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
