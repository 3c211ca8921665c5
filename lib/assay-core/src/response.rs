//! HTTP response as handed over by a transport.
//!
//! The body is still a stream at this point: the inspector drains it exactly
//! once when it is built.

use std::fmt;
use std::pin::Pin;

use bytes::Bytes;
use futures_core::Stream;
use futures_util::stream;

use crate::Headers;

/// A streaming body: chunks of bytes arriving over time.
pub type ResponseBody = Pin<Box<dyn Stream<Item = crate::Result<Bytes>> + Send>>;

/// Status line and headers of a response.
///
/// `headers` is `None` when the transport produced no header collection at
/// all, which is distinct from an empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    status: u16,
    headers: Option<Headers>,
}

impl ResponseHead {
    /// Create a response head.
    #[must_use]
    pub const fn new(status: u16, headers: Option<Headers>) -> Self {
        Self { status, headers }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers, if the transport provided any collection.
    #[must_use]
    pub const fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// HTTP response with a streaming body.
pub struct Response {
    head: ResponseHead,
    body: ResponseBody,
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("head", &self.head)
            .finish_non_exhaustive()
    }
}

impl Response {
    /// Creates a new streaming response.
    #[must_use]
    pub fn new(status: u16, headers: Option<Headers>, body: ResponseBody) -> Self {
        Self {
            head: ResponseHead::new(status, headers),
            body,
        }
    }

    /// A response whose body is already in memory.
    #[must_use]
    pub fn buffered(status: u16, headers: Option<Headers>, body: impl Into<Bytes>) -> Self {
        let chunk: crate::Result<Bytes> = Ok(body.into());
        Self::new(status, headers, Box::pin(stream::iter([chunk])))
    }

    /// Status line and headers.
    #[must_use]
    pub const fn head(&self) -> &ResponseHead {
        &self.head
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.head.status
    }

    /// Response headers, if any collection was provided.
    #[must_use]
    pub const fn headers(&self) -> Option<&Headers> {
        self.head.headers()
    }

    /// Consume into the head and the body stream.
    #[must_use]
    pub fn into_parts(self) -> (ResponseHead, ResponseBody) {
        (self.head, self.body)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;

    use super::*;

    #[test]
    fn success_is_2xx_only() {
        assert!(ResponseHead::new(200, None).is_success());
        assert!(ResponseHead::new(204, None).is_success());
        assert!(!ResponseHead::new(302, None).is_success());
        assert!(!ResponseHead::new(404, None).is_success());
    }

    #[test]
    fn missing_and_empty_headers_differ() {
        let missing = ResponseHead::new(200, None);
        let empty = ResponseHead::new(200, Some(Headers::new()));
        assert!(missing.headers().is_none());
        assert_eq!(empty.headers().map(Headers::len), Some(0));
    }

    #[tokio::test]
    async fn buffered_body_is_a_single_chunk() {
        let headers: Headers = [("Content-Type", "text/plain")].into_iter().collect();
        let response = Response::buffered(200, Some(headers), "some body");
        assert_eq!(response.status(), 200);

        let (head, mut body) = response.into_parts();
        assert_eq!(
            head.headers().and_then(|h| h.get("content-type")),
            Some("text/plain")
        );

        let chunk = body.next().await.expect("one chunk").expect("ok");
        assert_eq!(chunk.as_ref(), b"some body");
        assert!(body.next().await.is_none());
    }
}
