//! Chainable assertions over a completed response.
//!
//! A [`ResponseInspector`] is what every client action returns. It is either
//! [`Live`](ResponseInspector::Live), wrapping the outcome of a request
//! attempt, or [`Null`](ResponseInspector::Null), returned when no attempt
//! was possible. Both variants expose the same methods, so a chain never has
//! to branch on which one it holds.
//!
//! The live variant drains the body exactly once, when it is built. Every
//! `expect_*` method then works on the materialized body and reports failures
//! through the [`ErrorChannel`] shared with the client. Once that channel
//! carries an error every method is a no-op.
//!
//! ```
//! use assay_core::{ErrorCell, Headers, Response, ResponseInspector};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cell = ErrorCell::new();
//! let headers: Headers = [("Content-Type", "text/plain")].into_iter().collect();
//! let response = Response::buffered(200, Some(headers), "hello world");
//!
//! ResponseInspector::read(Some(response), cell.channel(), None)
//!     .await
//!     .expect_status(200)
//!     .expect_header_contains("content-type", "text")
//!     .expect_body_contains("world");
//!
//! assert!(cell.get().is_none());
//! # }
//! ```

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::time::Instant;

use crate::{Error, ErrorChannel, Headers, Response, ResponseBody, ResponseHead, Result};

/// Result of a request attempt, ready for chained expectations.
#[derive(Debug)]
pub enum ResponseInspector {
    /// A request was attempted; the response may be absent if it failed.
    Live(LiveResponse),
    /// No request was attempted. Every method is a no-op.
    Null,
}

/// State of an attempted request: head, materialized body, and the error
/// channel shared with the client.
#[derive(Debug)]
pub struct LiveResponse {
    channel: ErrorChannel,
    head: Option<ResponseHead>,
    bytes: Bytes,
    text: String,
}

impl LiveResponse {
    fn fail(&self, message: String) {
        self.channel.report(Error::expectation(message));
    }
}

async fn drain(mut body: ResponseBody) -> Result<Bytes> {
    let mut collected = Vec::new();
    while let Some(chunk) = body.next().await {
        collected.extend_from_slice(&chunk?);
    }
    Ok(Bytes::from(collected))
}

impl ResponseInspector {
    /// Build a live inspector, draining the response body once.
    ///
    /// If `channel` already reports an error the body is not read and the
    /// inspector stays empty. A read failure, or a missed `deadline`, is
    /// reported through `channel` as `reading response body`.
    pub async fn read(
        response: Option<Response>,
        channel: ErrorChannel,
        deadline: Option<Instant>,
    ) -> Self {
        if channel.is_errored() {
            let head = response.map(|response| response.into_parts().0);
            return Self::live(channel, head, Bytes::new());
        }

        let Some(response) = response else {
            channel.report(Error::expectation(
                "expected a response to inspect, but none was received",
            ));
            return Self::absent(channel);
        };

        let (head, body) = response.into_parts();
        let drained = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, drain(body))
                .await
                .unwrap_or(Err(Error::Timeout)),
            None => drain(body).await,
        };

        match drained {
            Ok(bytes) => Self::live(channel, Some(head), bytes),
            Err(err) => {
                channel.report(err.context("reading response body"));
                Self::live(channel, Some(head), Bytes::new())
            }
        }
    }

    /// A live inspector around a request that never produced a response.
    ///
    /// The caller is expected to have reported the failure through `channel`
    /// already, which makes every expectation a no-op.
    #[must_use]
    pub fn absent(channel: ErrorChannel) -> Self {
        Self::live(channel, None, Bytes::new())
    }

    fn live(channel: ErrorChannel, head: Option<ResponseHead>, bytes: Bytes) -> Self {
        let text = String::from_utf8_lossy(&bytes).into_owned();
        Self::Live(LiveResponse {
            channel,
            head,
            bytes,
            text,
        })
    }

    /// Returns `true` for the [`Null`](Self::Null) variant.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The live response when the chain has no error yet.
    fn pending(&self) -> Option<(&LiveResponse, &ResponseHead)> {
        match self {
            Self::Live(live) if !live.channel.is_errored() => {
                live.head.as_ref().map(|head| (live, head))
            }
            _ => None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Materialized body, or `""` if it was never read.
    ///
    /// Invalid UTF-8 is replaced; use [`body_bytes`](Self::body_bytes) for the
    /// exact payload.
    #[must_use]
    pub fn body(&self) -> &str {
        match self {
            Self::Live(live) => &live.text,
            Self::Null => "",
        }
    }

    /// Materialized body bytes, or empty if never read.
    #[must_use]
    pub fn body_bytes(&self) -> &[u8] {
        match self {
            Self::Live(live) => &live.bytes,
            Self::Null => &[],
        }
    }

    /// Response status, if a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.head().map(ResponseHead::status)
    }

    /// Response headers, if a response with a header collection was received.
    #[must_use]
    pub fn headers(&self) -> Option<&Headers> {
        self.head().and_then(ResponseHead::headers)
    }

    fn head(&self) -> Option<&ResponseHead> {
        match self {
            Self::Live(live) => live.head.as_ref(),
            Self::Null => None,
        }
    }

    // ========================================================================
    // Body expectations
    // ========================================================================

    /// Expect the body to contain `needle`.
    pub fn expect_body_contains(&self, needle: &str) -> &Self {
        if let Some((live, _)) = self.pending()
            && !live.text.contains(needle)
        {
            live.fail(format!("expected body to contain {needle:?} but it did not"));
        }
        self
    }

    /// Expect the body to be exactly `value`.
    pub fn expect_body_equals(&self, value: &str) -> &Self {
        if let Some((live, _)) = self.pending()
            && live.text != value
        {
            live.fail(format!("expected body to be {value:?} but it was not"));
        }
        self
    }

    /// Expect the body not to contain `needle`.
    pub fn expect_body_not_contains(&self, needle: &str) -> &Self {
        if let Some((live, _)) = self.pending()
            && live.text.contains(needle)
        {
            live.fail(format!("expected body to not contain {needle:?} but it does"));
        }
        self
    }

    /// Expect the body to differ from `value`.
    pub fn expect_body_not_equals(&self, value: &str) -> &Self {
        if let Some((live, _)) = self.pending()
            && live.text == value
        {
            live.fail(format!("expected body not to be {value:?} but it was"));
        }
        self
    }

    /// Expect `predicate` to accept the body.
    pub fn expect_body_passes(&self, predicate: impl FnOnce(&str) -> bool) -> &Self {
        if let Some((live, _)) = self.pending()
            && !predicate(&live.text)
        {
            live.fail("expected body predicate to pass, but it did not".to_string());
        }
        self
    }

    // ========================================================================
    // Header expectations
    // ========================================================================
    //
    // Positive checks fail when the response has no header collection at all;
    // negative checks treat a missing collection as satisfied.

    /// Expect some value of header `key` to contain `needle`.
    pub fn expect_header_contains(&self, key: &str, needle: &str) -> &Self {
        if let Some((live, head)) = self.pending() {
            match head.headers() {
                None => live.fail(format!(
                    "expected a header {key:?} containing {needle:?}, but there are no headers"
                )),
                Some(headers) => {
                    if !headers.get_all(key).iter().any(|v| v.contains(needle)) {
                        live.fail(format!(
                            "expected a header {key:?} containing {needle:?}, but it did not"
                        ));
                    }
                }
            }
        }
        self
    }

    /// Expect some value of header `key` to equal `value`.
    pub fn expect_header_equals(&self, key: &str, value: &str) -> &Self {
        if let Some((live, head)) = self.pending() {
            match head.headers() {
                None => live.fail(format!(
                    "expected a header {key:?} equal to {value:?}, but there are no headers"
                )),
                Some(headers) => {
                    if !headers.get_all(key).iter().any(|v| v == value) {
                        live.fail(format!(
                            "expected a header {key:?} equal to {value:?}, but it was not"
                        ));
                    }
                }
            }
        }
        self
    }

    /// Expect no value of header `key` to contain `needle`.
    pub fn expect_header_not_contains(&self, key: &str, needle: &str) -> &Self {
        if let Some((live, head)) = self.pending()
            && let Some(headers) = head.headers()
            && headers.get_all(key).iter().any(|v| v.contains(needle))
        {
            live.fail(format!(
                "expected a header {key:?} to not contain {needle:?}, but it does"
            ));
        }
        self
    }

    /// Expect no value of header `key` to equal `value`.
    pub fn expect_header_not_equals(&self, key: &str, value: &str) -> &Self {
        if let Some((live, head)) = self.pending()
            && let Some(headers) = head.headers()
            && headers.get_all(key).iter().any(|v| v == value)
        {
            live.fail(format!(
                "expected a header {key:?} to not be {value:?}, but it is"
            ));
        }
        self
    }

    /// Expect header `key` to be present.
    pub fn expect_header_present(&self, key: &str) -> &Self {
        if let Some((live, head)) = self.pending() {
            match head.headers() {
                None => live.fail(format!(
                    "expected a header {key:?}, but there are no headers"
                )),
                Some(headers) => {
                    if !headers.contains(key) {
                        live.fail(format!(
                            "expected a header {key:?} to be present, but it was not"
                        ));
                    }
                }
            }
        }
        self
    }

    /// Expect header `key` to be absent.
    pub fn expect_header_not_present(&self, key: &str) -> &Self {
        if let Some((live, head)) = self.pending()
            && head.headers().is_some_and(|headers| headers.contains(key))
        {
            live.fail(format!(
                "expected a header {key:?} not to be present, but it was"
            ));
        }
        self
    }

    // ========================================================================
    // Whole-response expectations
    // ========================================================================

    /// Expect `predicate` to accept the response head and body.
    pub fn expect_passes(&self, predicate: impl FnOnce(&ResponseHead, &str) -> bool) -> &Self {
        if let Some((live, head)) = self.pending()
            && !predicate(head, &live.text)
        {
            live.fail("expected response predicate to pass, but it did not".to_string());
        }
        self
    }

    /// Expect the response status to be `code`.
    pub fn expect_status(&self, code: u16) -> &Self {
        if let Some((live, head)) = self.pending()
            && head.status() != code
        {
            live.fail(format!(
                "expected status code {code} but got {}",
                head.status()
            ));
        }
        self
    }

    /// Decode the body as JSON into `dest`.
    ///
    /// `dest` is only written on success.
    pub fn parse_body<T: serde::de::DeserializeOwned>(&self, dest: &mut T) -> &Self {
        if let Some((live, _)) = self.pending() {
            match crate::from_json(&live.bytes) {
                Ok(value) => *dest = value,
                Err(err) => live.channel.report(err.context("decoding body")),
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert2::{check, let_assert};
    use futures_util::stream;

    use super::*;
    use crate::{ErrorCell, SharedError};

    const MULTILINE: &str = "some body\nmore lines\nlast line";

    fn auth_headers() -> Headers {
        [("Auth", "password"), ("Other", "header")]
            .into_iter()
            .collect()
    }

    async fn inspect(response: Response) -> (ResponseInspector, ErrorCell) {
        let cell = ErrorCell::new();
        let inspector = ResponseInspector::read(Some(response), cell.channel(), None).await;
        (inspector, cell)
    }

    async fn with_body(body: &'static str) -> (ResponseInspector, ErrorCell) {
        inspect(Response::buffered(200, Some(Headers::new()), body)).await
    }

    async fn with_headers(headers: Option<Headers>) -> (ResponseInspector, ErrorCell) {
        inspect(Response::buffered(200, headers, "")).await
    }

    /// Runs `check` against a fresh inspector and reports whether it passed.
    /// Also asserts that the method returned the inspector it was called on.
    async fn passes<F>(response: Response, expectation: F) -> bool
    where
        F: for<'a> Fn(&'a ResponseInspector) -> &'a ResponseInspector,
    {
        let (inspector, cell) = inspect(response).await;
        let returned = expectation(&inspector);
        assert!(std::ptr::eq(returned, &inspector));
        cell.get().is_none()
    }

    /// Asserts that `check` leaves an already-recorded error untouched.
    async fn keeps_existing_error<F>(response: Response, expectation: F)
    where
        F: for<'a> Fn(&'a ResponseInspector) -> &'a ResponseInspector,
    {
        let (inspector, cell) = inspect(response).await;
        cell.set(Error::expectation("existing error"));
        let before: Option<SharedError> = cell.get();

        let returned = expectation(&inspector);

        check!(std::ptr::eq(returned, &inspector));
        let_assert!(Some(before) = before);
        let_assert!(Some(after) = cell.get());
        check!(Arc::ptr_eq(&before, &after));
    }

    fn body_response(body: &'static str) -> Response {
        Response::buffered(200, Some(Headers::new()), body)
    }

    fn header_response() -> Response {
        Response::buffered(200, Some(auth_headers()), "")
    }

    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn read_materializes_the_body() {
        let (inspector, cell) = with_body("some body").await;
        check!(cell.get().is_none());
        check!(inspector.body() == "some body");
        check!(inspector.body_bytes() == b"some body");
        check!(inspector.status() == Some(200));
    }

    #[tokio::test]
    async fn read_skips_body_when_already_errored() {
        let cell = ErrorCell::new();
        cell.set(Error::expectation("always error"));

        let response = Response::buffered(200, Some(Headers::new()), "some body");
        let inspector = ResponseInspector::read(Some(response), cell.channel(), None).await;

        check!(inspector.body().is_empty());
        check!(inspector.status() == Some(200));
        let_assert!(Some(err) = cell.get());
        check!(err.to_string() == "always error");
    }

    #[tokio::test]
    async fn read_reports_body_failures() {
        let chunks: Vec<Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(Error::connection("read error")),
        ];
        let response = Response::new(200, Some(Headers::new()), Box::pin(stream::iter(chunks)));

        let (inspector, cell) = inspect(response).await;

        check!(inspector.body().is_empty());
        let_assert!(Some(err) = cell.get());
        insta::assert_snapshot!(
            err.to_string(),
            @"reading response body: connection error: read error"
        );
    }

    #[tokio::test]
    async fn read_concatenates_chunks() {
        let chunks: Vec<Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"some ")),
            Ok(Bytes::from_static(b"body")),
        ];
        let response = Response::new(200, None, Box::pin(stream::iter(chunks)));

        let (inspector, cell) = inspect(response).await;

        check!(cell.get().is_none());
        check!(inspector.body() == "some body");
    }

    #[tokio::test]
    async fn read_stops_at_the_deadline() {
        let response = Response::new(200, None, Box::pin(stream::pending()));
        let cell = ErrorCell::new();
        let deadline = Instant::now() + std::time::Duration::from_millis(10);

        let inspector =
            ResponseInspector::read(Some(response), cell.channel(), Some(deadline)).await;

        check!(inspector.body().is_empty());
        let_assert!(Some(err) = cell.get());
        check!(err.is_timeout());
        check!(err.to_string() == "reading response body: request timeout");
    }

    #[tokio::test]
    async fn read_without_response_and_without_error_reports_it() {
        let cell = ErrorCell::new();
        let inspector = ResponseInspector::read(None, cell.channel(), None).await;

        check!(inspector.status().is_none());
        check!(cell.is_set());
    }

    #[tokio::test]
    async fn repeated_body_reads_are_consistent() {
        let (inspector, _cell) = with_body(MULTILINE).await;
        let first = inspector.body().to_owned();
        inspector.expect_body_contains("more").expect_body_contains("last");
        check!(inspector.body() == first);
        check!(inspector.body() == MULTILINE);
    }

    #[tokio::test]
    async fn invalid_utf8_keeps_raw_bytes() {
        let response = Response::buffered(200, None, vec![0xff, b'o', b'k']);
        let (inspector, _cell) = inspect(response).await;

        check!(inspector.body_bytes() == [0xff, b'o', b'k']);
        check!(inspector.body() == "\u{fffd}ok");
    }

    // ------------------------------------------------------------------------
    // Body expectations
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn body_contains() {
        let cases = [
            ("more", true),
            ("body\nmore", true),
            ("line", true),
            ("nmore", false),
            ("missing", false),
        ];
        for (needle, expected) in cases {
            let passed = passes(body_response(MULTILINE), |r| r.expect_body_contains(needle)).await;
            check!(passed == expected, "needle = {needle:?}");
        }

        keeps_existing_error(body_response(MULTILINE), |r| {
            r.expect_body_contains("not contained")
        })
        .await;
    }

    #[tokio::test]
    async fn body_equals() {
        let cases = [
            ("some", false),
            ("body", false),
            ("some body", true),
            ("missing", false),
            ("", false),
        ];
        for (value, expected) in cases {
            let passed = passes(body_response("some body"), |r| r.expect_body_equals(value)).await;
            check!(passed == expected, "value = {value:?}");
        }

        keeps_existing_error(body_response("some body"), |r| r.expect_body_equals("different"))
            .await;
    }

    #[tokio::test]
    async fn body_not_contains() {
        let cases = [
            ("more", false),
            ("body\nmore", false),
            ("line", false),
            ("nmore", true),
            ("missing", true),
        ];
        for (needle, expected) in cases {
            let passed =
                passes(body_response(MULTILINE), |r| r.expect_body_not_contains(needle)).await;
            check!(passed == expected, "needle = {needle:?}");
        }

        keeps_existing_error(body_response(MULTILINE), |r| {
            r.expect_body_not_contains(MULTILINE)
        })
        .await;
    }

    #[tokio::test]
    async fn body_not_equals() {
        let cases = [
            ("some", true),
            ("body", true),
            ("some body", false),
            ("missing", true),
            ("", true),
        ];
        for (value, expected) in cases {
            let passed =
                passes(body_response("some body"), |r| r.expect_body_not_equals(value)).await;
            check!(passed == expected, "value = {value:?}");
        }

        keeps_existing_error(body_response("some body"), |r| {
            r.expect_body_not_equals("some body")
        })
        .await;
    }

    #[tokio::test]
    async fn body_passes() {
        check!(passes(body_response("some body"), |r| r.expect_body_passes(|b| b.len() == 9)).await);
        check!(!passes(body_response("some body"), |r| r.expect_body_passes(str::is_empty)).await);

        keeps_existing_error(body_response("some body"), |r| r.expect_body_passes(|_| false))
            .await;
    }

    #[tokio::test]
    async fn body_failure_messages() {
        let (inspector, cell) = with_body("some body").await;
        inspector.expect_body_contains("nmore");

        let_assert!(Some(err) = cell.get());
        insta::assert_snapshot!(err.to_string(), @r#"expected body to contain "nmore" but it did not"#);
    }

    // ------------------------------------------------------------------------
    // Header expectations
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn header_contains() {
        let cases = [
            ("Auth", "password", true),
            ("Auth", "pass", true),
            ("Auth", "sword", true),
            ("auth", "word", true),
            ("Auth", "nope", false),
            ("Fake", "", false),
        ];
        for (key, needle, expected) in cases {
            let passed =
                passes(header_response(), |r| r.expect_header_contains(key, needle)).await;
            check!(passed == expected, "key = {key:?}, needle = {needle:?}");
        }

        keeps_existing_error(header_response(), |r| {
            r.expect_header_contains("missing", "not contained")
        })
        .await;
    }

    #[tokio::test]
    async fn header_equals() {
        let cases = [
            ("Auth", "password", true),
            ("Auth", "pass", false),
            ("Auth", "sword", false),
            ("Auth", "nope", false),
            ("Fake", "", false),
        ];
        for (key, value, expected) in cases {
            let passed = passes(header_response(), |r| r.expect_header_equals(key, value)).await;
            check!(passed == expected, "key = {key:?}, value = {value:?}");
        }

        keeps_existing_error(header_response(), |r| {
            r.expect_header_equals("missing", "not contained")
        })
        .await;
    }

    #[tokio::test]
    async fn header_not_contains() {
        let cases = [
            ("Auth", "password", false),
            ("Auth", "pass", false),
            ("Auth", "sword", false),
            ("Auth", "nope", true),
            ("Fake", "", true),
        ];
        for (key, needle, expected) in cases {
            let passed =
                passes(header_response(), |r| r.expect_header_not_contains(key, needle)).await;
            check!(passed == expected, "key = {key:?}, needle = {needle:?}");
        }

        keeps_existing_error(header_response(), |r| {
            r.expect_header_not_contains("Auth", "password")
        })
        .await;
    }

    #[tokio::test]
    async fn header_not_equals() {
        let cases = [
            ("Auth", "password", false),
            ("Auth", "pass", true),
            ("Auth", "sword", true),
            ("Auth", "nope", true),
            ("Fake", "", true),
        ];
        for (key, value, expected) in cases {
            let passed =
                passes(header_response(), |r| r.expect_header_not_equals(key, value)).await;
            check!(passed == expected, "key = {key:?}, value = {value:?}");
        }

        keeps_existing_error(header_response(), |r| {
            r.expect_header_not_equals("Auth", "password")
        })
        .await;
    }

    #[tokio::test]
    async fn header_present_and_not_present() {
        check!(passes(header_response(), |r| r.expect_header_present("Auth")).await);
        check!(!passes(header_response(), |r| r.expect_header_present("X")).await);
        check!(!passes(header_response(), |r| r.expect_header_not_present("Auth")).await);
        check!(passes(header_response(), |r| r.expect_header_not_present("X")).await);

        keeps_existing_error(header_response(), |r| r.expect_header_present("X")).await;
        keeps_existing_error(header_response(), |r| r.expect_header_not_present("Auth")).await;
    }

    // Positive header checks fail on a response without any header collection,
    // negative ones pass.
    #[tokio::test]
    async fn missing_header_collection_is_asymmetric() {
        let positive: [fn(&ResponseInspector) -> &ResponseInspector; 3] = [
            |r| r.expect_header_present("X"),
            |r| r.expect_header_contains("X", "v"),
            |r| r.expect_header_equals("X", "v"),
        ];
        for expectation in positive {
            let (inspector, cell) = with_headers(None).await;
            expectation(&inspector);
            let_assert!(Some(err) = cell.get());
            check!(err.to_string().contains("no headers"));
        }

        let negative: [fn(&ResponseInspector) -> &ResponseInspector; 3] = [
            |r| r.expect_header_not_present("X"),
            |r| r.expect_header_not_contains("X", "v"),
            |r| r.expect_header_not_equals("X", "v"),
        ];
        for expectation in negative {
            let (inspector, cell) = with_headers(None).await;
            expectation(&inspector);
            check!(cell.get().is_none());
        }
    }

    #[tokio::test]
    async fn header_failure_messages() {
        let (inspector, cell) = with_headers(Some(auth_headers())).await;
        inspector.expect_header_equals("Auth", "pass");

        let_assert!(Some(err) = cell.get());
        insta::assert_snapshot!(
            err.to_string(),
            @r#"expected a header "Auth" equal to "pass", but it was not"#
        );
    }

    // ------------------------------------------------------------------------
    // Whole-response expectations
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn status() {
        check!(passes(body_response(""), |r| r.expect_status(200)).await);

        let (inspector, cell) = inspect(Response::buffered(500, None, "")).await;
        inspector.expect_status(200);
        let_assert!(Some(err) = cell.get());
        insta::assert_snapshot!(err.to_string(), @"expected status code 200 but got 500");

        keeps_existing_error(body_response(""), |r| r.expect_status(404)).await;
    }

    #[tokio::test]
    async fn response_predicate_sees_head_and_body() {
        let passed = passes(header_response(), |r| {
            r.expect_passes(|head, body| {
                head.status() == 200
                    && head.headers().is_some_and(|h| h.contains("Other"))
                    && body.is_empty()
            })
        })
        .await;
        check!(passed);

        check!(!passes(header_response(), |r| r.expect_passes(|_, _| false)).await);
        keeps_existing_error(header_response(), |r| r.expect_passes(|_, _| false)).await;
    }

    #[derive(Debug, Default, PartialEq, serde::Deserialize)]
    struct Entry {
        key: String,
        value: String,
    }

    #[tokio::test]
    async fn parse_body_decodes_regardless_of_field_order() {
        let (inspector, cell) = with_body(r#"{"value":"v","key":"k"}"#).await;
        let mut entry = Entry::default();

        let returned = inspector.parse_body(&mut entry);

        check!(std::ptr::eq(returned, &inspector));
        check!(cell.get().is_none());
        check!(
            entry
                == Entry {
                    key: "k".to_string(),
                    value: "v".to_string(),
                }
        );
    }

    #[tokio::test]
    async fn parse_body_leaves_destination_on_failure() {
        let (inspector, cell) = with_body("not JSON").await;
        let mut entry = Entry {
            key: "untouched".to_string(),
            value: String::new(),
        };

        inspector.parse_body(&mut entry);

        check!(entry.key == "untouched");
        let_assert!(Some(err) = cell.get());
        check!(err.to_string().starts_with("decoding body: JSON deserialization error"));
    }

    #[tokio::test]
    async fn parse_body_is_skipped_after_an_error() {
        let (inspector, cell) = with_body(r#"{"key":"k","value":"v"}"#).await;
        cell.set(Error::expectation("existing error"));
        let mut entry = Entry::default();

        inspector.parse_body(&mut entry);

        check!(entry == Entry::default());
    }

    #[tokio::test]
    async fn first_failure_wins_within_a_chain() {
        let (inspector, cell) = with_body("some body").await;
        inspector
            .expect_status(500)
            .expect_body_equals("other")
            .expect_header_present("Missing");

        let_assert!(Some(err) = cell.get());
        check!(err.to_string() == "expected status code 500 but got 200");
    }

    // ------------------------------------------------------------------------
    // Null inspector
    // ------------------------------------------------------------------------

    #[test]
    fn null_absorbs_every_call() {
        let null = ResponseInspector::Null;
        let mut entry = Entry::default();

        let returned = null
            .expect_body_contains("x")
            .expect_body_equals("x")
            .expect_body_not_contains("")
            .expect_body_not_equals("")
            .expect_body_passes(|_| false)
            .expect_header_contains("k", "v")
            .expect_header_equals("k", "v")
            .expect_header_not_contains("k", "")
            .expect_header_not_equals("k", "")
            .expect_header_present("k")
            .expect_header_not_present("k")
            .expect_passes(|_, _| false)
            .expect_status(999)
            .parse_body(&mut entry);

        check!(std::ptr::eq(returned, &null));
        check!(returned.is_null());
        check!(null.body().is_empty());
        check!(null.body_bytes().is_empty());
        check!(null.status().is_none());
        check!(null.headers().is_none());
        check!(entry == Entry::default());
    }

    #[tokio::test]
    async fn absent_inspector_is_inert() {
        let cell = ErrorCell::new();
        cell.set(Error::connection("refused"));
        let inspector = ResponseInspector::absent(cell.channel());

        inspector.expect_status(200).expect_body_equals("x");

        check!(!inspector.is_null());
        check!(inspector.body().is_empty());
        let_assert!(Some(err) = cell.get());
        check!(err.is_connection());
    }
}
