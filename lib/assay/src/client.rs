//! The request builder: accumulated configuration plus one HTTP exchange per
//! action method, redirects included.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use bytes::Bytes;
use serde::Serialize;
use tokio::time::Instant;

use crate::redirect::{self, MAX_REDIRECTS};
use crate::{
    ContentType, CookieStore, Error, ErrorCell, Headers, HyperTransport, Method, Request,
    Response, ResponseInspector, Result, SharedError, Transport,
};

/// Fluent HTTP client for API tests.
///
/// Configuration methods consume and return the client; action methods
/// borrow it and resolve to a [`ResponseInspector`]. Every failure, whether
/// in configuration, request building, transport or an expectation, lands in
/// one sticky error slot: the first one wins and turns every later call into
/// a no-op. Check it once with [`error`](Self::error) at the end.
///
/// # Example
///
/// ```no_run
/// use assay::Client;
///
/// # #[tokio::main]
/// # async fn main() {
/// let api = Client::new("https://httpbin.org").with_header("api-key", "12345");
///
/// api.get("/status/200").await.expect_status(200);
/// api.post("/anything", &serde_json::json!({"key": "k"}))
///     .await
///     .expect_status(200)
///     .expect_body_contains("\"key\"");
///
/// if let Some(err) = api.error() {
///     panic!("{err}");
/// }
/// # }
/// ```
pub struct Client<T = HyperTransport> {
    base_url: String,
    transport: Arc<T>,
    error: ErrorCell,
    basic_auth: Option<String>,
    cookies: Option<CookieStore>,
    headers: Headers,
    timeout: Duration,
}

impl<T> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("error", &self.error.get())
            .field("basic_auth", &self.basic_auth.is_some())
            .field("cookies", &self.cookies.is_some())
            .field("headers", &self.headers)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Client<HyperTransport> {
    /// Create a client for `base_url` using the default hyper transport.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_transport(base_url, HyperTransport::new())
    }
}

impl<T> Clone for Client<T> {
    /// A healthy client clones into an independent one: fresh error slot,
    /// copied headers and cookie jar. An errored client's clone keeps
    /// pointing at the same error.
    fn clone(&self) -> Self {
        let error = if self.error.is_set() {
            self.error.clone()
        } else {
            ErrorCell::new()
        };
        Self {
            base_url: self.base_url.clone(),
            transport: Arc::clone(&self.transport),
            error,
            basic_auth: self.basic_auth.clone(),
            cookies: self.cookies.clone(),
            headers: self.headers.clone(),
            timeout: self.timeout,
        }
    }
}

/// Request body after encoding.
enum Payload {
    Empty,
    Raw(Bytes),
    Encoded(Bytes, ContentType),
}

impl Payload {
    fn json<B: Serialize + ?Sized>(body: &B) -> Result<Self> {
        crate::to_json(body)
            .map(|bytes| Self::Encoded(bytes, ContentType::Json))
            .map_err(|e| e.context("marshalling JSON body"))
    }

    fn form<B: Serialize + ?Sized>(body: &B) -> Result<Self> {
        crate::to_form(body)
            .map(|bytes| Self::Encoded(bytes, ContentType::FormUrlEncoded))
            .map_err(|e| e.context("encoding form body"))
    }
}

impl<T: Transport> Client<T> {
    /// Create a client for `base_url` sending requests through `transport`.
    pub fn with_transport(base_url: impl Into<String>, transport: T) -> Self {
        Self {
            base_url: base_url.into(),
            transport: Arc::new(transport),
            error: ErrorCell::new(),
            basic_auth: None,
            cookies: None,
            headers: Headers::new(),
            timeout: Duration::ZERO,
        }
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Stop sending basic auth credentials.
    #[must_use]
    pub fn no_basic_auth(mut self) -> Self {
        if !self.error.is_set() {
            self.basic_auth = None;
        }
        self
    }

    /// Send `Authorization: Basic ...` with every request.
    #[must_use]
    pub fn use_basic_auth(mut self, user: impl AsRef<str>, password: impl AsRef<str>) -> Self {
        if !self.error.is_set() {
            let credentials = format!("{}:{}", user.as_ref(), password.as_ref());
            let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
            self.basic_auth = Some(format!("Basic {encoded}"));
        }
        self
    }

    /// Keep cookies between requests, or drop the cookie jar.
    ///
    /// Enabling always starts from an empty jar provided by the transport.
    #[must_use]
    pub fn use_cookies(mut self, enabled: bool) -> Self {
        if self.error.is_set() {
            return self;
        }
        if !enabled {
            self.cookies = None;
            return self;
        }
        match self.transport.cookie_store() {
            Ok(store) => self.cookies = Some(store),
            Err(err) => {
                self.error.set(err.context("creating cookie store"));
            }
        }
        self
    }

    /// Add a header value sent with every request. Repeated keys accumulate.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if !self.error.is_set() {
            self.headers.append(key, value);
        }
        self
    }

    /// Deadline for each request, from sending to the end of the body.
    ///
    /// `Duration::ZERO` disables it.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if !self.error.is_set() {
            self.timeout = timeout;
        }
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The sticky error, if any step failed so far.
    #[must_use]
    pub fn error(&self) -> Option<SharedError> {
        self.error.get()
    }

    /// Base URL every path is joined to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Headers sent with every request.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The cookie jar, when cookies are enabled.
    #[must_use]
    pub fn cookies(&self) -> Option<&CookieStore> {
        self.cookies.as_ref()
    }

    /// Configured request deadline; zero when disabled.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns `true` if both clients report to the same error slot.
    #[must_use]
    pub fn shares_error_with(&self, other: &Self) -> bool {
        self.error.shares_slot_with(&other.error)
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// `GET` the path.
    pub async fn get(&self, path: &str) -> ResponseInspector {
        self.send(Method::Get, path, || Ok(Payload::Empty)).await
    }

    /// `DELETE` the path.
    pub async fn delete(&self, path: &str) -> ResponseInspector {
        self.send(Method::Delete, path, || Ok(Payload::Empty)).await
    }

    /// `HEAD` the path.
    pub async fn head(&self, path: &str) -> ResponseInspector {
        self.send(Method::Head, path, || Ok(Payload::Empty)).await
    }

    /// `OPTIONS` the path.
    pub async fn options(&self, path: &str) -> ResponseInspector {
        self.send(Method::Options, path, || Ok(Payload::Empty)).await
    }

    /// `POST` `body` encoded as JSON.
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ResponseInspector {
        self.send(Method::Post, path, || Payload::json(body)).await
    }

    /// `PUT` `body` encoded as JSON.
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ResponseInspector {
        self.send(Method::Put, path, || Payload::json(body)).await
    }

    /// `PATCH` `body` encoded as JSON.
    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ResponseInspector {
        self.send(Method::Patch, path, || Payload::json(body)).await
    }

    /// `POST` without a body.
    pub async fn post_no_body(&self, path: &str) -> ResponseInspector {
        self.send(Method::Post, path, || Ok(Payload::Empty)).await
    }

    /// `PUT` without a body.
    pub async fn put_no_body(&self, path: &str) -> ResponseInspector {
        self.send(Method::Put, path, || Ok(Payload::Empty)).await
    }

    /// `PATCH` without a body.
    pub async fn patch_no_body(&self, path: &str) -> ResponseInspector {
        self.send(Method::Patch, path, || Ok(Payload::Empty)).await
    }

    /// `POST` a string body as is.
    pub async fn post_string(&self, path: &str, body: impl Into<String>) -> ResponseInspector {
        let body = Bytes::from(body.into());
        self.send(Method::Post, path, || Ok(Payload::Raw(body))).await
    }

    /// `PUT` a string body as is.
    pub async fn put_string(&self, path: &str, body: impl Into<String>) -> ResponseInspector {
        let body = Bytes::from(body.into());
        self.send(Method::Put, path, || Ok(Payload::Raw(body))).await
    }

    /// `PATCH` a string body as is.
    pub async fn patch_string(&self, path: &str, body: impl Into<String>) -> ResponseInspector {
        let body = Bytes::from(body.into());
        self.send(Method::Patch, path, || Ok(Payload::Raw(body))).await
    }

    /// `POST` raw bytes.
    pub async fn post_bytes(&self, path: &str, body: impl Into<Bytes>) -> ResponseInspector {
        let body = body.into();
        self.send(Method::Post, path, || Ok(Payload::Raw(body))).await
    }

    /// `PUT` raw bytes.
    pub async fn put_bytes(&self, path: &str, body: impl Into<Bytes>) -> ResponseInspector {
        let body = body.into();
        self.send(Method::Put, path, || Ok(Payload::Raw(body))).await
    }

    /// `PATCH` raw bytes.
    pub async fn patch_bytes(&self, path: &str, body: impl Into<Bytes>) -> ResponseInspector {
        let body = body.into();
        self.send(Method::Patch, path, || Ok(Payload::Raw(body))).await
    }

    /// `POST` `body` form URL-encoded.
    pub async fn post_form<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ResponseInspector {
        self.send(Method::Post, path, || Payload::form(body)).await
    }

    /// `PUT` `body` form URL-encoded.
    pub async fn put_form<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ResponseInspector {
        self.send(Method::Put, path, || Payload::form(body)).await
    }

    /// `PATCH` `body` form URL-encoded.
    pub async fn patch_form<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ResponseInspector {
        self.send(Method::Patch, path, || Payload::form(body)).await
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    async fn send(
        &self,
        method: Method,
        path: &str,
        payload: impl FnOnce() -> Result<Payload>,
    ) -> ResponseInspector {
        if self.error.is_set() {
            return ResponseInspector::Null;
        }

        let built = payload().and_then(|payload| self.build_request(method, path, payload));
        let request = match built {
            Ok(request) => request,
            Err(err) => {
                self.error.set(err);
                return ResponseInspector::absent(self.error.channel());
            }
        };

        let channel = self.error.channel().with_context(format!(
            "doing a {method} request to URL {:?}",
            request.url().as_str()
        ));
        let deadline = (!self.timeout.is_zero()).then(|| Instant::now() + self.timeout);

        let outcome = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, self.exchange(request))
                .await
                .unwrap_or(Err(Error::Timeout)),
            None => self.exchange(request).await,
        };

        match outcome {
            Ok(response) => ResponseInspector::read(Some(response), channel, deadline).await,
            Err(err) => {
                channel.report(err);
                ResponseInspector::absent(channel)
            }
        }
    }

    /// Send `request`, following redirects and absorbing cookies on every hop.
    async fn exchange(&self, mut request: Request) -> Result<Response> {
        let mut redirects = 0;
        loop {
            let response = self.transport.execute(request.clone()).await?;
            if let (Some(cookies), Some(headers)) = (&self.cookies, response.headers()) {
                cookies.store_response_cookies(headers);
            }

            let Some(next) = redirect::next_request(request, &response, self.cookies.as_ref())?
            else {
                return Ok(response);
            };
            if redirects == MAX_REDIRECTS {
                return Err(Error::TooManyRedirects { max: MAX_REDIRECTS });
            }
            redirects += 1;
            request = next;
        }
    }

    fn build_url(&self, path: &str) -> Result<url::Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url::Url::parse(&joined).map_err(|e| Error::from(e).context("building request URL"))
    }

    fn build_request(&self, method: Method, path: &str, payload: Payload) -> Result<Request> {
        let url = self.build_url(path)?;
        let mut builder = Request::builder(method, url);

        if let Some(credentials) = &self.basic_auth {
            builder = builder.header("Authorization", credentials.as_str());
        }
        builder = builder.headers(self.headers.iter());
        if let Some(cookie) = self.cookies.as_ref().and_then(CookieStore::cookie_header) {
            builder = builder.header("Cookie", cookie);
        }

        builder = match payload {
            Payload::Empty => builder,
            Payload::Raw(bytes) => builder.body(bytes),
            Payload::Encoded(bytes, content_type) => {
                builder.default_content_type(content_type).body(bytes)
            }
        };

        let request = builder.build();
        validate_headers(request.headers()).map_err(|e| e.context("creating request"))?;
        Ok(request)
    }
}

fn validate_headers(headers: &Headers) -> Result<()> {
    for (name, value) in headers.iter() {
        http::HeaderName::try_from(name)
            .map_err(|e| Error::invalid_request(format!("header name {name:?}: {e}")))?;
        http::HeaderValue::try_from(value)
            .map_err(|e| Error::invalid_request(format!("header {name:?} value: {e}")))?;
    }
    Ok(())
}
