//! Transport seam between the client and the network.
//!
//! A [`Transport`] performs one request and hands back a [`Response`] whose
//! body has not been read yet. The client never retries; neither should a
//! transport.

use std::future::Future;

use bytes::Bytes;

use crate::{CookieStore, Request, Response, Result};

/// HTTP execution capability used by the client.
///
/// Implement this trait to plug a different HTTP stack, or a scripted double
/// in tests.
///
/// # Example
///
/// ```
/// use assay_core::{Request, Response, Result, Transport};
/// use bytes::Bytes;
///
/// struct AlwaysTeapot;
///
/// impl Transport for AlwaysTeapot {
///     async fn execute(&self, _request: Request<Bytes>) -> Result<Response> {
///         Ok(Response::buffered(418, None, "short and stout"))
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    /// Perform exactly one request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be completed:
    /// - Network errors
    /// - TLS errors
    /// - Invalid request
    fn execute(&self, request: Request<Bytes>) -> impl Future<Output = Result<Response>> + Send;

    /// Create a fresh cookie store for a client that enables cookies.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot provide cookie storage.
    fn cookie_store(&self) -> Result<CookieStore> {
        Ok(CookieStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Method;

    struct Echo;

    impl Transport for Echo {
        async fn execute(&self, request: Request<Bytes>) -> Result<Response> {
            let body = request.body().cloned().unwrap_or_default();
            Ok(Response::buffered(200, Some(request.headers().clone()), body))
        }
    }

    #[tokio::test]
    async fn default_cookie_store_is_empty() {
        let store = Echo.cookie_store().expect("store");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn transport_returns_unread_response() {
        let url = url::Url::parse("http://localhost/echo").expect("url");
        let request = Request::builder(Method::Post, url)
            .header("X-Echo", "yes")
            .body(Bytes::from_static(b"ping"))
            .build();

        let response = Echo.execute(request).await.expect("response");
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers().and_then(|h| h.get("x-echo")),
            Some("yes")
        );
    }
}
