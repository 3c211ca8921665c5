//! Error types for assay.
//!
//! Every failure in a chain (configuration, request building, transport,
//! body reading, expectation, decoding) is an [`Error`]. The sticky cell keeps
//! the first one; the distinction between kinds lives in the variant and in
//! the rendered message.

use derive_more::{Display, Error, From};

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for assay operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// The configured request deadline elapsed.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// A response chain kept redirecting past the limit.
    #[display("stopped after {max} redirects")]
    #[from(skip)]
    TooManyRedirects {
        /// Number of redirects followed before giving up.
        max: usize,
    },

    /// Invalid request configuration (bad header name or value, bad method).
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },

    /// Form URL-encoded serialization error.
    #[display("form serialization error: {_0}")]
    #[from]
    FormSerialization(serde_html_form::ser::Error),

    /// The transport could not provide a cookie store.
    #[display("cookie store error: {_0}")]
    #[from(skip)]
    CookieStore(#[error(not(source))] String),

    /// An expectation on a response was not met.
    #[display("{_0}")]
    #[from(skip)]
    Expectation(#[error(not(source))] String),

    /// A cause annotated with the step that failed.
    #[display("{context}: {source}")]
    #[from(skip)]
    Context {
        /// Description of the failing step.
        context: String,
        /// Underlying cause.
        source: Box<Error>,
    },
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a cookie store error.
    #[must_use]
    pub fn cookie_store(message: impl Into<String>) -> Self {
        Self::CookieStore(message.into())
    }

    /// Create an expectation failure.
    #[must_use]
    pub fn expectation(message: impl Into<String>) -> Self {
        Self::Expectation(message.into())
    }

    /// Wrap this error with a description of the step that failed.
    ///
    /// ```
    /// use assay_core::Error;
    ///
    /// let err = Error::connection("refused").context("doing request");
    /// assert_eq!(err.to_string(), "doing request: connection error: refused");
    /// ```
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping every [`Error::Context`] layer.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        let mut current = self;
        while let Self::Context { source, .. } = current {
            current = source.as_ref();
        }
        current
    }

    /// Returns `true` if the root cause is a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self.root_cause(), Self::Timeout)
    }

    /// Returns `true` if the root cause is a connection error.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self.root_cause(), Self::Connection(_))
    }

    /// Returns `true` if the root cause is an unmet expectation.
    #[must_use]
    pub fn is_expectation(&self) -> bool {
        matches!(self.root_cause(), Self::Expectation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::Timeout;
        assert_eq!(err.to_string(), "request timeout");

        let err = Error::connection("failed to connect");
        assert_eq!(err.to_string(), "connection error: failed to connect");

        let err = Error::json_deserialization("user.address.city", "missing field `city`");
        assert_eq!(
            err.to_string(),
            "JSON deserialization error at 'user.address.city': missing field `city`"
        );

        let err = Error::TooManyRedirects { max: 10 };
        assert_eq!(err.to_string(), "stopped after 10 redirects");

        let err = Error::expectation("expected status code 200 but got 500");
        assert_eq!(err.to_string(), "expected status code 200 but got 500");
    }

    #[test]
    fn context_chains_render_outermost_first() {
        let err = Error::cookie_store("no backing storage")
            .context("creating cookie store")
            .context("configuring client");

        insta::assert_snapshot!(
            err.to_string(),
            @"configuring client: creating cookie store: cookie store error: no backing storage"
        );
    }

    #[test]
    fn root_cause_skips_context() {
        let err = Error::Timeout
            .context("reading response body")
            .context(r#"doing a GET request to URL "http://localhost/""#);

        assert!(matches!(err.root_cause(), Error::Timeout));
        assert!(err.is_timeout());
        assert!(!err.is_connection());
    }

    #[test]
    fn error_source_follows_context() {
        use std::error::Error as _;

        let err = Error::connection("refused").context("doing request");
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("connection error: refused"));
    }

    #[test]
    fn error_kind_predicates() {
        assert!(Error::connection("failed").is_connection());
        assert!(!Error::Timeout.is_connection());
        assert!(Error::expectation("nope").context("x").is_expectation());
        assert!(!Error::Timeout.is_expectation());
    }

    #[test]
    fn url_errors_convert() {
        let err = url::Url::parse("not a url")
            .map_err(Error::from)
            .expect_err("should fail");
        assert!(err.to_string().starts_with("invalid URL:"));
    }
}
