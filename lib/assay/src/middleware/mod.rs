//! Tower middleware layers for [`HyperTransport`](crate::HyperTransport).
//!
//! Layers wrap the hyper service and see every request a client sends,
//! together with the response head before its body is read.
//!
//! - [`LoggingLayer`] - Logs requests and outcomes using `tracing`
//!
//! Any other tower layer whose service speaks `Request<Bytes>` to
//! [`Response`](crate::Response) can be added through
//! [`HyperTransportBuilder::layer`](crate::HyperTransportBuilder::layer).

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
