//! Fluent HTTP API testing for Rust.
//!
//! Build a [`Client`] once, fire requests at an API, and chain expectations on
//! each response. Failures do not panic: the first one is kept in the client's
//! sticky error and every later call in any chain turns into a no-op, so a
//! scenario reads top to bottom and is checked once at the end.
//!
//! # Example
//!
//! ```no_run
//! use assay::prelude::*;
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct Slip {
//!     id: u64,
//!     advice: String,
//! }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let api = Client::new("https://api.example.com").with_header("api-key", "12345");
//!
//! let mut slip = Slip::default();
//! api.get("/advice/42")
//!     .await
//!     .expect_status(200)
//!     .expect_header_contains("Content-Type", "json")
//!     .parse_body(&mut slip);
//!
//! if let Some(err) = api.error() {
//!     panic!("scenario failed: {err}");
//! }
//! # }
//! ```

mod client;
mod config;
mod connector;
pub mod middleware;
pub mod prelude;
mod redirect;
mod transport;

pub use client::Client;
pub use config::{TransportConfig, TransportConfigBuilder};
pub use transport::{BoxedService, HyperTransport, HyperTransportBuilder, ServiceFuture};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use assay_core::{
    ContentType, CookieStore, Error, ErrorCell, ErrorChannel, Headers, LiveResponse, Method,
    Request, RequestBuilder, Response, ResponseBody, ResponseHead, ResponseInspector, Result,
    SharedError, StatusCode, Transport, from_json, to_form, to_json,
};
