//! Core types for assay, a fluent HTTP API testing client.
//!
//! This crate holds everything that does not touch the network:
//! - [`Error`] and [`Result`] - error handling, with step context
//! - [`ErrorCell`] and [`ErrorChannel`] - the sticky, first-error-wins state
//! - [`ResponseInspector`] - chainable expectations over a response
//! - [`Transport`] - the seam a client sends requests through
//! - [`Request`], [`Response`], [`Headers`], [`Method`] - plain HTTP values
//! - [`CookieStore`] - cookie jar for clients that enable cookies
//! - [`StatusCode`] - HTTP status codes (re-exported from `http` crate)

mod body;
mod cookies;
mod error;
mod headers;
mod inspector;
mod method;
pub mod prelude;
mod request;
mod response;
mod sticky;
mod transport;

pub use body::{ContentType, from_json, to_form, to_json};
pub use cookies::CookieStore;
pub use error::{Error, Result};
pub use headers::Headers;
pub use inspector::{LiveResponse, ResponseInspector};
pub use method::Method;
pub use request::{Request, RequestBuilder};
pub use response::{Response, ResponseBody, ResponseHead};
pub use sticky::{ErrorCell, ErrorChannel, SharedError};
pub use transport::Transport;

// Re-export http crate types for status codes
pub use http::StatusCode;
