//! Prelude module for convenient imports.
//!
//! ```
//! use assay_core::prelude::*;
//! ```

pub use crate::{
    Error, ErrorCell, Headers, Method, Request, Response, ResponseHead, ResponseInspector, Result,
    SharedError, Transport,
};
