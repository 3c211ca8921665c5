//! Prelude module for convenient imports.
//!
//! ```
//! use assay::prelude::*;
//! ```

pub use crate::{
    Client, Error, Headers, HyperTransport, Method, ResponseHead, ResponseInspector, Result,
    SharedError, StatusCode, Transport,
};
pub use serde::{Deserialize, Serialize};
