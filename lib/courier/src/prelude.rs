//! Prelude module for convenient imports.
//!
//! ```ignore
//! use courier::prelude::*;
//! ```

pub use crate::{
    AbortController, AbortSignal, Client, ClientConfig, Error, FileValue, HeaderMap, HttpFailure,
    Method, Normalized, ResponseData, Result, StatusCode, Transport, TransportOptions, Value,
    header,
};
pub use serde::{Deserialize, Serialize};
