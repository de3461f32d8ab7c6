//! Prelude module for convenient imports.
//!
//! ```ignore
//! use courier_core::prelude::*;
//! ```

pub use crate::{
    AbortController, AbortSignal, Error, FileValue, Method, Normalized, RequestDescriptor,
    ResponseData, Result, Transport, TransportOptions, Value,
};
