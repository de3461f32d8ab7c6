//! Core types for courier, a fluent HTTP request builder.
//!
//! This crate is transport-agnostic. It provides:
//! - [`Value`] - the nested payload model, with [`FileValue`] leaves
//! - [`form`] and [`QueryParams`] - nested value encoders
//! - [`RequestDescriptor`] - immutable description of one call
//! - [`Request`] and [`Response`] - wire request and buffered response
//! - [`Transport`] - the trait a network backend implements
//! - [`execute`] - resolve, send, and [`decode`] into a [`Normalized`] result
//! - [`AbortController`] and [`AbortSignal`] - cooperative cancellation
//! - [`Error`] and [`Result`] - error handling
//! - [`StatusCode`] and [`header`] - re-exported from `http`

mod body;
mod decode;
mod descriptor;
mod error;
mod executor;
pub mod form;
mod method;
mod multipart;
mod options;
pub mod prelude;
mod query;
mod request;
mod response;
mod signal;
mod transport;
mod value;

pub use body::{Body, BodyMode, ContentType, from_json, to_json};
pub use decode::{Normalized, ResponseData, decode};
pub use descriptor::{RequestDescriptor, merge_headers};
pub use error::{Error, ErrorBody, ErrorKind, HttpFailure, Result};
pub use executor::{DEBUG_TARGET, execute};
pub use form::{EncodedForm, FormField, FormValue};
pub use method::Method;
pub use multipart::{Form, Part};
pub use options::{
    CacheDirective, Credentials, RedirectPolicy, ReferrerPolicy, RequestMode, TransportOptions,
};
pub use query::{QueryParams, encode_query};
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use signal::{AbortController, AbortSignal};
pub use transport::Transport;
pub use value::{FileValue, Map, Value};

// Re-export http crate types for status codes and headers
pub use http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header};
