//! Fluent HTTP request builder.
//!
//! Configure a [`Client`] once, then chain per-request settings and send:
//!
//! ```ignore
//! use courier::prelude::*;
//! use serde_json::json;
//!
//! #[derive(Debug, Deserialize)]
//! pub struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! let client = Client::builder()
//!     .base_url("https://api.example.com")
//!     .prefix("/v1")
//!     .build()?;
//!
//! let user = client
//!     .get("/users/42")
//!     .query_value(json!({"expand": ["teams"]}))
//!     .send_json::<User>()
//!     .await?;
//! println!("{} -> {:?}", user.status_code, user.data);
//! ```
//!
//! Every response with a status outside `200..=299` becomes
//! [`Error::Http`], carrying the status and the decoded error body.
//! Requests go through a [`HyperTransport`] by default; any
//! [`Transport`] can be plugged in with [`ClientBuilder::build_with`].

mod client;
mod config;
mod connector;
pub mod middleware;
pub mod prelude;
mod transport;

pub use client::{Client, ClientBuilder, PendingRequest};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_MAX_REDIRECTS};
pub use transport::{BoxedService, HyperTransport, HyperTransportBuilder, ServiceFuture};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use courier_core::{
    AbortController, AbortSignal, Body, BodyMode, CacheDirective, ContentType, Credentials, Error,
    ErrorBody, ErrorKind, FileValue, Form, HttpFailure, Map, Method, Normalized, Part,
    RedirectPolicy, ReferrerPolicy, Request, RequestBuilder, RequestDescriptor, RequestMode,
    Response, ResponseData, Result, Transport, TransportOptions, Value, decode, execute, form,
    from_json, to_json,
};

// Re-export http types for status codes and headers
pub use courier_core::{HeaderMap, HeaderName, HeaderValue, StatusCode, header};

pub use url;
