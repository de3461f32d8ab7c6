//! Resolved wire requests.
//!
//! A [`Request`] is what the executor hands to a [`Transport`](crate::Transport):
//! final URL, merged headers, encoded body and the caller's transport options.
//!
//! # Example
//!
//! ```
//! use courier_core::{Body, Method, Request};
//! use bytes::Bytes;
//!
//! let request = Request::builder(Method::Post, "https://api.example.com/users".parse().unwrap())
//!     .header(http::header::ACCEPT, http::HeaderValue::from_static("application/json"))
//!     .body(Body::Json(Bytes::from_static(b"{}")))
//!     .build();
//! assert_eq!(request.header("accept"), Some("application/json"));
//! ```

use http::{HeaderMap, HeaderName, HeaderValue};
use url::{Origin, Url};

use crate::{Body, Method, TransportOptions};

/// A fully resolved HTTP request.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Body,
    options: TransportOptions,
    origin: Origin,
}

impl Request {
    /// Creates a new [`RequestBuilder`].
    #[must_use]
    pub fn builder(method: Method, url: Url) -> RequestBuilder {
        RequestBuilder::new(method, url)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL, query included.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to headers.
    #[must_use]
    pub const fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// First value of a header, if it is visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Transport options.
    #[must_use]
    pub const fn options(&self) -> &TransportOptions {
        &self.options
    }

    /// Origin the request was issued from.
    ///
    /// Credentials and request mode are checked against it, including on
    /// every redirect hop.
    #[must_use]
    pub const fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Whether the URL targets the origin the request was issued from.
    #[must_use]
    pub fn is_same_origin(&self) -> bool {
        self.url.origin() == self.origin
    }

    /// Point the request at another URL, keeping its origin.
    pub fn set_url(&mut self, url: Url) {
        self.url = url;
    }

    /// Replace method and body, e.g. when a redirect switches to GET.
    pub fn set_method(&mut self, method: Method, body: Body) {
        self.method = method;
        self.body = body;
    }

    /// Consume into (method, url, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, Url, HeaderMap, Body) {
        (self.method, self.url, self.headers, self.body)
    }
}

/// Builder for constructing [`Request`] instances.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Body,
    options: TransportOptions,
    origin: Option<Origin>,
}

impl RequestBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: Body::Empty,
            options: TransportOptions::default(),
            origin: None,
        }
    }

    /// Sets a header, replacing previous values of the same name.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replaces all headers.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    /// Sets the transport options.
    #[must_use]
    pub fn options(mut self, options: TransportOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the issuing origin. Defaults to the origin of the URL.
    #[must_use]
    pub fn origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request {
        let origin = self.origin.unwrap_or_else(|| self.url.origin());
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
            options: self.options,
            origin,
        }
    }
}
