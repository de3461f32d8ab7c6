//! Immutable request description.
//!
//! A [`RequestDescriptor`] records everything needed to issue one call. Each
//! `with_*` step consumes the descriptor and returns a new one, so partially
//! built descriptors can be cloned and specialized freely.
//! [`RequestDescriptor::resolve`] turns it into a wire [`Request`] without
//! performing any I/O.

use http::{HeaderMap, HeaderName, HeaderValue, header};
use url::Url;

use crate::{
    AbortSignal, Body, BodyMode, ContentType, Error, Method, QueryParams, Request, Result,
    TransportOptions, Value, form,
};

/// Everything needed to issue a single HTTP call.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    base_url: Option<Url>,
    prefix: Option<String>,
    path: String,
    queries: Vec<Value>,
    headers: HeaderMap,
    body_mode: BodyMode,
    payload: Value,
    options: TransportOptions,
    debug: bool,
}

impl RequestDescriptor {
    /// Describe a call to `path` with no base URL, headers or body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            base_url: None,
            prefix: None,
            path: path.into(),
            queries: Vec::new(),
            headers: HeaderMap::new(),
            body_mode: BodyMode::None,
            payload: Value::Null,
            options: TransportOptions::default(),
            debug: false,
        }
    }

    /// Set the base URL the path is resolved against.
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Set a path prefix, inserted between base URL and path.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Add query parameters; later values override earlier ones of the same name.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<Value>) -> Self {
        self.queries.push(query.into());
        self
    }

    /// Set a header, replacing previous values of the same name.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Overlay headers; every name present in `headers` replaces the current values.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        merge_headers(&mut self.headers, headers);
        self
    }

    /// Send `payload` as a multipart form.
    #[must_use]
    pub fn with_form(mut self, payload: impl Into<Value>) -> Self {
        self.body_mode = BodyMode::Form;
        self.payload = payload.into();
        self
    }

    /// Send `payload` as JSON.
    #[must_use]
    pub fn with_json(mut self, payload: impl Into<Value>) -> Self {
        self.body_mode = BodyMode::Json;
        self.payload = payload.into();
        self
    }

    /// Replace the transport options.
    #[must_use]
    pub fn with_options(mut self, options: TransportOptions) -> Self {
        self.options = options;
        self
    }

    /// Attach a cancellation signal, keeping the other options.
    #[must_use]
    pub fn with_signal(mut self, signal: AbortSignal) -> Self {
        self.options = self.options.with_signal(signal);
        self
    }

    /// Toggle diagnostic output.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Path, relative to base URL and prefix unless absolute.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Headers set so far.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Body mode.
    #[must_use]
    pub const fn body_mode(&self) -> BodyMode {
        self.body_mode
    }

    /// Payload; [`Value::Null`] when no body was configured.
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.payload
    }

    /// Transport options.
    #[must_use]
    pub const fn options(&self) -> &TransportOptions {
        &self.options
    }

    /// Whether diagnostics are emitted.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }

    /// Final URL: base URL, prefix and path joined, query applied.
    ///
    /// A path that is already an absolute `http(s)` URL ignores base and prefix.
    /// Queries carried by the base URL and the path are kept, in that order,
    /// and left byte for byte as they are unless a query layer was added.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the joined URL does not parse, e.g. a
    /// relative path without base URL.
    pub fn url(&self) -> Result<Url> {
        let mut url = self.join_url()?;
        if self.queries.is_empty() {
            return Ok(url);
        }

        let mut params = QueryParams::parse(url.query().unwrap_or_default());
        for query in &self.queries {
            params.encode(query, None);
        }

        if params.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&params.to_string()));
        }
        Ok(url)
    }

    fn join_url(&self) -> Result<Url> {
        if let Ok(url) = Url::parse(&self.path)
            && matches!(url.scheme(), "http" | "https")
        {
            return Ok(url);
        }

        let Some(base) = &self.base_url else {
            return Err(Error::InvalidUrl(url::ParseError::RelativeUrlWithoutBase));
        };

        let (path, path_query) = match self.path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (self.path.as_str(), None),
        };

        let mut joined = base.path().trim_end_matches('/').to_string();
        for segment in [self.prefix.as_deref().unwrap_or_default(), path] {
            let segment = segment.trim_matches('/');
            if !segment.is_empty() {
                joined.push('/');
                joined.push_str(segment);
            }
        }
        if path.ends_with('/') || joined.is_empty() {
            joined.push('/');
        }

        let query = match (base.query().filter(|q| !q.is_empty()), path_query) {
            (Some(base_query), Some(path_query)) => Some(format!("{base_query}&{path_query}")),
            (Some(base_query), None) => Some(base_query.to_string()),
            (None, path_query) => path_query.map(str::to_string),
        };

        let mut url = base.clone();
        url.set_fragment(None);
        url.set_path(&joined);
        url.set_query(query.as_deref());
        Ok(url)
    }

    /// Resolve into a wire request.
    ///
    /// GET and HEAD never carry a body. A form body drops any `Content-Type`
    /// header, the transport writes the multipart one. A JSON body defaults
    /// `Content-Type` to `application/json`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] for an unresolvable URL and
    /// [`Error::JsonSerialization`] for a JSON payload containing files.
    pub fn resolve(&self) -> Result<Request> {
        let url = self.url()?;
        let mut headers = self.headers.clone();

        let body = match self.body_mode {
            _ if !self.method.permits_body() => Body::Empty,
            BodyMode::None => Body::Empty,
            BodyMode::Form => {
                headers.remove(header::CONTENT_TYPE);
                Body::Multipart(form::encode(&self.payload).into_multipart())
            }
            BodyMode::Json => {
                let bytes = crate::to_json(&self.payload)?;
                if !headers.contains_key(header::CONTENT_TYPE) {
                    headers.insert(
                        header::CONTENT_TYPE,
                        HeaderValue::from_static(ContentType::Json.as_str()),
                    );
                }
                Body::Json(bytes)
            }
        };

        let origin = self.base_url.as_ref().unwrap_or(&url).origin();

        Ok(Request::builder(self.method, url)
            .headers(headers)
            .body(body)
            .options(self.options.clone())
            .origin(origin)
            .build())
    }
}

/// Overlay `overrides` onto `base`: each name in `overrides` replaces all of
/// its values in `base`, other names are kept.
pub fn merge_headers(base: &mut HeaderMap, overrides: HeaderMap) {
    let mut current: Option<HeaderName> = None;
    for (name, value) in overrides {
        if let Some(name) = name {
            base.remove(&name);
            current = Some(name);
        }
        if let Some(name) = &current {
            base.append(name.clone(), value);
        }
    }
}
