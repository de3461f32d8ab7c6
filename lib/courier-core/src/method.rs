//! HTTP methods a descriptor can carry.

use derive_more::Display;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Method {
    /// Retrieve a resource. Never carries a body.
    #[display("GET")]
    Get,
    /// Create a resource.
    #[display("POST")]
    Post,
    /// Replace a resource.
    #[display("PUT")]
    Put,
    /// Remove a resource.
    #[display("DELETE")]
    Delete,
    /// Partially update a resource.
    #[display("PATCH")]
    Patch,
    /// Like GET, headers only. Never carries a body.
    #[display("HEAD")]
    Head,
    /// Describe the communication options of a resource.
    #[display("OPTIONS")]
    Options,
}

impl Method {
    /// Whether a request body may be sent with this method.
    ///
    /// GET and HEAD drop any configured payload.
    #[must_use]
    pub const fn permits_body(&self) -> bool {
        !matches!(self, Self::Get | Self::Head)
    }

    /// Whether a 301/302 redirect rewrites this method to GET.
    ///
    /// Mirrors what browsers do; a 303 always switches to GET.
    #[must_use]
    pub const fn downgrades_on_redirect(&self) -> bool {
        matches!(self, Self::Post)
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
            Method::Patch => Self::PATCH,
            Method::Head => Self::HEAD,
            Method::Options => Self::OPTIONS,
        }
    }
}

impl TryFrom<http::Method> for Method {
    type Error = crate::Error;

    fn try_from(method: http::Method) -> Result<Self, Self::Error> {
        match method {
            http::Method::GET => Ok(Self::Get),
            http::Method::POST => Ok(Self::Post),
            http::Method::PUT => Ok(Self::Put),
            http::Method::DELETE => Ok(Self::Delete),
            http::Method::PATCH => Ok(Self::Patch),
            http::Method::HEAD => Ok(Self::Head),
            http::Method::OPTIONS => Ok(Self::Options),
            other => Err(crate::Error::InvalidRequest(format!(
                "unsupported HTTP method: {other}"
            ))),
        }
    }
}
