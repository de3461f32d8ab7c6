//! Per-call transport options.
//!
//! These are passed through the executor untouched; the transport decides how
//! to honor them. Defaults are conservative: credentials only for the same
//! origin, redirects followed, referrer reduced to the origin across origins.

use url::Url;

use crate::AbortSignal;

/// When to send credentials (`Authorization`, `Cookie`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Credentials {
    /// Never send credentials.
    Omit,
    /// Send credentials only to the origin the request started from.
    #[default]
    SameOrigin,
    /// Always send credentials.
    Include,
}

/// Which targets a request may reach.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RequestMode {
    /// Any origin.
    #[default]
    Cors,
    /// Any origin, without cross-origin negotiation.
    NoCors,
    /// Only the origin the request started from.
    SameOrigin,
}

/// What to do with 3xx redirect responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RedirectPolicy {
    /// Follow redirects transparently.
    #[default]
    Follow,
    /// Fail with [`Error::RedirectNotAllowed`](crate::Error::RedirectNotAllowed).
    Error,
    /// Return the redirect response as-is.
    Manual,
}

/// How much of the referrer URL to disclose in the `Referer` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReferrerPolicy {
    /// Never send a referrer.
    NoReferrer,
    /// Full URL, except when downgrading from https to http.
    NoReferrerWhenDowngrade,
    /// Origin only.
    Origin,
    /// Full URL for the same origin, origin only otherwise.
    OriginWhenCrossOrigin,
    /// Full URL for the same origin, nothing otherwise.
    SameOrigin,
    /// Origin only, nothing when downgrading.
    StrictOrigin,
    /// Full URL for the same origin, origin only otherwise, nothing when downgrading.
    #[default]
    StrictOriginWhenCrossOrigin,
    /// Always the full URL.
    UnsafeUrl,
}

impl ReferrerPolicy {
    /// The `Referer` header value for a request from `referrer` to `target`.
    #[must_use]
    pub fn referer(self, referrer: &Url, target: &Url) -> Option<String> {
        let same_origin = referrer.origin() == target.origin();
        let downgrade = referrer.scheme() == "https" && target.scheme() != "https";

        match self {
            Self::NoReferrer => None,
            Self::UnsafeUrl => Some(stripped(referrer)),
            Self::NoReferrerWhenDowngrade => (!downgrade).then(|| stripped(referrer)),
            Self::Origin => Some(origin_only(referrer)),
            Self::OriginWhenCrossOrigin if same_origin => Some(stripped(referrer)),
            Self::OriginWhenCrossOrigin => Some(origin_only(referrer)),
            Self::SameOrigin => same_origin.then(|| stripped(referrer)),
            Self::StrictOrigin => (!downgrade).then(|| origin_only(referrer)),
            Self::StrictOriginWhenCrossOrigin if same_origin => Some(stripped(referrer)),
            Self::StrictOriginWhenCrossOrigin => (!downgrade).then(|| origin_only(referrer)),
        }
    }
}

/// URL without credentials or fragment.
fn stripped(url: &Url) -> String {
    let mut url = url.clone();
    // Only fails for cannot-be-a-base URLs, which carry no credentials anyway.
    let _ = url.set_username("");
    let _ = url.set_password(None);
    url.set_fragment(None);
    url.to_string()
}

fn origin_only(url: &Url) -> String {
    format!("{}/", url.origin().ascii_serialization())
}

/// Cache directive forwarded to the transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CacheDirective {
    /// Let the transport decide.
    #[default]
    Default,
    /// Do not store the response.
    NoStore,
    /// Bypass caches on the way out.
    Reload,
    /// Revalidate with the server.
    NoCache,
}

impl CacheDirective {
    /// The `Cache-Control` request header this directive maps to, if any.
    #[must_use]
    pub const fn cache_control(self) -> Option<&'static str> {
        match self {
            Self::Default => None,
            Self::NoStore => Some("no-store"),
            Self::Reload | Self::NoCache => Some("no-cache"),
        }
    }
}

/// Options forwarded verbatim to the transport.
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    signal: Option<AbortSignal>,
    credentials: Credentials,
    mode: RequestMode,
    redirect: RedirectPolicy,
    referrer: Option<Url>,
    referrer_policy: ReferrerPolicy,
    cache: CacheDirective,
}

impl TransportOptions {
    /// Options with conservative defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a cancellation signal.
    #[must_use]
    pub fn with_signal(mut self, signal: AbortSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Set the credentials mode.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set the request mode.
    #[must_use]
    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the redirect policy.
    #[must_use]
    pub fn with_redirect(mut self, redirect: RedirectPolicy) -> Self {
        self.redirect = redirect;
        self
    }

    /// Set the referrer URL.
    #[must_use]
    pub fn with_referrer(mut self, referrer: Url) -> Self {
        self.referrer = Some(referrer);
        self
    }

    /// Set the referrer policy.
    #[must_use]
    pub fn with_referrer_policy(mut self, policy: ReferrerPolicy) -> Self {
        self.referrer_policy = policy;
        self
    }

    /// Set the cache directive.
    #[must_use]
    pub fn with_cache(mut self, cache: CacheDirective) -> Self {
        self.cache = cache;
        self
    }

    /// Cancellation signal.
    #[must_use]
    pub const fn signal(&self) -> Option<&AbortSignal> {
        self.signal.as_ref()
    }

    /// Credentials mode.
    #[must_use]
    pub const fn credentials(&self) -> Credentials {
        self.credentials
    }

    /// Request mode.
    #[must_use]
    pub const fn mode(&self) -> RequestMode {
        self.mode
    }

    /// Redirect policy.
    #[must_use]
    pub const fn redirect(&self) -> RedirectPolicy {
        self.redirect
    }

    /// Referrer URL.
    #[must_use]
    pub const fn referrer(&self) -> Option<&Url> {
        self.referrer.as_ref()
    }

    /// Referrer policy.
    #[must_use]
    pub const fn referrer_policy(&self) -> ReferrerPolicy {
        self.referrer_policy
    }

    /// Cache directive.
    #[must_use]
    pub const fn cache(&self) -> CacheDirective {
        self.cache
    }
}
