//! Client configuration types.

use std::time::Duration;

use courier_core::HeaderMap;
use url::Url;

/// Default maximum number of redirects followed per request.
pub const DEFAULT_MAX_REDIRECTS: usize = 20;

/// Configuration for the [`Client`](crate::Client) and its transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every relative path is resolved against.
    pub base_url: Option<Url>,
    /// Path prefix inserted between base URL and path.
    pub prefix: Option<String>,
    /// Headers sent with every request, overridable per request.
    pub default_headers: HeaderMap,
    /// Emit per-request diagnostics under the `courier::debug` target.
    pub debug: bool,
    /// Connection timeout duration.
    pub connect_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_idle_per_host: usize,
    /// Idle connection timeout.
    pub pool_idle_timeout: Duration,
    /// Maximum redirects followed under [`RedirectPolicy::Follow`](courier_core::RedirectPolicy::Follow).
    pub max_redirects: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            prefix: None,
            default_headers: HeaderMap::new(),
            debug: false,
            connect_timeout: Duration::from_secs(10),
            pool_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<Url>,
    prefix: Option<String>,
    default_headers: HeaderMap,
    debug: Option<bool>,
    connect_timeout: Option<Duration>,
    pool_idle_per_host: Option<usize>,
    pool_idle_timeout: Option<Duration>,
    max_redirects: Option<usize>,
}

impl ClientConfigBuilder {
    /// Set the base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Set the path prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Add default headers; names already present are replaced.
    #[must_use]
    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        courier_core::merge_headers(&mut self.default_headers, headers);
        self
    }

    /// Enable or disable diagnostics.
    #[must_use]
    pub const fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub const fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.pool_idle_per_host = Some(count);
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub const fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Set the maximum number of redirects to follow.
    #[must_use]
    pub const fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = Some(max);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            base_url: self.base_url,
            prefix: self.prefix,
            default_headers: self.default_headers,
            debug: self.debug.unwrap_or(defaults.debug),
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            pool_idle_per_host: self
                .pool_idle_per_host
                .unwrap_or(defaults.pool_idle_per_host),
            pool_idle_timeout: self.pool_idle_timeout.unwrap_or(defaults.pool_idle_timeout),
            max_redirects: self.max_redirects.unwrap_or(defaults.max_redirects),
        }
    }
}
