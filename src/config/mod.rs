//! Configuration types for the Shopify bulk client.
//!
//! This module provides the configuration used to initialize clients for
//! API communication with Shopify.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`ShopifyConfig`]: Holds optional client-wide settings
//! - [`ShopifyConfigBuilder`]: A builder for constructing [`ShopifyConfig`] instances
//! - [`ShopDomain`]: A validated Shopify shop domain
//! - [`HostUrl`]: A validated host URL override, used to point clients at a
//!   proxy or a test server
//! - [`ApiVersion`]: The Shopify Admin API version to use
//!
//! # Example
//!
//! ```rust
//! use shopify_bulk::{ShopifyConfig, ApiVersion};
//!
//! let config = ShopifyConfig::builder()
//!     .api_version(ApiVersion::latest())
//!     .build();
//! ```

mod newtypes;
mod version;

pub use newtypes::{HostUrl, ShopDomain};
pub use version::ApiVersion;

/// Configuration for Shopify API clients.
///
/// Every field is optional: a default configuration targets the session's
/// shop domain on the latest stable API version. Configuration is
/// instance-based and passed explicitly; there is no global state.
///
/// # Thread Safety
///
/// `ShopifyConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
///
/// # Example
///
/// ```rust
/// use shopify_bulk::{ShopifyConfig, ApiVersion, HostUrl};
///
/// let config = ShopifyConfig::builder()
///     .api_version(ApiVersion::V2024_10)
///     .host(HostUrl::new("https://proxy.example.com").unwrap())
///     .user_agent_prefix("MyApp/1.0")
///     .build();
///
/// assert_eq!(config.api_version(), &ApiVersion::V2024_10);
/// ```
#[derive(Clone, Debug)]
pub struct ShopifyConfig {
    host: Option<HostUrl>,
    api_version: ApiVersion,
    user_agent_prefix: Option<String>,
}

impl ShopifyConfig {
    /// Creates a new builder for constructing a `ShopifyConfig`.
    #[must_use]
    pub fn builder() -> ShopifyConfigBuilder {
        ShopifyConfigBuilder::new()
    }

    /// Returns the host URL override, if configured.
    ///
    /// When set, clients send requests to this host instead of the
    /// session's shop domain, keeping the shop in the `Host` header.
    #[must_use]
    pub const fn host(&self) -> Option<&HostUrl> {
        self.host.as_ref()
    }

    /// Returns the API version.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

impl Default for ShopifyConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

// Verify ShopifyConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ShopifyConfig>();
};

/// Builder for constructing [`ShopifyConfig`] instances.
///
/// # Defaults
///
/// - `api_version`: Latest stable version
/// - `host`: `None` (requests go to the session's shop domain)
/// - `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct ShopifyConfigBuilder {
    host: Option<HostUrl>,
    api_version: Option<ApiVersion>,
    user_agent_prefix: Option<String>,
}

impl ShopifyConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the host URL override.
    #[must_use]
    pub fn host(mut self, host: HostUrl) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets the API version.
    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`ShopifyConfig`].
    ///
    /// Construction cannot fail; invalid values are rejected earlier, when
    /// the individual newtypes are created.
    #[must_use]
    pub fn build(self) -> ShopifyConfig {
        ShopifyConfig {
            host: self.host,
            api_version: self.api_version.unwrap_or_else(ApiVersion::latest),
            user_agent_prefix: self.user_agent_prefix,
        }
    }
}
