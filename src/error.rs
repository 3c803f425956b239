//! Configuration error types.
//!
//! All configuration newtypes return `Result<T, ConfigError>` from their
//! constructors to enable fail-fast validation. Error messages are designed
//! to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use shopify_bulk::{ConfigError, ShopDomain};
//!
//! let result = ShopDomain::new("not a shop!");
//! assert!(matches!(result, Err(ConfigError::InvalidShopDomain { .. })));
//! ```

use thiserror::Error;

/// Errors that can occur while validating configuration values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Shop domain is invalid.
    #[error("Invalid shop domain '{domain}'. Expected format: 'shop-name' or 'shop-name.myshopify.com'.")]
    InvalidShopDomain {
        /// The invalid domain that was provided.
        domain: String,
    },

    /// API version is invalid.
    #[error("Invalid API version '{version}'. Expected format: 'YYYY-MM' (e.g., '2025-01') or 'unstable'.")]
    InvalidApiVersion {
        /// The invalid version string that was provided.
        version: String,
    },

    /// Host URL is invalid.
    #[error("Invalid host URL '{url}'. Please provide a valid URL with scheme (e.g., 'https://proxy.example.com').")]
    InvalidHostUrl {
        /// The invalid URL that was provided.
        url: String,
    },
}
