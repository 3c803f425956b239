//! # Shopify Bulk
//!
//! A Rust client for the Shopify Admin GraphQL API centered on the
//! asynchronous bulk-operation subsystem: staged uploads, bulk query and
//! mutation submission, status polling against the global per-kind slot,
//! and streaming JSONL results.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`ShopifyConfig`] and validated newtypes
//! - Session management for authenticated API calls
//! - An async HTTP client with retry logic and rate limit handling
//! - A GraphQL client for the Admin API ([`GraphqlClient`])
//! - The bulk-operation lifecycle client ([`BulkOperationsClient`])
//! - Throttled fan-out for multi-item requests ([`throttle`])
//! - Convenience helpers for orders, products, and metafields
//!   ([`resources`])
//!
//! ## Quick Start
//!
//! ```rust
//! use shopify_bulk::{Session, ShopDomain, ShopifyConfig, ApiVersion};
//!
//! // Sessions carry the shop and access token for every client
//! let session = Session::new(
//!     "session-id".to_string(),
//!     ShopDomain::new("my-store").unwrap(),
//!     "access-token".to_string(),
//!     None,
//! );
//!
//! // Configuration is optional; defaults target the latest API version
//! let config = ShopifyConfig::builder()
//!     .api_version(ApiVersion::latest())
//!     .build();
//! ```
//!
//! ## Running a Bulk Query
//!
//! ```rust,ignore
//! use shopify_bulk::{BulkOperationsClient, Session, ShopDomain};
//!
//! let client = BulkOperationsClient::new(&session, None);
//!
//! let download = client
//!     .run_query_to_completion(
//!         "{ products { edges { node { id title } } } }",
//!         None,
//!     )
//!     .await?;
//!
//! let mut lines = download.into_lines();
//! while let Some(line) = lines.next_line().await? {
//!     let record: serde_json::Value = serde_json::from_str(&line)?;
//!     // one JSON record per line
//! }
//! ```
//!
//! ## Running a Bulk Mutation
//!
//! ```rust,ignore
//! use shopify_bulk::{BulkOperationsClient, BulkRequest};
//!
//! // One variables object per line
//! let jsonl = "{\"input\":{\"title\":\"First\"}}\n{\"input\":{\"title\":\"Second\"}}\n";
//!
//! let download = client
//!     .run_to_completion(
//!         BulkRequest::mutation(
//!             shopify_bulk::resources::products::PRODUCT_CREATE_MUTATION,
//!             jsonl,
//!         ),
//!         None,
//!     )
//!     .await?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: All newtypes validate on construction
//! - **Thread-safe**: All clients are `Send + Sync`
//! - **Async-first**: Designed for use with the Tokio runtime
//! - **Parameterized requests**: Values travel as GraphQL variables, never
//!   interpolated into request text
//!
//! ## Operational Notes
//!
//! The "current bulk operation" slot is a single global resource per shop
//! and operation kind, owned by the platform. The orchestrator always
//! confirms the slot is idle before submitting, but it cannot fence out
//! other processes: deploy a single submitter per shop.

pub mod clients;
pub mod config;
pub mod error;
pub mod resources;
pub mod session;
pub mod throttle;

// Re-export public types at crate root for convenience
pub use config::{ApiVersion, HostUrl, ShopDomain, ShopifyConfig, ShopifyConfigBuilder};
pub use error::ConfigError;
pub use session::Session;

// Re-export HTTP client types
pub use clients::{
    ApiCallLimit, DataType, HttpClient, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder,
    HttpResponse, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};

// Re-export GraphQL client types
pub use clients::{GraphqlClient, GraphqlError};

// Re-export the bulk-operation lifecycle types
pub use clients::bulk::{
    BulkOperation, BulkOperationError, BulkOperationKind, BulkOperationStatus,
    BulkOperationsClient, BulkRequest, BulkResultDownload, BulkRunOptions, JsonlLines,
    MalformedRequestError, NegotiationError, ResultStreamError, StagedUploadInput,
    StagedUploadParameter, StagedUploadTarget, UploadError, UserError,
};
