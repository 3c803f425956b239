//! Client types for Shopify API communication.
//!
//! This module provides the layered clients the crate is built from:
//!
//! - [`HttpClient`]: the async HTTP transport with retry handling
//! - [`HttpRequest`] / [`HttpResponse`]: request construction and parsed
//!   responses, including Shopify-specific headers
//! - [`graphql::GraphqlClient`]: the Admin GraphQL API client
//! - [`bulk::BulkOperationsClient`]: the bulk-operation lifecycle client
//!
//! # Retry Behavior
//!
//! The transport retries transient failures when a request opts in via
//! `tries`:
//!
//! - **429 (Rate Limited)**: retried after the `Retry-After` header value,
//!   or 1 second if not present
//! - **500 (Server Error)**: retried with a fixed 1-second delay
//! - **Other errors (4xx)**: returned immediately without retry
//!
//! The default `tries` is 1, meaning no automatic retries.

pub mod bulk;
mod errors;
pub mod graphql;
mod http_client;
mod http_request;
mod http_response;

pub use errors::{
    HttpError, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{DataType, HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::{ApiCallLimit, HttpResponse};

// Re-export the higher-level clients at the clients module level
pub use bulk::{BulkOperationsClient, BulkRequest};
pub use graphql::{GraphqlClient, GraphqlError};
