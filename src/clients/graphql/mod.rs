//! GraphQL client for the Shopify Admin API.
//!
//! The Admin GraphQL API is the transport every higher-level component in
//! this crate builds on: the bulk-operation client registers and polls jobs
//! through it, and the resource helpers issue their queries and mutations
//! through it.

mod client;
mod errors;

pub use client::GraphqlClient;
pub use errors::GraphqlError;
