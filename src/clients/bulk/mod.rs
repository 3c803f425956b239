//! Asynchronous bulk-operation support for the Shopify Admin API.
//!
//! Bulk operations let the platform run a GraphQL query or mutation over
//! an arbitrarily large dataset server-side, tracked through a single
//! global per-kind status slot and delivered as a JSONL file. This module
//! implements the whole client-side lifecycle:
//!
//! - [`BulkOperationsClient`]: staging uploads, submitting jobs, polling
//!   the slot, and orchestrating a request to completion
//! - [`BulkRequest`]: the query-or-mutation request consumed by the
//!   orchestrator
//! - [`BulkResultDownload`] / [`JsonlLines`]: lazy, streaming access to
//!   the result file
//! - [`BulkOperationError`]: the error taxonomy of the lifecycle
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_bulk::{BulkOperationsClient, Session, ShopDomain};
//!
//! let session = Session::new(
//!     "session-id".to_string(),
//!     ShopDomain::new("my-store").unwrap(),
//!     "access-token".to_string(),
//!     None,
//! );
//! let client = BulkOperationsClient::new(&session, None);
//!
//! let download = client
//!     .run_query_to_completion(
//!         "{ productVariants { edges { node { id sku } } } }",
//!         None,
//!     )
//!     .await?;
//!
//! let mut lines = download.into_lines();
//! while let Some(line) = lines.next_line().await? {
//!     println!("{line}");
//! }
//! ```

mod client;
mod errors;
mod result;
mod types;
mod upload;

pub(crate) use types::join_messages;

pub use client::{BulkOperationsClient, BulkRunOptions, DEFAULT_POLL_INTERVAL};
pub use errors::{BulkOperationError, MalformedRequestError, NegotiationError, UploadError};
pub use result::{BulkResultDownload, JsonlLines, ResultStreamError};
pub use types::{
    BulkOperation, BulkOperationKind, BulkOperationStatus, BulkRequest, StagedUploadInput,
    StagedUploadParameter, StagedUploadTarget, UserError,
};
