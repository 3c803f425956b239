//! Error types for the bulk-operation lifecycle.
//!
//! Every layer fails fast and propagates upward unchanged: there is no
//! local recovery or automatic retry in this module. The only wait built in
//! is the idle-polling loop, which waits on a known-pending operation
//! rather than retrying a failed one. Callers own retry policy for
//! transient transport errors.

use std::time::Duration;

use thiserror::Error;

use crate::clients::bulk::types::{join_messages, BulkOperationStatus, UserError};
use crate::clients::graphql::GraphqlError;
use crate::clients::HttpError;

/// Error returned when staged-upload negotiation yields no usable target.
///
/// Raised when the platform answers `stagedUploadsCreate` with an empty
/// target list. Distinct from a transport failure: the request itself
/// succeeded.
#[derive(Debug, Error)]
#[error("staged upload negotiation returned no target: {}", join_messages(.user_errors))]
pub struct NegotiationError {
    /// Any user errors the platform attached to the refusal.
    pub user_errors: Vec<UserError>,
}

/// Error returned when the JSONL upload to the staged target fails.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The upload POST returned a non-success HTTP status.
    #[error("staged upload failed with HTTP status {code}")]
    Status {
        /// The HTTP status code of the upload response.
        code: u16,
    },

    /// The upload response parsed but carried no storage object key.
    ///
    /// Checked explicitly: a 2xx status alone does not prove the storage
    /// target accepted the file.
    #[error("staged upload response did not contain a storage key")]
    MissingKey,

    /// The XML response body could not be parsed.
    #[error("failed to parse staged upload response: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A network error occurred while uploading.
    #[error("network error during staged upload: {0}")]
    Network(#[from] reqwest::Error),
}

/// Error returned when the platform accepted the call but created no
/// operation.
///
/// Signals a bad mutation or query string (the text is not validated
/// client-side, so syntax errors surface only here), not a transient
/// fault. Retrying the same request will fail the same way.
#[derive(Debug, Error)]
#[error("platform rejected the bulk request: {}", join_messages(.user_errors))]
pub struct MalformedRequestError {
    /// The user errors explaining the rejection.
    pub user_errors: Vec<UserError>,
}

/// Unified error type for the bulk-operation lifecycle.
#[derive(Debug, Error)]
pub enum BulkOperationError {
    /// A transport-level failure (network, non-2xx response, retry
    /// exhaustion) on any of the GraphQL calls or the result download.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The platform answered with GraphQL execution errors and no data.
    #[error("GraphQL execution errors: {}", .messages.join("; "))]
    Graphql {
        /// The error messages from the response's `errors` array.
        messages: Vec<String>,
    },

    /// Staged-upload negotiation returned no target.
    #[error(transparent)]
    Negotiation(#[from] NegotiationError),

    /// The JSONL upload failed.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// The platform accepted the call but returned no operation.
    #[error(transparent)]
    MalformedRequest(#[from] MalformedRequestError),

    /// An operation was created but not in the expected initial state.
    #[error("bulk operation was created with unexpected status {status}")]
    SubmissionRejected {
        /// The status the fresh operation reported instead of `CREATED`.
        status: BulkOperationStatus,
    },

    /// The operation settled without producing a result URL.
    #[error("bulk operation finished with status {status} but produced no result URL")]
    MissingResult {
        /// The terminal status the operation settled in.
        status: BulkOperationStatus,
    },

    /// The result-file download returned a non-success HTTP status.
    #[error("result download failed with HTTP status {code}")]
    Fetch {
        /// The HTTP status code of the download response.
        code: u16,
    },

    /// The slot stayed busy past the caller's deadline.
    #[error("bulk operation still busy after waiting {:?}", .waited)]
    PollTimeout {
        /// How long the poller waited before giving up.
        waited: Duration,
    },

    /// The response did not have the expected shape.
    #[error("unexpected response shape: {0}")]
    UnexpectedResponse(String),
}

impl From<GraphqlError> for BulkOperationError {
    fn from(error: GraphqlError) -> Self {
        match error {
            GraphqlError::Http(e) => Self::Http(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_errors() -> Vec<UserError> {
        vec![UserError {
            field: Some(vec!["mutation".to_string()]),
            message: "Invalid mutation string".to_string(),
        }]
    }

    #[test]
    fn test_negotiation_error_lists_user_errors() {
        let error = NegotiationError {
            user_errors: user_errors(),
        };
        assert!(error.to_string().contains("Invalid mutation string"));
    }

    #[test]
    fn test_malformed_request_error_lists_user_errors() {
        let error = MalformedRequestError {
            user_errors: user_errors(),
        };
        let message = error.to_string();
        assert!(message.contains("rejected"));
        assert!(message.contains("Invalid mutation string"));
    }

    #[test]
    fn test_upload_error_messages() {
        assert_eq!(
            UploadError::Status { code: 403 }.to_string(),
            "staged upload failed with HTTP status 403"
        );
        assert!(UploadError::MissingKey.to_string().contains("storage key"));
    }

    #[test]
    fn test_missing_result_names_terminal_status() {
        let error = BulkOperationError::MissingResult {
            status: BulkOperationStatus::Failed,
        };
        assert!(error.to_string().contains("FAILED"));
    }

    #[test]
    fn test_submission_rejected_names_status() {
        let error = BulkOperationError::SubmissionRejected {
            status: BulkOperationStatus::Expired,
        };
        assert!(error.to_string().contains("EXPIRED"));
    }

    #[test]
    fn test_graphql_error_converts_to_http_variant() {
        use crate::clients::HttpResponseError;

        let graphql = GraphqlError::Http(HttpError::Response(HttpResponseError {
            code: 401,
            message: r#"{"error":"Unauthorized"}"#.to_string(),
            error_reference: None,
        }));

        let error: BulkOperationError = graphql.into();
        assert!(matches!(error, BulkOperationError::Http(_)));
    }

    #[test]
    fn test_errors_implement_std_error() {
        let _: &dyn std::error::Error = &BulkOperationError::Fetch { code: 404 };
        let _: &dyn std::error::Error = &UploadError::MissingKey;
    }
}
