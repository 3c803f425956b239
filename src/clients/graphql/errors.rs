//! GraphQL-specific error types.
//!
//! Only HTTP-level errors are surfaced here. GraphQL-level errors (user
//! errors, validation errors) are returned in the response body with HTTP
//! status 200 and are interpreted by the caller.

use crate::clients::HttpError;
use thiserror::Error;

/// Error type for GraphQL API operations.
///
/// Wraps the HTTP error taxonomy. GraphQL-level errors ride in the 200
/// response body's `errors` field and are not treated as client errors at
/// this layer; the bulk-operation client and resource helpers give them
/// typed representations of their own.
#[derive(Debug, Error)]
pub enum GraphqlError {
    /// An HTTP-level error occurred: network errors, non-2xx responses,
    /// and retry exhaustion.
    #[error(transparent)]
    Http(#[from] HttpError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{HttpResponseError, MaxHttpRetriesExceededError};

    #[test]
    fn test_http_variant_preserves_message() {
        let http_error = HttpError::Response(HttpResponseError {
            code: 404,
            message: r#"{"error":"Not Found"}"#.to_string(),
            error_reference: Some("abc-123".to_string()),
        });

        let graphql_error = GraphqlError::Http(http_error);
        assert!(graphql_error.to_string().contains("Not Found"));
    }

    #[test]
    fn test_from_http_error_conversion() {
        let http_error = HttpError::Response(HttpResponseError {
            code: 500,
            message: r#"{"error":"Internal Server Error"}"#.to_string(),
            error_reference: None,
        });

        let graphql_error: GraphqlError = http_error.into();
        assert!(matches!(graphql_error, GraphqlError::Http(_)));
    }

    #[test]
    fn test_wraps_max_retries_exceeded() {
        let http_error = HttpError::MaxRetries(MaxHttpRetriesExceededError {
            code: 429,
            tries: 3,
            message: r#"{"error":"Rate limited"}"#.to_string(),
            error_reference: None,
        });

        let message = GraphqlError::Http(http_error).to_string();
        assert!(message.contains("Exceeded maximum retry count"));
    }
}
