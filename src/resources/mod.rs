//! Convenience helpers for common Admin API entities.
//!
//! These are thin request/response wrappers over [`GraphqlClient`]: no
//! state machine of their own, just parameterized queries and mutations
//! plus throttled fan-out for multi-item calls. The JSONL-scale variants
//! delegate to the bulk-operation client instead.

pub mod ids;
pub mod metafields;
pub mod orders;
pub mod products;

use thiserror::Error;

use crate::clients::bulk::UserError;
use crate::clients::GraphqlError;

/// Error type for the resource helpers.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// A transport-level failure on the underlying GraphQL call.
    #[error(transparent)]
    Graphql(#[from] GraphqlError),

    /// The mutation was executed but the platform reported user errors.
    #[error("{operation} returned user errors: {}", crate::clients::bulk::join_messages(.user_errors))]
    UserErrors {
        /// The mutation that reported the errors.
        operation: &'static str,
        /// The reported errors.
        user_errors: Vec<UserError>,
    },

    /// The requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The response did not have the expected shape.
    #[error("unexpected response shape: {0}")]
    Unexpected(String),
}

/// Returns `data` from a GraphQL response body, or an `Unexpected` error.
pub(crate) fn response_data(
    body: &serde_json::Value,
) -> Result<&serde_json::Value, ResourceError> {
    if let Some(errors) = body.get("errors").and_then(|e| e.as_array()) {
        if !errors.is_empty() {
            let messages: Vec<String> = errors
                .iter()
                .map(|e| {
                    e.get("message")
                        .and_then(|m| m.as_str())
                        .unwrap_or("unknown error")
                        .to_string()
                })
                .collect();
            return Err(ResourceError::Unexpected(format!(
                "GraphQL execution errors: {}",
                messages.join("; ")
            )));
        }
    }

    match body.get("data") {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(ResourceError::Unexpected(
            "response carried no data".to_string(),
        )),
    }
}

/// Extracts the `userErrors` of a mutation payload, failing when any are
/// present.
pub(crate) fn check_user_errors(
    payload: &serde_json::Value,
    operation: &'static str,
) -> Result<(), ResourceError> {
    let user_errors: Vec<UserError> = payload
        .get("userErrors")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default();

    if user_errors.is_empty() {
        Ok(())
    } else {
        Err(ResourceError::UserErrors {
            operation,
            user_errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_data_returns_data() {
        let body = json!({"data": {"shop": {"name": "test"}}});
        let data = response_data(&body).unwrap();
        assert_eq!(data["shop"]["name"], "test");
    }

    #[test]
    fn test_response_data_rejects_execution_errors() {
        let body = json!({"data": null, "errors": [{"message": "Throttled"}]});
        let error = response_data(&body).unwrap_err();
        assert!(error.to_string().contains("Throttled"));
    }

    #[test]
    fn test_check_user_errors_passes_on_empty_list() {
        let payload = json!({"userErrors": []});
        assert!(check_user_errors(&payload, "productCreate").is_ok());
    }

    #[test]
    fn test_check_user_errors_fails_on_errors() {
        let payload = json!({
            "userErrors": [{"field": ["title"], "message": "Title can't be blank"}]
        });
        let error = check_user_errors(&payload, "productCreate").unwrap_err();
        let message = error.to_string();
        assert!(message.contains("productCreate"));
        assert!(message.contains("Title can't be blank"));
    }
}
