//! Data types for the bulk-operation lifecycle.

use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// The two kinds of bulk operation the platform runs.
///
/// Each kind occupies its own global "current bulk operation" slot per
/// shop, so a running bulk query does not block a bulk mutation. Whether
/// the platform truly keeps the slots independent is its own contract;
/// this client only ever asks about one kind at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BulkOperationKind {
    /// A server-side bulk query producing a JSONL result file.
    Query,
    /// A server-side bulk mutation fed from an uploaded JSONL file.
    Mutation,
}

impl BulkOperationKind {
    /// Returns the `BulkOperationType` enum value used on the wire.
    #[must_use]
    pub const fn as_graphql_type(self) -> &'static str {
        match self {
            Self::Query => "QUERY",
            Self::Mutation => "MUTATION",
        }
    }
}

impl fmt::Display for BulkOperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_graphql_type())
    }
}

/// Status of a server-side bulk operation.
///
/// The platform owns all transitions:
/// `CREATED -> RUNNING -> {COMPLETED | CANCELING -> CANCELED | EXPIRED | FAILED}`.
/// The client only observes statuses via polling and never mutates them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BulkOperationStatus {
    /// The operation was canceled.
    Canceled,
    /// The operation is being canceled; still occupies the slot.
    Canceling,
    /// The operation finished and (normally) produced a result file.
    Completed,
    /// The operation was accepted and is waiting to run.
    Created,
    /// The operation expired before it could run to completion.
    Expired,
    /// The operation failed.
    Failed,
    /// The operation is running.
    Running,
}

impl BulkOperationStatus {
    /// The statuses in which an operation still occupies the slot.
    ///
    /// Exposed as a constant so callers classify against the same set the
    /// client polls with instead of hard-coding it.
    pub const BUSY: [Self; 3] = [Self::Running, Self::Created, Self::Canceling];

    /// Returns `true` while the operation still occupies the slot.
    #[must_use]
    pub fn is_busy(self) -> bool {
        Self::BUSY.contains(&self)
    }

    /// Returns `true` once the operation has settled.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !self.is_busy()
    }
}

impl fmt::Display for BulkOperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Canceled => "CANCELED",
            Self::Canceling => "CANCELING",
            Self::Completed => "COMPLETED",
            Self::Created => "CREATED",
            Self::Expired => "EXPIRED",
            Self::Failed => "FAILED",
            Self::Running => "RUNNING",
        };
        f.write_str(s)
    }
}

/// A server-side bulk operation record, as observed via polling.
///
/// Created by a submit call; afterwards the platform owns it and the
/// client only reads snapshots. `url` is populated once the operation
/// reaches `COMPLETED` (it can stay `None` in failure states, and also for
/// completed operations whose query matched nothing).
#[derive(Clone, Debug, Deserialize)]
pub struct BulkOperation {
    /// Opaque identifier assigned by the platform on creation.
    pub id: String,
    /// Current status of the operation.
    pub status: BulkOperationStatus,
    /// Download URL for the result file, once available.
    #[serde(default)]
    pub url: Option<String>,
    /// Platform error code, meaningful once terminal.
    #[serde(default, rename = "errorCode")]
    pub error_code: Option<String>,
    /// Number of objects processed so far. The platform serializes this
    /// unsigned 64-bit counter as a JSON string.
    #[serde(
        default,
        rename = "objectCount",
        deserialize_with = "deserialize_object_count"
    )]
    pub object_count: Option<u64>,
}

impl BulkOperation {
    /// Returns `true` while this snapshot shows the operation occupying
    /// the slot.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.status.is_busy()
    }
}

fn deserialize_object_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) => s.parse().map(Some).map_err(de::Error::custom),
    }
}

/// A user-facing error returned alongside a mutation payload.
///
/// A response carrying `userErrors` but no operation record signals a
/// malformed request (typically invalid mutation or query text) rather
/// than a runtime failure.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct UserError {
    /// Path segments pointing at the offending input field, when known.
    #[serde(default)]
    pub field: Option<Vec<String>>,
    /// Human-readable description of the problem.
    pub message: String,
}

/// Joins user error messages for display.
pub(crate) fn join_messages(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A single form field the staged upload target requires.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct StagedUploadParameter {
    /// Form field name.
    pub name: String,
    /// Form field value.
    pub value: String,
}

/// An ephemeral, single-use upload destination.
///
/// Requested fresh for every bulk mutation submission and consumed exactly
/// once; targets are not reusable across operations. `parameters` must be
/// attached to the multipart form in order, before the file field.
#[derive(Clone, Debug, Deserialize)]
pub struct StagedUploadTarget {
    /// Destination URL for the multipart POST.
    pub url: String,
    /// URL under which the uploaded resource will be reachable.
    #[serde(default, rename = "resourceUrl")]
    pub resource_url: Option<String>,
    /// Signed form fields to attach before the file.
    #[serde(default)]
    pub parameters: Vec<StagedUploadParameter>,
}

/// Input for a `stagedUploadsCreate` request.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedUploadInput {
    /// The platform resource kind the upload is for.
    pub resource: String,
    /// File name to register the upload under.
    pub filename: String,
    /// Declared MIME type of the file.
    pub mime_type: String,
    /// HTTP method the upload will use.
    pub http_method: String,
}

impl StagedUploadInput {
    /// Input for staging the JSONL variables file of a bulk mutation.
    #[must_use]
    pub fn bulk_mutation_variables(filename: impl Into<String>) -> Self {
        Self {
            resource: "BULK_MUTATION_VARIABLES".to_string(),
            filename: filename.into(),
            mime_type: "text/jsonl".to_string(),
            http_method: "POST".to_string(),
        }
    }
}

/// A bulk request to run to completion.
///
/// The two kinds share one lifecycle (wait for the slot, submit, wait for
/// completion, fetch the result); only the submission step differs, so the
/// request is a tagged variant consumed by a single orchestrator.
#[derive(Debug)]
pub enum BulkRequest {
    /// Run a bulk query. The query text is submitted inline.
    Query {
        /// The GraphQL query to run over the full dataset.
        query: String,
    },
    /// Run a bulk mutation against an uploaded JSONL variables file.
    Mutation {
        /// The GraphQL mutation to run once per JSONL record.
        mutation: String,
        /// The JSONL payload, one variables object per line.
        variables: reqwest::Body,
    },
}

impl BulkRequest {
    /// Creates a bulk query request.
    #[must_use]
    pub fn query(query: impl Into<String>) -> Self {
        Self::Query {
            query: query.into(),
        }
    }

    /// Creates a bulk mutation request with its JSONL variables payload.
    #[must_use]
    pub fn mutation(mutation: impl Into<String>, variables: impl Into<reqwest::Body>) -> Self {
        Self::Mutation {
            mutation: mutation.into(),
            variables: variables.into(),
        }
    }

    /// Returns which global slot this request competes for.
    #[must_use]
    pub const fn kind(&self) -> BulkOperationKind {
        match self {
            Self::Query { .. } => BulkOperationKind::Query,
            Self::Mutation { .. } => BulkOperationKind::Mutation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_busy_states_are_exactly_running_created_canceling() {
        for status in [
            BulkOperationStatus::Running,
            BulkOperationStatus::Created,
            BulkOperationStatus::Canceling,
        ] {
            assert!(status.is_busy(), "{status} should be busy");
            assert!(!status.is_terminal());
        }

        for status in [
            BulkOperationStatus::Completed,
            BulkOperationStatus::Canceled,
            BulkOperationStatus::Expired,
            BulkOperationStatus::Failed,
        ] {
            assert!(status.is_terminal(), "{status} should be terminal");
            assert!(!status.is_busy());
        }
    }

    #[test]
    fn test_status_deserializes_from_wire_format() {
        let status: BulkOperationStatus = serde_json::from_value(json!("RUNNING")).unwrap();
        assert_eq!(status, BulkOperationStatus::Running);

        let status: BulkOperationStatus = serde_json::from_value(json!("COMPLETED")).unwrap();
        assert_eq!(status, BulkOperationStatus::Completed);

        assert!(serde_json::from_value::<BulkOperationStatus>(json!("running")).is_err());
    }

    #[test]
    fn test_bulk_operation_deserializes_with_string_object_count() {
        let operation: BulkOperation = serde_json::from_value(json!({
            "id": "gid://shopify/BulkOperation/123",
            "status": "COMPLETED",
            "url": "https://storage.example.com/result.jsonl",
            "errorCode": null,
            "objectCount": "42"
        }))
        .unwrap();

        assert_eq!(operation.id, "gid://shopify/BulkOperation/123");
        assert_eq!(operation.status, BulkOperationStatus::Completed);
        assert_eq!(operation.object_count, Some(42));
        assert!(!operation.is_busy());
    }

    #[test]
    fn test_bulk_operation_tolerates_missing_optional_fields() {
        let operation: BulkOperation = serde_json::from_value(json!({
            "id": "gid://shopify/BulkOperation/1",
            "status": "CREATED"
        }))
        .unwrap();

        assert!(operation.url.is_none());
        assert!(operation.error_code.is_none());
        assert!(operation.object_count.is_none());
        assert!(operation.is_busy());
    }

    #[test]
    fn test_object_count_accepts_number_form() {
        let operation: BulkOperation = serde_json::from_value(json!({
            "id": "gid://shopify/BulkOperation/1",
            "status": "RUNNING",
            "objectCount": 7
        }))
        .unwrap();

        assert_eq!(operation.object_count, Some(7));
    }

    #[test]
    fn test_staged_upload_input_preset() {
        let input = StagedUploadInput::bulk_mutation_variables("bulk_op_vars");

        assert_eq!(input.resource, "BULK_MUTATION_VARIABLES");
        assert_eq!(input.filename, "bulk_op_vars");
        assert_eq!(input.mime_type, "text/jsonl");
        assert_eq!(input.http_method, "POST");

        // Wire format is camelCase
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["mimeType"], "text/jsonl");
        assert_eq!(value["httpMethod"], "POST");
    }

    #[test]
    fn test_staged_upload_target_preserves_parameter_order() {
        let target: StagedUploadTarget = serde_json::from_value(json!({
            "url": "https://storage.example.com/upload",
            "resourceUrl": null,
            "parameters": [
                {"name": "key", "value": "tmp/123/bulk_op_vars"},
                {"name": "policy", "value": "abc"},
                {"name": "signature", "value": "xyz"}
            ]
        }))
        .unwrap();

        let names: Vec<_> = target.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["key", "policy", "signature"]);
    }

    #[test]
    fn test_bulk_request_kind() {
        let request = BulkRequest::query("{ products { edges { node { id } } } }");
        assert_eq!(request.kind(), BulkOperationKind::Query);

        let request = BulkRequest::mutation("mutation productCreate { }", "{}\n");
        assert_eq!(request.kind(), BulkOperationKind::Mutation);
    }

    #[test]
    fn test_kind_graphql_type() {
        assert_eq!(BulkOperationKind::Query.as_graphql_type(), "QUERY");
        assert_eq!(BulkOperationKind::Mutation.as_graphql_type(), "MUTATION");
    }

    #[test]
    fn test_join_messages() {
        let errors = vec![
            UserError {
                field: Some(vec!["mutation".to_string()]),
                message: "Invalid mutation".to_string(),
            },
            UserError {
                field: None,
                message: "Something else".to_string(),
            },
        ];
        assert_eq!(join_messages(&errors), "Invalid mutation; Something else");
    }
}
