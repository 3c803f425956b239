//! Bulk-operation lifecycle client for the Shopify Admin API.

use std::time::Duration;

use serde_json::json;

use crate::clients::bulk::errors::{
    BulkOperationError, MalformedRequestError, NegotiationError, UploadError,
};
use crate::clients::bulk::result::BulkResultDownload;
use crate::clients::bulk::types::{
    BulkOperation, BulkOperationKind, BulkOperationStatus, BulkRequest, StagedUploadInput,
    StagedUploadTarget, UserError,
};
use crate::clients::bulk::upload::{build_upload_form, extract_storage_key};
use crate::clients::{GraphqlClient, HttpResponse};
use crate::config::ShopifyConfig;
use crate::session::Session;

/// Default interval between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(30_000);

/// Filename registered for staged JSONL uploads.
const UPLOAD_FILENAME: &str = "bulk_op_vars";

const STAGED_UPLOADS_CREATE: &str = r"
mutation stagedUploadsCreate($input: [StagedUploadInput!]!) {
  stagedUploadsCreate(input: $input) {
    stagedTargets {
      url
      resourceUrl
      parameters {
        name
        value
      }
    }
    userErrors {
      field
      message
    }
  }
}";

const BULK_OPERATION_RUN_MUTATION: &str = r"
mutation bulkOperationRunMutation($mutation: String!, $stagedUploadPath: String!) {
  bulkOperationRunMutation(mutation: $mutation, stagedUploadPath: $stagedUploadPath) {
    bulkOperation {
      id
      status
      url
      errorCode
      objectCount
    }
    userErrors {
      field
      message
    }
  }
}";

const BULK_OPERATION_RUN_QUERY: &str = r"
mutation bulkOperationRunQuery($query: String!) {
  bulkOperationRunQuery(query: $query) {
    bulkOperation {
      id
      status
      url
      errorCode
      objectCount
    }
    userErrors {
      field
      message
    }
  }
}";

const CURRENT_BULK_OPERATION: &str = r"
query currentBulkOperation($type: BulkOperationType!) {
  currentBulkOperation(type: $type) {
    id
    status
    url
    errorCode
    objectCount
  }
}";

/// Options for running a bulk request to completion.
#[derive(Clone, Copy, Debug)]
pub struct BulkRunOptions {
    /// Interval between status polls while the slot is busy.
    pub poll_interval: Duration,
    /// Give up waiting after this long. `None` waits indefinitely, which
    /// matches the platform's own lack of a completion guarantee.
    pub deadline: Option<Duration>,
}

impl Default for BulkRunOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            deadline: None,
        }
    }
}

/// Client for the asynchronous bulk-operation subsystem of the Admin API.
///
/// Bulk operations are large-volume import/export jobs the platform
/// executes server-side. Submitting one is a multi-step lifecycle:
///
/// 1. wait until the shop's global slot for the operation kind is idle,
/// 2. submit the job (for mutations: negotiate a staged upload, POST the
///    JSONL payload, then register the mutation against the uploaded key),
/// 3. poll the slot until the job settles,
/// 4. stream the result file back.
///
/// [`run_to_completion`](Self::run_to_completion) drives the whole
/// lifecycle; the individual steps are public for callers that need finer
/// control.
///
/// # The global slot
///
/// The "current bulk operation" is a single global mutable resource per
/// shop and operation kind, owned by the platform. This client never
/// submits without first observing the slot idle, and it verifies that the
/// slot settled on the operation it submitted. It cannot, however, fence
/// out other processes: running more than one submitter per shop is a
/// deployment hazard the operator must rule out.
///
/// # Cleanup
///
/// A failure between the upload and the registration leaves the uploaded
/// file staged but unused; the platform expires it on its own schedule and
/// this client makes no attempt to delete it.
///
/// # Example
///
/// ```rust,ignore
/// use shopify_bulk::{BulkOperationsClient, BulkRequest, Session, ShopDomain};
///
/// let session = Session::new(
///     "session-id".to_string(),
///     ShopDomain::new("my-store").unwrap(),
///     "access-token".to_string(),
///     None,
/// );
/// let client = BulkOperationsClient::new(&session, None);
///
/// let download = client
///     .run_query_to_completion("{ products { edges { node { id } } } }", None)
///     .await?;
///
/// let mut lines = download.into_lines();
/// while let Some(line) = lines.next_line().await? {
///     let record: serde_json::Value = serde_json::from_str(&line)?;
///     println!("{record}");
/// }
/// ```
#[derive(Debug)]
pub struct BulkOperationsClient {
    /// GraphQL transport for registration and polling calls.
    graphql: GraphqlClient,
    /// Plain HTTP client for the staged upload and the result download,
    /// which both target absolute URLs outside the Admin API.
    http: reqwest::Client,
}

// Verify BulkOperationsClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<BulkOperationsClient>();
};

impl BulkOperationsClient {
    /// Creates a new bulk-operations client for the given session.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created, which
    /// should only happen on TLS initialization failure.
    #[must_use]
    pub fn new(session: &Session, config: Option<&ShopifyConfig>) -> Self {
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            graphql: GraphqlClient::new(session, config),
            http,
        }
    }

    /// Requests a one-time upload target for a file of the given kind.
    ///
    /// Single request/response; retry policy is a caller concern.
    ///
    /// # Errors
    ///
    /// Returns [`BulkOperationError::Negotiation`] when the platform
    /// answers with no staged target, and transport errors unchanged.
    pub async fn stage_upload(
        &self,
        input: &StagedUploadInput,
    ) -> Result<StagedUploadTarget, BulkOperationError> {
        let response = self
            .graphql
            .query(
                STAGED_UPLOADS_CREATE,
                Some(json!({ "input": [input] })),
                None,
                None,
            )
            .await?;

        let payload = response_field(&response, "stagedUploadsCreate")?;
        let user_errors = parse_user_errors(payload);
        let targets: Vec<StagedUploadTarget> = parse_field(payload, "stagedTargets")?;

        targets
            .into_iter()
            .next()
            .ok_or(BulkOperationError::Negotiation(NegotiationError {
                user_errors,
            }))
    }

    /// Registers a bulk query against the shop's dataset.
    ///
    /// The query text travels as a GraphQL variable, so it needs no
    /// escaping. The returned operation is typically in `CREATED` status.
    ///
    /// # Errors
    ///
    /// Returns [`BulkOperationError::MalformedRequest`] when the platform
    /// answers with user errors and no operation.
    pub async fn submit_query(&self, query: &str) -> Result<BulkOperation, BulkOperationError> {
        let response = self
            .graphql
            .query(
                BULK_OPERATION_RUN_QUERY,
                Some(json!({ "query": query })),
                None,
                None,
            )
            .await?;

        let payload = response_field(&response, "bulkOperationRunQuery")?;
        parse_submission(payload)
    }

    /// Stages the JSONL payload and registers a bulk mutation against it.
    ///
    /// Each line of the payload is one JSON variables object for a single
    /// execution of `mutation`. The upload target is negotiated fresh and
    /// consumed exactly once.
    ///
    /// Not idempotent: every call stages a new upload and creates a new
    /// server-side job. Retrying after a partial failure risks duplicate
    /// jobs; check the slot first (or use
    /// [`run_to_completion`](Self::run_to_completion), which does).
    ///
    /// # Errors
    ///
    /// Returns [`BulkOperationError::Upload`] when the upload fails or its
    /// response lacks the storage key, and
    /// [`BulkOperationError::MalformedRequest`] when the platform rejects
    /// the mutation text.
    pub async fn submit_mutation(
        &self,
        mutation: &str,
        jsonl: impl Into<reqwest::Body>,
    ) -> Result<BulkOperation, BulkOperationError> {
        let input = StagedUploadInput::bulk_mutation_variables(UPLOAD_FILENAME);
        let target = self.stage_upload(&input).await?;
        let staged_upload_path = self.upload_jsonl(&target, jsonl.into()).await?;

        tracing::debug!(key = %staged_upload_path, "staged upload accepted");

        let response = self
            .graphql
            .query(
                BULK_OPERATION_RUN_MUTATION,
                Some(json!({
                    "mutation": mutation,
                    "stagedUploadPath": staged_upload_path,
                })),
                None,
                None,
            )
            .await?;

        let payload = response_field(&response, "bulkOperationRunMutation")?;
        parse_submission(payload)
    }

    /// POSTs the JSONL payload to the staged target and returns the
    /// storage object key from the XML response.
    async fn upload_jsonl(
        &self,
        target: &StagedUploadTarget,
        payload: reqwest::Body,
    ) -> Result<String, UploadError> {
        let form = build_upload_form(&target.parameters, payload, UPLOAD_FILENAME)?;

        let response = self.http.post(&target.url).multipart(form).send().await?;

        let code = response.status();
        let body = response.text().await?;

        if !code.is_success() {
            return Err(UploadError::Status {
                code: code.as_u16(),
            });
        }

        // A 2xx alone does not prove acceptance; require the key
        extract_storage_key(&body)?.ok_or(UploadError::MissingKey)
    }

    /// Fetches the current bulk operation occupying the slot for `kind`.
    ///
    /// Returns `None` when the slot has never held an operation. Polling
    /// is purely observational and never changes the operation's state.
    ///
    /// # Errors
    ///
    /// Returns transport errors unchanged.
    pub async fn current_operation(
        &self,
        kind: BulkOperationKind,
    ) -> Result<Option<BulkOperation>, BulkOperationError> {
        let response = self
            .graphql
            .query(
                CURRENT_BULK_OPERATION,
                Some(json!({ "type": kind.as_graphql_type() })),
                None,
                None,
            )
            .await?;

        let data = response_data(&response)?;
        let current = &data["currentBulkOperation"];
        if current.is_null() {
            return Ok(None);
        }

        serde_json::from_value(current.clone())
            .map(Some)
            .map_err(|e| {
                BulkOperationError::UnexpectedResponse(format!(
                    "currentBulkOperation did not parse: {e}"
                ))
            })
    }

    /// Polls until the slot for `kind` holds no busy operation.
    ///
    /// Sleeps `poll_interval` between sequential status checks (one
    /// outstanding check at a time, suspending the task rather than
    /// blocking). Returns the first non-busy snapshot, or `None` when the
    /// slot is empty.
    ///
    /// With `deadline: None` the wait is unbounded, mirroring the
    /// platform's own lack of a completion guarantee; pass a deadline to
    /// get [`BulkOperationError::PollTimeout`] instead.
    ///
    /// # Errors
    ///
    /// Returns transport errors unchanged, and `PollTimeout` when a
    /// deadline elapses while the slot is still busy.
    pub async fn wait_until_idle(
        &self,
        kind: BulkOperationKind,
        poll_interval: Duration,
        deadline: Option<Duration>,
    ) -> Result<Option<BulkOperation>, BulkOperationError> {
        let started = tokio::time::Instant::now();

        loop {
            let snapshot = self.current_operation(kind).await?;

            match snapshot {
                Some(operation) if operation.is_busy() => {
                    if let Some(limit) = deadline {
                        if started.elapsed() >= limit {
                            return Err(BulkOperationError::PollTimeout {
                                waited: started.elapsed(),
                            });
                        }
                    }
                    tracing::debug!(
                        id = %operation.id,
                        status = %operation.status,
                        kind = %kind,
                        "bulk operation slot busy, polling again"
                    );
                    tokio::time::sleep(poll_interval).await;
                }
                settled => return Ok(settled),
            }
        }
    }

    /// Runs a bulk request through its full lifecycle and returns a lazy
    /// handle on the result file.
    ///
    /// Waits for the request's slot to go idle, submits, waits for the
    /// fresh operation to settle, then opens the result download. Any
    /// failure aborts the run; a staged-but-unregistered upload is not
    /// cleaned up.
    ///
    /// # Errors
    ///
    /// Beyond the submission errors, returns:
    /// - [`BulkOperationError::SubmissionRejected`] when the fresh
    ///   operation is not in `CREATED` status,
    /// - [`BulkOperationError::MissingResult`] when the operation settles
    ///   without a result URL (checked before any fetch is attempted),
    /// - [`BulkOperationError::Fetch`] when the result download answers
    ///   with a non-success status.
    pub async fn run_to_completion(
        &self,
        request: BulkRequest,
        options: Option<BulkRunOptions>,
    ) -> Result<BulkResultDownload, BulkOperationError> {
        let options = options.unwrap_or_default();
        let kind = request.kind();

        self.wait_until_idle(kind, options.poll_interval, options.deadline)
            .await?;

        let operation = match request {
            BulkRequest::Query { query } => self.submit_query(&query).await?,
            BulkRequest::Mutation {
                mutation,
                variables,
            } => self.submit_mutation(&mutation, variables).await?,
        };

        if operation.status != BulkOperationStatus::Created {
            return Err(BulkOperationError::SubmissionRejected {
                status: operation.status,
            });
        }

        tracing::debug!(id = %operation.id, kind = %kind, "bulk operation submitted, waiting for completion");

        let terminal = self
            .wait_until_idle(kind, options.poll_interval, options.deadline)
            .await?
            .ok_or_else(|| {
                BulkOperationError::UnexpectedResponse(
                    "bulk operation slot empty after submission".to_string(),
                )
            })?;

        // The slot is shared; settling on some other operation means this
        // run never owned it
        if terminal.id != operation.id {
            return Err(BulkOperationError::UnexpectedResponse(format!(
                "slot settled on operation {} but {} was submitted",
                terminal.id, operation.id
            )));
        }

        tracing::debug!(
            id = %terminal.id,
            status = %terminal.status,
            object_count = ?terminal.object_count,
            "bulk operation settled"
        );

        let url = terminal
            .url
            .clone()
            .ok_or(BulkOperationError::MissingResult {
                status: terminal.status,
            })?;

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| BulkOperationError::Http(e.into()))?;

        if !response.status().is_success() {
            return Err(BulkOperationError::Fetch {
                code: response.status().as_u16(),
            });
        }

        Ok(BulkResultDownload::new(response))
    }

    /// Runs a bulk query to completion.
    ///
    /// Convenience wrapper over [`run_to_completion`](Self::run_to_completion)
    /// for the query kind; consume the returned download with
    /// [`into_lines`](BulkResultDownload::into_lines) for one JSON record
    /// per line, or
    /// [`into_byte_stream`](BulkResultDownload::into_byte_stream) for the
    /// raw body.
    ///
    /// # Errors
    ///
    /// See [`run_to_completion`](Self::run_to_completion).
    pub async fn run_query_to_completion(
        &self,
        query: &str,
        options: Option<BulkRunOptions>,
    ) -> Result<BulkResultDownload, BulkOperationError> {
        self.run_to_completion(BulkRequest::query(query), options)
            .await
    }
}

/// Returns `data` from a GraphQL response, surfacing execution errors.
fn response_data(response: &HttpResponse) -> Result<&serde_json::Value, BulkOperationError> {
    if let Some(errors) = response.body.get("errors").and_then(|e| e.as_array()) {
        if !errors.is_empty() {
            let messages = errors
                .iter()
                .map(|e| {
                    e.get("message")
                        .and_then(|m| m.as_str())
                        .unwrap_or("unknown error")
                        .to_string()
                })
                .collect();
            return Err(BulkOperationError::Graphql { messages });
        }
    }

    match response.body.get("data") {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(BulkOperationError::UnexpectedResponse(
            "response carried no data".to_string(),
        )),
    }
}

/// Returns the named mutation payload from a GraphQL response.
fn response_field<'a>(
    response: &'a HttpResponse,
    name: &str,
) -> Result<&'a serde_json::Value, BulkOperationError> {
    let data = response_data(response)?;
    match data.get(name) {
        Some(payload) if !payload.is_null() => Ok(payload),
        _ => Err(BulkOperationError::UnexpectedResponse(format!(
            "response carried no {name} payload"
        ))),
    }
}

/// Deserializes a named field of a payload, treating `null` as absent.
fn parse_field<T: serde::de::DeserializeOwned + Default>(
    payload: &serde_json::Value,
    name: &str,
) -> Result<T, BulkOperationError> {
    match payload.get(name) {
        None => Ok(T::default()),
        Some(v) if v.is_null() => Ok(T::default()),
        Some(v) => serde_json::from_value(v.clone()).map_err(|e| {
            BulkOperationError::UnexpectedResponse(format!("{name} did not parse: {e}"))
        }),
    }
}

/// Extracts the `userErrors` list of a mutation payload.
fn parse_user_errors(payload: &serde_json::Value) -> Vec<UserError> {
    parse_field(payload, "userErrors").unwrap_or_default()
}

/// Interprets a `bulkOperationRun*` payload.
///
/// An absent operation plus user errors is a malformed request (bad
/// mutation or query text), not a runtime failure.
fn parse_submission(payload: &serde_json::Value) -> Result<BulkOperation, BulkOperationError> {
    let user_errors = parse_user_errors(payload);

    match payload.get("bulkOperation") {
        Some(operation) if !operation.is_null() => serde_json::from_value(operation.clone())
            .map_err(|e| {
                BulkOperationError::UnexpectedResponse(format!("bulkOperation did not parse: {e}"))
            }),
        _ if !user_errors.is_empty() => Err(BulkOperationError::MalformedRequest(
            MalformedRequestError { user_errors },
        )),
        _ => Err(BulkOperationError::UnexpectedResponse(
            "response carried neither a bulk operation nor user errors".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_submission_returns_operation() {
        let payload = json!({
            "bulkOperation": {
                "id": "gid://shopify/BulkOperation/1",
                "status": "CREATED",
                "url": null
            },
            "userErrors": []
        });

        let operation = parse_submission(&payload).unwrap();
        assert_eq!(operation.status, BulkOperationStatus::Created);
    }

    #[test]
    fn test_parse_submission_maps_user_errors_to_malformed_request() {
        let payload = json!({
            "bulkOperation": null,
            "userErrors": [
                {"field": ["mutation"], "message": "Invalid mutation string"}
            ]
        });

        let error = parse_submission(&payload).unwrap_err();
        match error {
            BulkOperationError::MalformedRequest(e) => {
                assert_eq!(e.user_errors.len(), 1);
                assert_eq!(e.user_errors[0].message, "Invalid mutation string");
            }
            other => panic!("expected MalformedRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_submission_with_nothing_is_unexpected() {
        let payload = json!({ "bulkOperation": null, "userErrors": [] });
        assert!(matches!(
            parse_submission(&payload),
            Err(BulkOperationError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_response_data_surfaces_graphql_errors() {
        let response = HttpResponse::new(
            200,
            std::collections::HashMap::new(),
            json!({
                "data": null,
                "errors": [{"message": "Throttled"}]
            }),
        );

        let error = response_data(&response).unwrap_err();
        match error {
            BulkOperationError::Graphql { messages } => {
                assert_eq!(messages, vec!["Throttled".to_string()]);
            }
            other => panic!("expected Graphql, got {other:?}"),
        }
    }

    #[test]
    fn test_response_data_requires_data() {
        let response =
            HttpResponse::new(200, std::collections::HashMap::new(), json!({"data": null}));
        assert!(matches!(
            response_data(&response),
            Err(BulkOperationError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_default_run_options() {
        let options = BulkRunOptions::default();
        assert_eq!(options.poll_interval, DEFAULT_POLL_INTERVAL);
        assert!(options.deadline.is_none());
    }
}
