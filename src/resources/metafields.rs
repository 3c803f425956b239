//! Metafield helpers.

use crate::clients::bulk::{BulkOperation, BulkOperationError, BulkOperationsClient};

/// Mutation used by [`bulk_set_metafields`].
pub const METAFIELDS_SET_MUTATION: &str = r"
mutation metafieldsSet($metafields: [MetafieldsSetInput!]!) {
  metafieldsSet(metafields: $metafields) {
    metafields {
      key
      namespace
      value
      createdAt
      updatedAt
    }
    userErrors {
      field
      message
      code
    }
  }
}";

/// Submits a bulk metafield-set job from a JSONL stream of
/// `MetafieldsSetInput` variable objects.
///
/// # Errors
///
/// See [`BulkOperationsClient::submit_mutation`].
pub async fn bulk_set_metafields(
    bulk: &BulkOperationsClient,
    jsonl: impl Into<reqwest::Body>,
) -> Result<BulkOperation, BulkOperationError> {
    bulk.submit_mutation(METAFIELDS_SET_MUTATION, jsonl).await
}
