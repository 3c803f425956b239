//! Product helpers: CRUD wrappers, variant lookups, and canned bulk jobs.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::json;

use crate::clients::bulk::{
    BulkOperation, BulkOperationError, BulkOperationsClient, BulkResultDownload, BulkRunOptions,
};
use crate::clients::GraphqlClient;
use crate::resources::ids::{gid, GidResource};
use crate::resources::{check_user_errors, response_data, ResourceError};

/// Alias-batched variant lookups per wave. Stays below the API's query
/// size ceiling with room to spare.
const VARIANT_LOOKUP_BATCH: usize = 250;
/// Delay between variant lookup waves.
const VARIANT_LOOKUP_DELAY: Duration = Duration::from_secs(20);

/// Mutation used by [`create_product`] and [`bulk_create_products`].
pub const PRODUCT_CREATE_MUTATION: &str = r"
mutation productCreate($input: ProductInput!) {
  productCreate(input: $input) {
    product {
      id
      handle
      description
      createdAt
      status
      totalVariants
      variants(first: 1) {
        edges {
          node {
            id
            sku
            inventoryItem {
              id
            }
          }
        }
      }
    }
    userErrors {
      field
      message
    }
  }
}";

/// Mutation used by [`bulk_update_product_tags`].
pub const PRODUCT_UPDATE_TAGS_MUTATION: &str = r"
mutation productUpdate($input: ProductInput!) {
  productUpdate(input: $input) {
    product {
      id
      tags
    }
    userErrors {
      field
      message
    }
  }
}";

const PRODUCT_DELETE_MUTATION: &str = r"
mutation productDelete($input: ProductDeleteInput!) {
  productDelete(input: $input) {
    deletedProductId
    userErrors {
      field
      message
    }
  }
}";

/// Bulk query returning every product variant with its parent product.
pub const ALL_PRODUCT_VARIANT_IDS_QUERY: &str = r"
{
  productVariants {
    edges {
      node {
        id
        sku
        product {
          id
        }
      }
    }
  }
}";

/// Bulk query returning every product with its images.
pub const ALL_PRODUCT_IMAGES_QUERY: &str = r"
{
  products {
    edges {
      node {
        id
        images {
          edges {
            node {
              id
              altText
              url
            }
          }
        }
      }
    }
  }
}";

/// Creates a single product and returns the created product object.
///
/// `input` is a `ProductInput` value passed through as the mutation
/// variable.
///
/// # Errors
///
/// Returns [`ResourceError::UserErrors`] when the platform rejects the
/// input.
pub async fn create_product(
    client: &GraphqlClient,
    input: serde_json::Value,
) -> Result<serde_json::Value, ResourceError> {
    let response = client
        .query(
            PRODUCT_CREATE_MUTATION,
            Some(json!({ "input": input })),
            None,
            None,
        )
        .await?;

    let data = response_data(&response.body)?;
    let payload = &data["productCreate"];
    check_user_errors(payload, "productCreate")?;

    match payload.get("product") {
        Some(product) if !product.is_null() => Ok(product.clone()),
        _ => Err(ResourceError::Unexpected(
            "productCreate returned no product".to_string(),
        )),
    }
}

/// Deletes a product by global ID and returns the deleted ID, when the
/// platform confirms one.
///
/// # Errors
///
/// Returns [`ResourceError::UserErrors`] when the platform refuses the
/// deletion.
pub async fn delete_product(
    client: &GraphqlClient,
    product_id: &str,
) -> Result<Option<String>, ResourceError> {
    let response = client
        .query(
            PRODUCT_DELETE_MUTATION,
            Some(json!({ "input": { "id": product_id } })),
            None,
            None,
        )
        .await?;

    let data = response_data(&response.body)?;
    let payload = &data["productDelete"];
    check_user_errors(payload, "productDelete")?;

    Ok(payload["deletedProductId"].as_str().map(String::from))
}

/// Looks up the parent product of a variant by numeric variant ID.
///
/// # Errors
///
/// Returns [`ResourceError::NotFound`] when no variant exists for the ID.
pub async fn product_id_for_variant(
    client: &GraphqlClient,
    variant_id: u64,
) -> Result<String, ResourceError> {
    const VARIANT_PRODUCT_QUERY: &str = r"
query variantProduct($id: ID!) {
  productVariant(id: $id) {
    product {
      id
    }
  }
}";

    let variant_gid = gid(GidResource::ProductVariant, variant_id);
    let response = client
        .query(
            VARIANT_PRODUCT_QUERY,
            Some(json!({ "id": variant_gid })),
            None,
            None,
        )
        .await?;

    let data = response_data(&response.body)?;
    data["productVariant"]["product"]["id"]
        .as_str()
        .map(String::from)
        .ok_or(ResourceError::NotFound(variant_gid))
}

/// Looks up parent products for many variants at once.
///
/// Variants are resolved in alias-batched waves (one aliased field per
/// variant, [`VARIANT_LOOKUP_BATCH`] per query) with a delay between
/// waves, draining the input from the end. A wave that fails is logged
/// and skipped; its variants are simply absent from the returned map, as
/// are variants the platform does not know.
///
/// The numeric IDs are interpolated into the alias-batched query text;
/// being `u64`s, they cannot carry GraphQL metacharacters.
pub async fn product_ids_for_variants(
    client: &GraphqlClient,
    variant_ids: Vec<u64>,
) -> HashMap<u64, String> {
    let mut queue = variant_ids;
    let mut results = HashMap::new();
    let mut failed_waves: u32 = 0;

    while !queue.is_empty() {
        let mut wave = Vec::with_capacity(VARIANT_LOOKUP_BATCH);
        while wave.len() < VARIANT_LOOKUP_BATCH {
            match queue.pop() {
                Some(id) => wave.push(id),
                None => break,
            }
        }

        let selections: Vec<String> = wave
            .iter()
            .map(|id| {
                format!(
                    "_{id}: productVariant(id: \"{}\") {{ product {{ id }} }}",
                    gid(GidResource::ProductVariant, *id)
                )
            })
            .collect();
        let query = format!("{{ {} }}", selections.join(" "));

        match client.query(&query, None, None, None).await {
            Ok(response) => {
                if let Ok(data) = response_data(&response.body) {
                    if let Some(entries) = data.as_object() {
                        for (alias, value) in entries {
                            let id = alias.trim_start_matches('_').parse::<u64>();
                            let product_id = value["product"]["id"].as_str();
                            if let (Ok(id), Some(product_id)) = (id, product_id) {
                                results.insert(id, product_id.to_string());
                            }
                        }
                    }
                }
            }
            Err(e) => {
                failed_waves += 1;
                tracing::warn!(error = %e, "variant lookup wave failed");
            }
        }

        if queue.is_empty() {
            continue;
        }
        tokio::time::sleep(VARIANT_LOOKUP_DELAY).await;
    }

    if failed_waves > 0 {
        tracing::debug!(failed_waves, "variant lookup finished with failures");
    }

    results
}

/// Returns the product ID for a SKU, when one exists.
///
/// # Errors
///
/// Returns transport errors unchanged.
pub async fn product_for_sku(
    client: &GraphqlClient,
    sku: &str,
) -> Result<Option<String>, ResourceError> {
    const SKU_QUERY: &str = r"
query productForSku($query: String!) {
  products(first: 1, query: $query) {
    nodes {
      id
    }
  }
}";

    let response = client
        .query(
            SKU_QUERY,
            Some(json!({ "query": format!("sku:{sku}") })),
            None,
            None,
        )
        .await?;

    let data = response_data(&response.body)?;
    Ok(data["products"]["nodes"]
        .as_array()
        .and_then(|nodes| nodes.first())
        .and_then(|node| node["id"].as_str())
        .map(String::from))
}

/// Submits a bulk product-create job from a JSONL stream of
/// `ProductInput` variable objects.
///
/// # Errors
///
/// See [`BulkOperationsClient::submit_mutation`].
pub async fn bulk_create_products(
    bulk: &BulkOperationsClient,
    jsonl: impl Into<reqwest::Body>,
) -> Result<BulkOperation, BulkOperationError> {
    bulk.submit_mutation(PRODUCT_CREATE_MUTATION, jsonl).await
}

/// Submits a bulk tag-update job from a JSONL stream of `ProductInput`
/// variable objects carrying `id` and `tags`.
///
/// # Errors
///
/// See [`BulkOperationsClient::submit_mutation`].
pub async fn bulk_update_product_tags(
    bulk: &BulkOperationsClient,
    jsonl: impl Into<reqwest::Body>,
) -> Result<BulkOperation, BulkOperationError> {
    bulk.submit_mutation(PRODUCT_UPDATE_TAGS_MUTATION, jsonl)
        .await
}

/// Exports every product variant (with SKU and parent product) as a JSONL
/// download.
///
/// # Errors
///
/// See [`BulkOperationsClient::run_to_completion`].
pub async fn all_product_variant_ids(
    bulk: &BulkOperationsClient,
    options: Option<BulkRunOptions>,
) -> Result<BulkResultDownload, BulkOperationError> {
    bulk.run_query_to_completion(ALL_PRODUCT_VARIANT_IDS_QUERY, options)
        .await
}

/// Exports every product with its images as a JSONL download.
///
/// # Errors
///
/// See [`BulkOperationsClient::run_to_completion`].
pub async fn all_product_images(
    bulk: &BulkOperationsClient,
    options: Option<BulkRunOptions>,
) -> Result<BulkResultDownload, BulkOperationError> {
    bulk.run_query_to_completion(ALL_PRODUCT_IMAGES_QUERY, options)
        .await
}
