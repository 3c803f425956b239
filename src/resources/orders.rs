//! Order helpers: lookups, tagging, and payment marking.

use std::time::Duration;

use serde_json::json;

use crate::clients::GraphqlClient;
use crate::resources::{check_user_errors, response_data, ResourceError};
use crate::throttle::{fulfilled, throttle};

/// Concurrency for per-order fan-out fetches.
const ORDER_FETCH_CONCURRENCY: usize = 4;
/// Delay between fan-out batches.
const ORDER_FETCH_DELAY: Duration = Duration::from_millis(1500);

const ORDER_UPDATE_MUTATION: &str = r"
mutation orderUpdate($input: OrderInput!) {
  orderUpdate(input: $input) {
    order {
      id
      name
      tags
    }
    userErrors {
      field
      message
    }
  }
}";

const ORDER_MARK_AS_PAID_MUTATION: &str = r"
mutation orderMarkAsPaid($input: OrderMarkAsPaidInput!) {
  orderMarkAsPaid(input: $input) {
    order {
      id
    }
    userErrors {
      field
      message
    }
  }
}";

/// Outcome of a tag update on one order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagUpdate {
    /// The order the update targeted.
    pub order_id: String,
    /// Whether the write went through.
    pub tagged: bool,
    /// The order's tags after the update (or before it, when it did not
    /// go through).
    pub tags: Vec<String>,
}

/// Fetches one order by global ID with the given field selection.
///
/// `fields` is a GraphQL selection set spliced into the `Order` fragment
/// (selection sets cannot travel as variables); the ID itself travels as a
/// variable.
///
/// # Errors
///
/// Returns [`ResourceError::NotFound`] when no node exists for the ID, and
/// transport errors unchanged.
pub async fn get_order(
    client: &GraphqlClient,
    order_id: &str,
    fields: &str,
) -> Result<serde_json::Value, ResourceError> {
    let query = format!(
        "query getOrder($id: ID!) {{ node(id: $id) {{ id ... on Order {{ {fields} }} }} }}"
    );

    let response = client
        .query(&query, Some(json!({ "id": order_id })), None, None)
        .await?;

    let data = response_data(&response.body)?;
    match data.get("node") {
        Some(node) if !node.is_null() => Ok(node.clone()),
        _ => Err(ResourceError::NotFound(order_id.to_string())),
    }
}

/// Fetches every order matching a search query, with the given fields.
///
/// One page of up to `first` order IDs (default 250, the API maximum) is
/// fetched, then the orders themselves are loaded with a throttled
/// fan-out. Orders that fail to load are dropped from the result; the
/// drop count is logged.
///
/// # Errors
///
/// Returns transport errors from the ID page query unchanged.
pub async fn get_orders(
    client: &GraphqlClient,
    search: &str,
    fields: &str,
    first: Option<u32>,
) -> Result<Vec<serde_json::Value>, ResourceError> {
    const ORDER_IDS_QUERY: &str = r"
query orderIds($first: Int!, $query: String!) {
  orders(first: $first, query: $query) {
    edges {
      node {
        id
      }
    }
  }
}";

    let response = client
        .query(
            ORDER_IDS_QUERY,
            Some(json!({ "first": first.unwrap_or(250), "query": search })),
            None,
            None,
        )
        .await?;

    let data = response_data(&response.body)?;
    let ids: Vec<String> = data["orders"]["edges"]
        .as_array()
        .map(|edges| {
            edges
                .iter()
                .filter_map(|edge| edge["node"]["id"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    let total = ids.len();
    let results = throttle(
        |id: String| async move { get_order(client, &id, fields).await },
        ids,
        ORDER_FETCH_CONCURRENCY,
        ORDER_FETCH_DELAY,
    )
    .await;

    let orders = fulfilled(results);
    if orders.len() < total {
        tracing::debug!(
            requested = total,
            loaded = orders.len(),
            "dropped orders that failed to load"
        );
    }

    Ok(orders)
}

/// Adds tags to an order, preserving the ones already set.
///
/// Reads the current tags, unions in `new_tags`, and writes the result
/// back. The read and the write are not atomic; a concurrent tag writer
/// can still lose tags.
///
/// # Errors
///
/// Returns [`ResourceError::UserErrors`] when the platform rejects the
/// update.
pub async fn update_order_tags(
    client: &GraphqlClient,
    order_id: &str,
    new_tags: &[String],
) -> Result<TagUpdate, ResourceError> {
    let order = get_order(client, order_id, "tags").await?;
    let existing: Vec<String> = order["tags"]
        .as_array()
        .map(|tags| {
            tags.iter()
                .filter_map(|t| t.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    let mut final_tags = existing.clone();
    for tag in new_tags {
        if !final_tags.contains(tag) {
            final_tags.push(tag.clone());
        }
    }

    let response = client
        .query(
            ORDER_UPDATE_MUTATION,
            Some(json!({ "input": { "id": order_id, "tags": final_tags } })),
            None,
            None,
        )
        .await?;

    let data = response_data(&response.body)?;
    let payload = &data["orderUpdate"];
    check_user_errors(payload, "orderUpdate")?;

    match payload.get("order") {
        Some(order) if !order.is_null() => {
            let tags = order["tags"]
                .as_array()
                .map(|tags| {
                    tags.iter()
                        .filter_map(|t| t.as_str().map(String::from))
                        .collect()
                })
                .unwrap_or(final_tags);
            Ok(TagUpdate {
                order_id: order_id.to_string(),
                tagged: true,
                tags,
            })
        }
        _ => Ok(TagUpdate {
            order_id: order_id.to_string(),
            tagged: false,
            tags: existing,
        }),
    }
}

/// Adds tags to several orders, one at a time.
///
/// Runs serially (concurrency 1, no delay) because each update is itself a
/// read-modify-write. Orders whose update failed are dropped from the
/// result.
pub async fn update_tags_for_orders(
    client: &GraphqlClient,
    order_ids: Vec<String>,
    new_tags: &[String],
) -> Vec<TagUpdate> {
    let results = throttle(
        |id: String| async move { update_order_tags(client, &id, new_tags).await },
        order_ids,
        1,
        Duration::ZERO,
    )
    .await;

    fulfilled(results)
}

/// Marks an order as paid and returns its global ID.
///
/// # Errors
///
/// Returns [`ResourceError::UserErrors`] when the platform rejects the
/// transition (e.g., the order is already paid).
pub async fn mark_order_as_paid(
    client: &GraphqlClient,
    order_id: &str,
) -> Result<String, ResourceError> {
    let response = client
        .query(
            ORDER_MARK_AS_PAID_MUTATION,
            Some(json!({ "input": { "id": order_id } })),
            None,
            None,
        )
        .await?;

    let data = response_data(&response.body)?;
    let payload = &data["orderMarkAsPaid"];
    check_user_errors(payload, "orderMarkAsPaid")?;

    payload["order"]["id"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| ResourceError::Unexpected("orderMarkAsPaid returned no order".to_string()))
}
