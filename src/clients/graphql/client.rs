//! GraphQL client implementation for the Shopify Admin API.

use std::collections::HashMap;

use crate::clients::graphql::GraphqlError;
use crate::clients::{DataType, HttpClient, HttpMethod, HttpRequest, HttpResponse};
use crate::config::{ApiVersion, ShopifyConfig};
use crate::session::Session;

/// GraphQL API client for the Shopify Admin API.
///
/// Executes queries and mutations against the versioned `graphql.json`
/// endpoint. Values always travel as GraphQL variables rather than being
/// interpolated into query text, so callers never need to escape
/// user-controlled input into a request body.
///
/// # Thread Safety
///
/// `GraphqlClient` is `Send + Sync`, making it safe to share across async
/// tasks.
///
/// # Example
///
/// ```rust,ignore
/// use shopify_bulk::{GraphqlClient, Session, ShopDomain};
/// use serde_json::json;
///
/// let session = Session::new(
///     "session-id".to_string(),
///     ShopDomain::new("my-store").unwrap(),
///     "access-token".to_string(),
///     None,
/// );
///
/// let client = GraphqlClient::new(&session, None);
///
/// // Simple query
/// let response = client.query("query { shop { name } }", None, None, None).await?;
///
/// // Query with variables
/// let response = client.query(
///     "query GetProduct($id: ID!) { product(id: $id) { title } }",
///     Some(json!({ "id": "gid://shopify/Product/123" })),
///     None,
///     None,
/// ).await?;
/// ```
#[derive(Debug)]
pub struct GraphqlClient {
    /// The internal HTTP client for making requests.
    http_client: HttpClient,
    /// The API version being used.
    api_version: ApiVersion,
}

// Verify GraphqlClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GraphqlClient>();
};

impl GraphqlClient {
    /// Creates a new GraphQL client for the given session.
    ///
    /// Uses the API version from the configuration, falling back to the
    /// latest stable version when no configuration is provided.
    #[must_use]
    pub fn new(session: &Session, config: Option<&ShopifyConfig>) -> Self {
        let api_version = config.map_or_else(ApiVersion::latest, |c| c.api_version().clone());
        Self::create_client(session, config, api_version)
    }

    /// Creates a new GraphQL client with a specific API version override.
    #[must_use]
    pub fn with_version(
        session: &Session,
        config: Option<&ShopifyConfig>,
        version: ApiVersion,
    ) -> Self {
        if let Some(cfg_version) = config.map(ShopifyConfig::api_version) {
            if &version == cfg_version {
                tracing::debug!(
                    "GraphQL client has a redundant API version override to the default {}",
                    cfg_version
                );
            } else {
                tracing::debug!(
                    "GraphQL client overriding default API version {} with {}",
                    cfg_version,
                    version
                );
            }
        }

        Self::create_client(session, config, version)
    }

    fn create_client(
        session: &Session,
        config: Option<&ShopifyConfig>,
        api_version: ApiVersion,
    ) -> Self {
        let base_path = format!("/admin/api/{api_version}");
        let http_client = HttpClient::new(base_path, session, config);

        Self {
            http_client,
            api_version,
        }
    }

    /// Returns the API version being used by this client.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Executes a GraphQL query or mutation against the Admin API.
    ///
    /// Sends a POST request to the `graphql.json` endpoint with the query
    /// and optional variables.
    ///
    /// # Arguments
    ///
    /// * `query` - The GraphQL query string
    /// * `variables` - Optional variables for the query
    /// * `headers` - Optional extra headers to include in the request
    /// * `tries` - Optional number of retry attempts (default: 1, no retries)
    ///
    /// # Returns
    ///
    /// The raw [`HttpResponse`]; `response.body` holds the JSON document
    /// with `data`, `errors`, and `extensions` fields.
    ///
    /// # Errors
    ///
    /// Returns [`GraphqlError::Http`] for HTTP-level errors (network
    /// errors, non-2xx responses, retry exhaustion). GraphQL-level errors
    /// are returned with HTTP 200 and live in `response.body["errors"]`.
    pub async fn query(
        &self,
        query: &str,
        variables: Option<serde_json::Value>,
        headers: Option<HashMap<String, String>>,
        tries: Option<u32>,
    ) -> Result<HttpResponse, GraphqlError> {
        let body = serde_json::json!({
            "query": query,
            "variables": variables
        });

        let mut builder = HttpRequest::builder(HttpMethod::Post, "graphql.json")
            .body(body)
            .body_type(DataType::Json)
            .tries(tries.unwrap_or(1));

        if let Some(extra_headers) = headers {
            builder = builder.extra_headers(extra_headers);
        }

        let request = builder.build().map_err(|e| GraphqlError::Http(e.into()))?;
        self.http_client.request(request).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShopDomain;

    fn create_test_session() -> Session {
        Session::new(
            "test-session".to_string(),
            ShopDomain::new("test-shop").unwrap(),
            "test-access-token".to_string(),
            None,
        )
    }

    #[test]
    fn test_new_uses_latest_version_without_config() {
        let session = create_test_session();
        let client = GraphqlClient::new(&session, None);

        assert_eq!(client.api_version(), &ApiVersion::latest());
    }

    #[test]
    fn test_new_uses_config_version() {
        let session = create_test_session();
        let config = ShopifyConfig::builder()
            .api_version(ApiVersion::V2024_10)
            .build();

        let client = GraphqlClient::new(&session, Some(&config));

        assert_eq!(client.api_version(), &ApiVersion::V2024_10);
    }

    #[test]
    fn test_with_version_overrides_config() {
        let session = create_test_session();
        let config = ShopifyConfig::builder()
            .api_version(ApiVersion::V2024_10)
            .build();

        let client = GraphqlClient::with_version(&session, Some(&config), ApiVersion::V2025_01);

        assert_eq!(client.api_version(), &ApiVersion::V2025_01);
    }

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GraphqlClient>();
    }
}
