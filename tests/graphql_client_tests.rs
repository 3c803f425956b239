//! Integration tests for the GraphQL client.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shopify_bulk::{
    ApiVersion, GraphqlClient, GraphqlError, HostUrl, Session, ShopDomain, ShopifyConfig,
};

fn create_test_session(shop: &str, access_token: &str) -> Session {
    Session::new(
        "test-session".to_string(),
        ShopDomain::new(shop).unwrap(),
        access_token.to_string(),
        None,
    )
}

fn config_for(server: &MockServer) -> ShopifyConfig {
    ShopifyConfig::builder()
        .host(HostUrl::new(server.uri()).unwrap())
        .build()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_client_creates_with_default_version() {
    let session = create_test_session("test-shop", "test-token");
    let client = GraphqlClient::new(&session, None);

    assert_eq!(client.api_version(), &ApiVersion::latest());
}

#[test]
fn test_client_with_version_override() {
    let session = create_test_session("test-shop", "test-token");
    let client = GraphqlClient::with_version(&session, None, ApiVersion::V2024_10);

    assert_eq!(client.api_version(), &ApiVersion::V2024_10);
}

#[test]
fn test_client_is_thread_safe() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GraphqlClient>();
}

#[test]
fn test_multiple_clients_for_different_shops() {
    let session1 = create_test_session("shop-one", "token-1");
    let session2 = create_test_session("shop-two", "token-2");

    let client1 = GraphqlClient::new(&session1, None);
    let client2 = GraphqlClient::new(&session2, None);

    assert_eq!(client1.api_version(), &ApiVersion::latest());
    assert_eq!(client2.api_version(), &ApiVersion::latest());
}

// ============================================================================
// Query execution
// ============================================================================

#[tokio::test]
async fn test_query_posts_to_versioned_graphql_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!(
            "/admin/api/{}/graphql.json",
            ApiVersion::latest()
        )))
        .and(header("X-Shopify-Access-Token", "test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "shop": { "name": "Test Shop" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = create_test_session("test-shop", "test-token");
    let client = GraphqlClient::new(&session, Some(&config_for(&server)));

    let response = client
        .query("query { shop { name } }", None, None, None)
        .await
        .unwrap();

    assert_eq!(response.code, 200);
    assert_eq!(response.body["data"]["shop"]["name"], "Test Shop");
}

#[tokio::test]
async fn test_query_sends_variables_in_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "product": { "title": "Widget" } }
        })))
        .mount(&server)
        .await;

    let session = create_test_session("test-shop", "test-token");
    let client = GraphqlClient::new(&session, Some(&config_for(&server)));

    client
        .query(
            "query GetProduct($id: ID!) { product(id: $id) { title } }",
            Some(json!({ "id": "gid://shopify/Product/123" })),
            None,
            None,
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["variables"]["id"], "gid://shopify/Product/123");
    assert!(body["query"].as_str().unwrap().contains("GetProduct"));
}

#[tokio::test]
async fn test_graphql_level_errors_ride_in_the_200_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "Field 'shoop' doesn't exist" }]
        })))
        .mount(&server)
        .await;

    let session = create_test_session("test-shop", "test-token");
    let client = GraphqlClient::new(&session, Some(&config_for(&server)));

    // Not an SDK error at this layer; the caller inspects the body
    let response = client
        .query("query { shoop { name } }", None, None, None)
        .await
        .unwrap();

    assert!(response.body["errors"][0]["message"]
        .as_str()
        .unwrap()
        .contains("shoop"));
}

#[tokio::test]
async fn test_non_2xx_response_is_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errors": "Invalid API key or access token"
        })))
        .mount(&server)
        .await;

    let session = create_test_session("test-shop", "bad-token");
    let client = GraphqlClient::new(&session, Some(&config_for(&server)));

    let result = client.query("query { shop { name } }", None, None, None).await;

    assert!(matches!(result, Err(GraphqlError::Http(_))));
}

#[tokio::test]
async fn test_query_retries_on_429_until_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "0")
                .set_body_json(json!({"errors": "Throttled"})),
        )
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "shop": { "name": "Test Shop" } }
        })))
        .mount(&server)
        .await;

    let session = create_test_session("test-shop", "test-token");
    let client = GraphqlClient::new(&session, Some(&config_for(&server)));

    let response = client
        .query("query { shop { name } }", None, None, Some(3))
        .await
        .unwrap();

    assert_eq!(response.code, 200);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}
