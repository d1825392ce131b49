//! Tests for the authenticated request pipeline: bearer attachment and the
//! single refresh-and-retry on 401

use serde_json::json;
use shelf_core::{Session, SessionError, TokenStore};
use shelf_http::client::{AuthenticatedShelfClient, ClientError, PublicShelfClient};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ORDERS: &str = "/orders/";

fn client_for(server: &MockServer, store: &TokenStore) -> AuthenticatedShelfClient {
    PublicShelfClient::new(server.uri())
        .unwrap()
        .authenticate(store.clone())
}

fn signed_in_store(access: &str, refresh: &str) -> TokenStore {
    let store = TokenStore::in_memory();
    store.save(&Session::new(access, refresh)).unwrap();
    store
}

async fn mount_refresh(server: &MockServer, refresh: &str, response: ResponseTemplate, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/user/token/refresh/"))
        .and(body_json(json!({ "refresh": refresh })))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

async fn mount_orders(server: &MockServer, token: &str, response: ResponseTemplate, calls: u64) {
    Mock::given(method("GET"))
        .and(path(ORDERS))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_attaches_stored_access_token() {
    let server = MockServer::start().await;
    let store = signed_in_store("good", "refresh-1");
    mount_orders(&server, "good", ResponseTemplate::new(200).set_body_json(json!([1, 2])), 1).await;
    mount_refresh(&server, "refresh-1", ResponseTemplate::new(200), 0).await;

    let client = client_for(&server, &store);
    let orders: Vec<u32> = client
        .execute(client.request(reqwest::Method::GET, ORDERS))
        .await
        .unwrap();

    assert_eq!(orders, vec![1, 2]);
}

#[tokio::test]
async fn test_sends_unauthenticated_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/books/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let store = TokenStore::in_memory();
    let client = client_for(&server, &store);
    let books: Vec<serde_json::Value> = client
        .execute(client.request(reqwest::Method::GET, "/books/"))
        .await
        .unwrap();
    assert!(books.is_empty());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_refreshes_once_and_returns_retried_response() {
    let server = MockServer::start().await;
    let store = signed_in_store("stale", "refresh-1");
    mount_orders(&server, "stale", ResponseTemplate::new(401).set_body_string("first"), 1).await;
    mount_orders(
        &server,
        "fresh",
        ResponseTemplate::new(200).set_body_json(json!({"source": "second"})),
        1,
    )
    .await;
    mount_refresh(
        &server,
        "refresh-1",
        ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})),
        1,
    )
    .await;

    let client = client_for(&server, &store);
    let body: serde_json::Value = client
        .execute(client.request(reqwest::Method::GET, ORDERS))
        .await
        .unwrap();

    assert_eq!(body["source"], "second");
    assert_eq!(store.access_token().as_deref(), Some("fresh"));
    assert_eq!(store.refresh_token().as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn test_second_401_is_final() {
    let server = MockServer::start().await;
    let store = signed_in_store("stale", "refresh-1");
    mount_orders(&server, "stale", ResponseTemplate::new(401), 1).await;
    mount_orders(&server, "fresh", ResponseTemplate::new(401).set_body_string("still no"), 1).await;
    mount_refresh(
        &server,
        "refresh-1",
        ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})),
        1,
    )
    .await;

    let client = client_for(&server, &store);
    let result: Result<serde_json::Value, _> = client
        .execute(client.request(reqwest::Method::GET, ORDERS))
        .await;

    match result {
        Err(ClientError::AuthenticationFailed(message)) => assert_eq!(message, "still no"),
        Err(other) => panic!("expected final 401, got {other:?}"),
        Ok(body) => panic!("expected final 401, got {body}"),
    }
}

#[tokio::test]
async fn test_401_without_refresh_token_propagates() {
    let server = MockServer::start().await;
    let store = TokenStore::in_memory();
    store.set_access_token("stale").unwrap();
    mount_orders(&server, "stale", ResponseTemplate::new(401).set_body_string("expired"), 1).await;
    mount_refresh(&server, "anything", ResponseTemplate::new(200), 0).await;

    let client = client_for(&server, &store);
    let result: Result<serde_json::Value, _> = client
        .execute(client.request(reqwest::Method::GET, ORDERS))
        .await;

    assert!(matches!(result, Err(ClientError::AuthenticationFailed(_))));
}

#[tokio::test]
async fn test_rejected_refresh_surfaces_and_keeps_session() {
    let server = MockServer::start().await;
    let store = signed_in_store("stale", "refresh-1");
    mount_orders(&server, "stale", ResponseTemplate::new(401), 1).await;
    mount_refresh(
        &server,
        "refresh-1",
        ResponseTemplate::new(401).set_body_json(json!({"detail": "Token is invalid or expired"})),
        1,
    )
    .await;

    let client = client_for(&server, &store);
    let result: Result<serde_json::Value, _> = client
        .execute(client.request(reqwest::Method::GET, ORDERS))
        .await;

    match result {
        Err(ClientError::RefreshFailed(SessionError::RefreshRejected { status, .. })) => {
            assert_eq!(status, 401);
        }
        Err(other) => panic!("expected refresh failure, got {other:?}"),
        Ok(body) => panic!("expected refresh failure, got {body}"),
    }
    // Clearing the session is the caller's decision.
    assert_eq!(store.access_token().as_deref(), Some("stale"));
    assert_eq!(store.refresh_token().as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn test_other_errors_pass_through() {
    let server = MockServer::start().await;
    let store = signed_in_store("good", "refresh-1");
    mount_orders(&server, "good", ResponseTemplate::new(403).set_body_string("not yours"), 1).await;
    mount_refresh(&server, "refresh-1", ResponseTemplate::new(200), 0).await;

    let client = client_for(&server, &store);
    let result: Result<serde_json::Value, _> = client
        .execute(client.request(reqwest::Method::GET, ORDERS))
        .await;

    assert!(matches!(result, Err(ClientError::Forbidden(_))));
}

#[tokio::test]
async fn test_unreachable_backend_is_a_request_error() {
    // Nothing listens on the discard port.
    let store = signed_in_store("good", "refresh-1");
    let client = PublicShelfClient::new("http://127.0.0.1:9")
        .unwrap()
        .authenticate(store);
    let result: Result<serde_json::Value, _> = client
        .execute(client.request(reqwest::Method::GET, ORDERS))
        .await;

    assert!(matches!(result, Err(ClientError::Request(_))));
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let server = MockServer::start().await;
    let store = signed_in_store("stale", "refresh-1");
    Mock::given(method("GET"))
        .and(path(ORDERS))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ORDERS))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;
    mount_refresh(
        &server,
        "refresh-1",
        ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})),
        1,
    )
    .await;

    let client = client_for(&server, &store);
    let (first, second) = tokio::join!(
        client.execute::<serde_json::Value>(client.request(reqwest::Method::GET, ORDERS)),
        client.execute::<serde_json::Value>(client.request(reqwest::Method::GET, ORDERS)),
    );

    assert_eq!(first.unwrap()["ok"], true);
    assert_eq!(second.unwrap()["ok"], true);
}
