// Cliente de consultas contra um servidor axum de mentira.

use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use parts_tracker::{
    client::{ClientError, Mutation, QueryClient},
    models::{auth::Role, realtime::WsMessage},
};
use reqwest::Method;
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct Hits {
    parts: Arc<AtomicUsize>,
}

async fn list_parts(State(hits): State<Hits>) -> Json<Value> {
    let n = hits.parts.fetch_add(1, Ordering::SeqCst) + 1;
    // Segura a resposta para que as chamadas concorrentes se sobreponham
    tokio::time::sleep(Duration::from_millis(50)).await;
    Json(json!([{ "partId": "FLT-001", "fetch": n }]))
}

async fn low_stock() -> Json<Value> {
    Json(json!([]))
}

async fn create_delivery(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["quantity"].as_i64().unwrap_or(0) > 10 {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "error": "Insufficient stock for part FLT-001: 10 available, 11 requested" })),
        );
    }
    (StatusCode::CREATED, Json(json!({ "status": "pending" })))
}

async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    addr
}

async fn stub() -> (QueryClient, Hits) {
    let hits = Hits::default();
    let router = Router::new()
        .route("/api/parts", get(list_parts))
        .route("/api/parts/low-stock", get(low_stock))
        .route("/api/parts-delivery", post(create_delivery))
        .with_state(hits.clone());
    let addr = spawn(router).await;
    let client = QueryClient::new(format!("http://{addr}")).expect("client");
    (client, hits)
}

#[tokio::test]
async fn concurrent_queries_share_one_request() {
    let (client, hits) = stub().await;

    let mut handles = Vec::new();
    for _ in 0..5 {
        let client = client.clone();
        handles.push(tokio::spawn(async move { client.query_value("/api/parts").await }));
    }
    for handle in handles {
        let value = handle.await.expect("join").expect("query");
        assert_eq!(value[0]["fetch"], 1);
    }
    assert_eq!(hits.parts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn successful_mutation_evicts_keys_and_children() {
    let (client, hits) = stub().await;

    client.query_value("/api/parts").await.expect("parts");
    client.query_value("/api/parts/low-stock").await.expect("low stock");
    assert!(client.is_cached("/api/parts/low-stock").await);

    let created = client
        .mutate(Mutation::new(Method::POST, "/api/parts-delivery").body(json!({ "quantity": 2 })))
        .await
        .expect("mutation");
    assert_eq!(created["status"], "pending");

    assert!(!client.is_cached("/api/parts").await);
    assert!(!client.is_cached("/api/parts/low-stock").await);

    let refetched = client.query_value("/api/parts").await.expect("parts");
    assert_eq!(refetched[0]["fetch"], 2);
    assert_eq!(hits.parts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_mutation_keeps_cache_and_surfaces_server_message() {
    let (client, _) = stub().await;
    client.query_value("/api/parts").await.expect("parts");

    let err = client
        .mutate(Mutation::new(Method::POST, "/api/parts-delivery").body(json!({ "quantity": 11 })))
        .await
        .expect_err("should fail");

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 409);
            assert!(message.starts_with("Insufficient stock"), "{message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(client.is_cached("/api/parts").await);
}

#[tokio::test]
async fn data_changed_message_invalidates_resource() {
    let (client, _) = stub().await;
    client.query_value("/api/parts").await.expect("parts");

    client.handle_message(&WsMessage::Connected).await;
    assert!(client.is_cached("/api/parts").await);

    client.handle_message(&WsMessage::data_changed("parts")).await;
    assert!(!client.is_cached("/api/parts").await);
}

#[tokio::test]
async fn stale_entries_are_refetched() {
    let (client, hits) = stub().await;
    let client = client.stale_time(Duration::from_millis(1));

    client.query_value("/api/parts").await.expect("parts");
    tokio::time::sleep(Duration::from_millis(10)).await;
    client.query_value("/api/parts").await.expect("parts");
    assert_eq!(hits.parts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn current_user_maps_missing_session_to_none() {
    let router = Router::new().route(
        "/api/current-user",
        get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Authentication required" }))) }),
    );
    let client = QueryClient::new(format!("http://{}", spawn(router).await)).expect("client");
    assert!(client.current_user().await.expect("no error").is_none());

    let router = Router::new().route("/api/current-user", get(|| async { Json(Value::Null) }));
    let client = QueryClient::new(format!("http://{}", spawn(router).await)).expect("client");
    assert!(client.current_user().await.expect("no error").is_none());
}

#[tokio::test]
async fn current_user_decodes_the_session_user() {
    let router = Router::new().route(
        "/api/current-user",
        get(|| async {
            Json(json!({
                "id": "7f1d3c9e-2b4a-4c6d-9e8f-0a1b2c3d4e5f",
                "username": "ana",
                "name": "Ana",
                "role": "student",
                "department": null,
                "createdAt": "2025-01-01T00:00:00Z",
                "updatedAt": "2025-01-01T00:00:00Z"
            }))
        }),
    );
    let client = QueryClient::new(format!("http://{}", spawn(router).await)).expect("client");
    let user = client.current_user().await.expect("ok").expect("user");
    assert_eq!(user.username, "ana");
    assert_eq!(user.role, Role::Student);
}

#[tokio::test]
async fn current_user_reports_network_failure_after_one_retry() {
    // Porta que acabou de ser liberada: a conexão é recusada
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let client = QueryClient::new(format!("http://{addr}")).expect("client");
    assert!(matches!(client.current_user().await, Err(ClientError::Http(_))));
}

#[derive(Clone, Default)]
struct Versioned {
    version: Arc<AtomicUsize>,
}

async fn versioned_parts(State(state): State<Versioned>) -> Json<Value> {
    let version = state.version.load(Ordering::SeqCst);
    // A resposta sai com a versão lida antes da escrita
    tokio::time::sleep(Duration::from_millis(200)).await;
    Json(json!({ "version": version }))
}

async fn bump_version(State(state): State<Versioned>) -> (StatusCode, Json<Value>) {
    state.version.fetch_add(1, Ordering::SeqCst);
    (StatusCode::CREATED, Json(json!({ "status": "pending" })))
}

#[tokio::test]
async fn read_in_flight_during_mutation_is_not_cached() {
    let state = Versioned::default();
    let router = Router::new()
        .route("/api/parts", get(versioned_parts))
        .route("/api/parts-delivery", post(bump_version))
        .with_state(state.clone());
    let client = QueryClient::new(format!("http://{}", spawn(router).await)).expect("client");

    let in_flight = {
        let client = client.clone();
        tokio::spawn(async move { client.query_value("/api/parts").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    client
        .mutate(Mutation::new(Method::POST, "/api/parts-delivery").body(json!({ "quantity": 1 })))
        .await
        .expect("mutation");

    let old = in_flight.await.expect("join").expect("query");
    assert_eq!(old["version"], 0);
    assert!(!client.is_cached("/api/parts").await);

    let current = client.query_value("/api/parts").await.expect("parts");
    assert_eq!(current["version"], 1);
}
