// Lista de acesso por papel aplicada no router, com o usuário já autenticado.

use std::net::SocketAddr;

use axum::{
    extract::Request,
    middleware::{self, Next},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use parts_tracker::{
    middleware::access::role_guard,
    models::auth::{Role, User},
};
use serde_json::{json, Value};
use uuid::Uuid;

fn user(role: Role) -> User {
    User {
        id: Uuid::new_v4(),
        username: format!("{}-user", role.as_str()),
        password_hash: String::new(),
        name: "Test".into(),
        role,
        department: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Mesmas camadas do router real, com o usuário no lugar do `auth_guard`.
async fn spawn_as(role: Role) -> SocketAddr {
    let current = user(role);
    let ok = || async { Json(json!({ "ok": true })) };
    let app = Router::new()
        .route("/api/parts", get(ok).post(ok))
        .route("/api/users", get(ok))
        .route("/api/excel-final", get(ok))
        .route_layer(middleware::from_fn(role_guard))
        .layer(middleware::from_fn(move |mut request: Request, next: Next| {
            let current = current.clone();
            async move {
                request.extensions_mut().insert(current);
                next.run(request).await
            }
        }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

#[tokio::test]
async fn student_gets_403_with_redirect() {
    let addr = spawn_as(Role::Student).await;
    let client = reqwest::Client::new();

    for path in ["/api/users", "/api/excel-final"] {
        let res = client
            .get(format!("http://{addr}{path}"))
            .send()
            .await
            .expect("request");
        assert_eq!(res.status(), 403, "{path}");
        let body: Value = res.json().await.expect("json");
        assert_eq!(body["redirect"], "/parts-inventory");
        assert!(body["error"].as_str().unwrap_or_default().contains("student"));
    }

    // Estudante lê o inventário mas não escreve nele
    let res = client
        .get(format!("http://{addr}/api/parts"))
        .send()
        .await
        .expect("request");
    assert_eq!(res.status(), 200);
    let res = client
        .post(format!("http://{addr}/api/parts"))
        .send()
        .await
        .expect("request");
    assert_eq!(res.status(), 403);
}

#[tokio::test]
async fn admin_passes_everywhere() {
    let addr = spawn_as(Role::Admin).await;
    let client = reqwest::Client::new();
    for path in ["/api/users", "/api/excel-final", "/api/parts"] {
        let res = client
            .get(format!("http://{addr}{path}"))
            .send()
            .await
            .expect("request");
        assert_eq!(res.status(), 200, "{path}");
    }
}

#[tokio::test]
async fn missing_user_is_unauthenticated() {
    let app = Router::new()
        .route("/api/parts", get(|| async { "ok" }))
        .route_layer(middleware::from_fn(role_guard));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    let res = reqwest::get(format!("http://{addr}/api/parts"))
        .await
        .expect("request");
    assert_eq!(res.status(), 401);
}
