// src/handlers/auth.rs

use axum::{extract::State, http::HeaderMap, Json};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{removal_cookie, session_cookie, session_token},
    models::auth::{LoginPayload, User},
};

#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Sessão criada; cookie onu_session definido", body = User),
        (status = 401, description = "Usuário ou senha inválidos")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<(CookieJar, Json<User>), AppError> {
    payload.validate()?;

    let session = app_state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    let cookie = session_cookie(session.token, app_state.config.cookie_secure);
    Ok((jar.add(cookie), Json(session.user)))
}

#[utoipa::path(
    post,
    path = "/api/logout",
    tag = "Auth",
    responses((status = 200, description = "Sessão encerrada"))
)]
pub async fn logout(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Value>), AppError> {
    if let Some(token) = session_token(&headers) {
        app_state.auth_service.logout(&token).await?;
    }
    Ok((jar.remove(removal_cookie()), Json(json!({ "success": true }))))
}

/// Sem sessão válida devolve `null` com 200, nunca 401.
#[utoipa::path(
    get,
    path = "/api/current-user",
    tag = "Auth",
    responses((status = 200, description = "Usuário da sessão ou null", body = Option<User>))
)]
pub async fn current_user(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Option<User>>, AppError> {
    let Some(token) = session_token(&headers) else {
        return Ok(Json(None));
    };
    match app_state.auth_service.validate_token(&token).await {
        Ok(user) => Ok(Json(Some(user))),
        Err(AppError::Unauthenticated) => Ok(Json(None)),
        Err(e) => Err(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, description = "Serviço no ar"))
)]
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
