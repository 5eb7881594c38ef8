// src/handlers/users.rs
//
// Usuários (admin) e técnicos. Técnicos são usuários com papel fixo.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{CreateTechnicianPayload, CreateUserPayload, Role, UpdateTechnicianPayload, User},
};

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses((status = 200, body = Vec<User>), (status = 403, description = "Só admin")),
    security(("session_cookie" = []))
)]
pub async fn list_users(State(app_state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(app_state.auth_service.list_users(None).await?))
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses((status = 201, body = User), (status = 409, description = "Usuário já existe")),
    security(("session_cookie" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user = app_state
        .auth_service
        .create_user(
            &payload.username,
            &payload.password,
            &payload.name,
            payload.role,
            payload.department.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/technicians",
    tag = "Users",
    responses((status = 200, body = Vec<User>)),
    security(("session_cookie" = []))
)]
pub async fn list_technicians(State(app_state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(app_state.auth_service.list_users(Some(Role::Technician)).await?))
}

#[utoipa::path(
    post,
    path = "/api/technicians",
    tag = "Users",
    request_body = CreateTechnicianPayload,
    responses((status = 201, body = User)),
    security(("session_cookie" = []))
)]
pub async fn create_technician(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateTechnicianPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user = app_state.auth_service.create_technician(&payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    patch,
    path = "/api/technicians/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do técnico")),
    request_body = UpdateTechnicianPayload,
    responses((status = 200, body = User), (status = 404, description = "Técnico não encontrado")),
    security(("session_cookie" = []))
)]
pub async fn update_technician(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTechnicianPayload>,
) -> Result<Json<User>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.auth_service.update_technician(id, &payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/technicians/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do técnico")),
    responses((status = 204), (status = 404, description = "Técnico não encontrado")),
    security(("session_cookie" = []))
)]
pub async fn delete_technician(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.auth_service.delete_technician(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
