// src/handlers/manual_parts.rs
//
// Quiosque de leitura de código de barras e a fila de revisão que ele alimenta.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::manual_parts::{
        ApproveEntryPayload, ApprovedEntry, KioskScanPayload, KioskScanResult, ManualEntryStatus,
        ManualPartsEntry,
    },
};

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub status: Option<ManualEntryStatus>,
}

#[utoipa::path(
    get,
    path = "/api/manual-parts-review",
    tag = "Manual Parts",
    params(("status" = Option<String>, Query, description = "pending | approved")),
    responses((status = 200, body = Vec<ManualPartsEntry>)),
    security(("session_cookie" = []))
)]
pub async fn list_entries(
    State(app_state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<Vec<ManualPartsEntry>>, AppError> {
    Ok(Json(app_state.manual_parts_service.list(query.status).await?))
}

/// Corpo opcional: sem ele a peça nova usa a descrição lida no quiosque.
#[utoipa::path(
    post,
    path = "/api/manual-parts-review/{id}/approve",
    tag = "Manual Parts",
    params(("id" = Uuid, Path)),
    request_body(content = ApproveEntryPayload, description = "Opcional"),
    responses(
        (status = 200, body = ApprovedEntry),
        (status = 404),
        (status = 409, description = "Leitura já aprovada")
    ),
    security(("session_cookie" = []))
)]
pub async fn approve_entry(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Option<Json<ApproveEntryPayload>>,
) -> Result<Json<ApprovedEntry>, AppError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    payload.validate()?;
    Ok(Json(app_state.manual_parts_service.approve(id, &payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/manual-parts-review/{id}",
    tag = "Manual Parts",
    params(("id" = Uuid, Path)),
    responses((status = 204), (status = 404)),
    security(("session_cookie" = []))
)]
pub async fn delete_entry(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.manual_parts_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/kiosk/scan",
    tag = "Manual Parts",
    request_body = KioskScanPayload,
    responses((status = 200, description = "Peça encontrada ou leitura enfileirada", body = KioskScanResult)),
    security(("session_cookie" = []))
)]
pub async fn kiosk_scan(
    State(app_state): State<AppState>,
    Json(payload): Json<KioskScanPayload>,
) -> Result<Json<KioskScanResult>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.manual_parts_service.scan(&payload).await?))
}
