// src/handlers/work_orders.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::work_order::{
        CreatePartsUsedPayload, CreateWorkOrderPayload, PartsUsed, PartsUsedDetail, WorkOrder,
        WorkOrderPatch, WorkOrderQuery,
    },
};

#[utoipa::path(
    get,
    path = "/api/work-orders",
    tag = "Work Orders",
    params(
        ("status" = Option<String>, Query, description = "pending | in_progress | completed | cancelled"),
        ("assignedToId" = Option<Uuid>, Query)
    ),
    responses((status = 200, body = Vec<WorkOrder>)),
    security(("session_cookie" = []))
)]
pub async fn list_work_orders(
    State(app_state): State<AppState>,
    Query(query): Query<WorkOrderQuery>,
) -> Result<Json<Vec<WorkOrder>>, AppError> {
    Ok(Json(app_state.work_order_service.list(&query).await?))
}

#[utoipa::path(
    post,
    path = "/api/work-orders",
    tag = "Work Orders",
    request_body = CreateWorkOrderPayload,
    responses((status = 201, body = WorkOrder)),
    security(("session_cookie" = []))
)]
pub async fn create_work_order(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateWorkOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let order = app_state.work_order_service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/api/work-orders/{id}",
    tag = "Work Orders",
    params(("id" = Uuid, Path)),
    responses((status = 200, body = WorkOrder), (status = 404)),
    security(("session_cookie" = []))
)]
pub async fn get_work_order(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkOrder>, AppError> {
    Ok(Json(app_state.work_order_service.get(id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/work-orders/{id}",
    tag = "Work Orders",
    params(("id" = Uuid, Path)),
    request_body = WorkOrderPatch,
    responses((status = 200, body = WorkOrder), (status = 404)),
    security(("session_cookie" = []))
)]
pub async fn update_work_order(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<WorkOrderPatch>,
) -> Result<Json<WorkOrder>, AppError> {
    patch.validate()?;
    Ok(Json(app_state.work_order_service.update(id, patch).await?))
}

#[utoipa::path(
    get,
    path = "/api/work-orders/{id}/parts",
    tag = "Work Orders",
    params(("id" = Uuid, Path)),
    responses((status = 200, body = Vec<PartsUsedDetail>), (status = 404)),
    security(("session_cookie" = []))
)]
pub async fn work_order_parts(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PartsUsedDetail>>, AppError> {
    Ok(Json(app_state.work_order_service.parts_for(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/parts-used",
    tag = "Work Orders",
    request_body = CreatePartsUsedPayload,
    responses(
        (status = 201, body = PartsUsed),
        (status = 409, description = "Estoque insuficiente")
    ),
    security(("session_cookie" = []))
)]
pub async fn record_parts_used(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreatePartsUsedPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let usage = app_state
        .work_order_service
        .record_parts_used(&payload, user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(usage)))
}
