// src/handlers/deliveries.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, month::MonthRange, report::ExportFormat},
    config::AppState,
    handlers::export_response,
    middleware::auth::AuthenticatedUser,
    models::delivery::{
        BulkDeliveryPayload, ConfirmDeliveryPayload, CreateDeliveryPayload, DeliveryDetail,
        DeliveryQuery, MonthlyTotal, PartsDelivery,
    },
    services::report_service,
};

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    /// `YYYY-MM`; ausente usa o mês corrente.
    pub month: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FormatQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

#[utoipa::path(
    get,
    path = "/api/parts-delivery",
    tag = "Deliveries",
    params(
        ("month" = Option<String>, Query, description = "YYYY-MM"),
        ("status" = Option<String>, Query, description = "pending | delivered | cancelled"),
        ("buildingId" = Option<Uuid>, Query),
        ("costCenterId" = Option<Uuid>, Query),
        ("staffMemberId" = Option<Uuid>, Query),
        ("sort" = Option<String>, Query),
        ("dir" = Option<String>, Query)
    ),
    responses((status = 200, body = Vec<DeliveryDetail>), (status = 400, description = "Mês inválido")),
    security(("session_cookie" = []))
)]
pub async fn list_deliveries(
    State(app_state): State<AppState>,
    Query(query): Query<DeliveryQuery>,
) -> Result<Json<Vec<DeliveryDetail>>, AppError> {
    Ok(Json(app_state.delivery_service.report(&query).await?))
}

#[utoipa::path(
    post,
    path = "/api/parts-delivery",
    tag = "Deliveries",
    request_body = CreateDeliveryPayload,
    responses(
        (status = 201, body = PartsDelivery),
        (status = 409, description = "Estoque insuficiente")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_delivery(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateDeliveryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let delivery = app_state.delivery_service.create(&payload, user.id).await?;
    Ok((StatusCode::CREATED, Json(delivery)))
}

#[utoipa::path(
    post,
    path = "/api/parts-delivery/bulk",
    tag = "Deliveries",
    request_body = BulkDeliveryPayload,
    responses(
        (status = 201, body = Vec<PartsDelivery>),
        (status = 409, description = "Algum item sem estoque; nada foi gravado")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_bulk_delivery(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<BulkDeliveryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let created = app_state.delivery_service.create_bulk(&payload, user.id).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/parts-delivery/{id}",
    tag = "Deliveries",
    params(("id" = Uuid, Path)),
    responses((status = 200, body = DeliveryDetail), (status = 404)),
    security(("session_cookie" = []))
)]
pub async fn get_delivery(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeliveryDetail>, AppError> {
    Ok(Json(app_state.delivery_service.get(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/parts-delivery/monthly-total",
    tag = "Deliveries",
    params(("month" = Option<String>, Query, description = "YYYY-MM")),
    responses((status = 200, body = MonthlyTotal)),
    security(("session_cookie" = []))
)]
pub async fn monthly_total(
    State(app_state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthlyTotal>, AppError> {
    let month = MonthRange::parse_or_current(query.month.as_deref())?;
    Ok(Json(app_state.delivery_service.monthly_total(&month).await?))
}

#[utoipa::path(
    post,
    path = "/api/parts-delivery/{id}/confirm",
    tag = "Deliveries",
    params(("id" = Uuid, Path)),
    request_body = ConfirmDeliveryPayload,
    responses(
        (status = 200, body = DeliveryDetail),
        (status = 409, description = "Entrega não está pendente")
    ),
    security(("session_cookie" = []))
)]
pub async fn confirm_delivery(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConfirmDeliveryPayload>,
) -> Result<Json<DeliveryDetail>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.delivery_service.confirm(id, &payload.signature).await?))
}

#[utoipa::path(
    post,
    path = "/api/parts-delivery/{id}/cancel",
    tag = "Deliveries",
    params(("id" = Uuid, Path)),
    responses(
        (status = 200, body = PartsDelivery),
        (status = 409, description = "Entrega não está pendente")
    ),
    security(("session_cookie" = []))
)]
pub async fn cancel_delivery(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PartsDelivery>, AppError> {
    Ok(Json(app_state.delivery_service.cancel(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/parts-delivery/{id}/receipt",
    tag = "Deliveries",
    params(("id" = Uuid, Path)),
    responses(
        (status = 200, description = "Recibo em PDF", content_type = "application/pdf"),
        (status = 404)
    ),
    security(("session_cookie" = []))
)]
pub async fn delivery_receipt(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let detail = app_state.delivery_service.get(id).await?;
    let pdf_bytes = app_state.document_service.delivery_receipt(&detail)?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"receipt-{}.pdf\"", id),
        ),
    ];
    Ok((headers, pdf_bytes).into_response())
}

#[utoipa::path(
    get,
    path = "/api/parts-delivery/export",
    tag = "Deliveries",
    params(
        ("format" = Option<String>, Query, description = "csv | xlsx | pdf (padrão xlsx)"),
        ("month" = Option<String>, Query, description = "YYYY-MM")
    ),
    responses((status = 200, description = "Relatório no formato pedido")),
    security(("session_cookie" = []))
)]
pub async fn export_deliveries(
    State(app_state): State<AppState>,
    Query(format): Query<FormatQuery>,
    Query(query): Query<DeliveryQuery>,
) -> Result<Response, AppError> {
    let rows = app_state.delivery_service.report(&query).await?;
    let title = match query.month.as_deref() {
        Some(month) if !month.trim().is_empty() => format!("Parts Deliveries {}", month.trim()),
        _ => "Parts Deliveries".to_string(),
    };
    export_response(
        format.format,
        "parts-deliveries",
        &report_service::deliveries_table(&title, &rows),
        app_state.document_service.font_dir(),
    )
}

/// Planilha de cobrança do mês; o resumo por centro de custo ignora canceladas.
#[utoipa::path(
    get,
    path = "/api/excel-final",
    tag = "Deliveries",
    params(("month" = Option<String>, Query, description = "YYYY-MM")),
    responses((status = 200, description = "Planilha XLSX do mês")),
    security(("session_cookie" = []))
)]
pub async fn excel_final(
    State(app_state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Response, AppError> {
    let month = MonthRange::parse_or_current(query.month.as_deref())?;
    let filters = DeliveryQuery {
        month: Some(month.label()),
        ..Default::default()
    };
    let rows = app_state.delivery_service.report(&filters).await?;
    export_response(
        ExportFormat::Xlsx,
        &format!("excel-final-{}", month.label()),
        &report_service::excel_final_table(&month, &rows),
        app_state.document_service.font_dir(),
    )
}
