// src/handlers/parts.rs

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, report::ExportFormat},
    config::AppState,
    handlers::{export_response, read_upload},
    models::{
        import::ImportSummary,
        parts::{CreatePartPayload, Part, PartQuery, UpdatePartPayload, UsageAnalytics},
    },
    services::report_service,
};

#[utoipa::path(
    get,
    path = "/api/parts",
    tag = "Parts",
    params(
        ("search" = Option<String>, Query, description = "Busca por código, nome ou descrição"),
        ("category" = Option<String>, Query),
        ("sort" = Option<String>, Query, description = "name | partId | quantity | category | updatedAt"),
        ("dir" = Option<String>, Query, description = "asc | desc")
    ),
    responses((status = 200, body = Vec<Part>)),
    security(("session_cookie" = []))
)]
pub async fn list_parts(
    State(app_state): State<AppState>,
    Query(query): Query<PartQuery>,
) -> Result<Json<Vec<Part>>, AppError> {
    Ok(Json(app_state.part_service.list(&query).await?))
}

#[utoipa::path(
    post,
    path = "/api/parts",
    tag = "Parts",
    request_body = CreatePartPayload,
    responses((status = 201, body = Part), (status = 409, description = "Código já existe")),
    security(("session_cookie" = []))
)]
pub async fn create_part(
    State(app_state): State<AppState>,
    Json(payload): Json<CreatePartPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let part = app_state.part_service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(part)))
}

#[utoipa::path(
    get,
    path = "/api/parts/{id}",
    tag = "Parts",
    params(("id" = Uuid, Path)),
    responses((status = 200, body = Part), (status = 404)),
    security(("session_cookie" = []))
)]
pub async fn get_part(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Part>, AppError> {
    Ok(Json(app_state.part_service.get(id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/parts/{id}",
    tag = "Parts",
    params(("id" = Uuid, Path)),
    request_body = UpdatePartPayload,
    responses((status = 200, body = Part), (status = 404)),
    security(("session_cookie" = []))
)]
pub async fn update_part(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePartPayload>,
) -> Result<Json<Part>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.part_service.update(id, &payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/parts/{id}",
    tag = "Parts",
    params(("id" = Uuid, Path)),
    responses((status = 204), (status = 409, description = "Peça tem entregas registradas")),
    security(("session_cookie" = []))
)]
pub async fn delete_part(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.part_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/parts/low-stock",
    tag = "Parts",
    responses((status = 200, description = "Peças com quantidade <= ponto de reposição", body = Vec<Part>)),
    security(("session_cookie" = []))
)]
pub async fn low_stock(State(app_state): State<AppState>) -> Result<Json<Vec<Part>>, AppError> {
    Ok(Json(app_state.part_service.low_stock().await?))
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub months: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/api/parts/usage-analytics",
    tag = "Parts",
    params(("months" = Option<i32>, Query, description = "Janela em meses (padrão 6)")),
    responses((status = 200, body = UsageAnalytics)),
    security(("session_cookie" = []))
)]
pub async fn usage_analytics(
    State(app_state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<UsageAnalytics>, AppError> {
    Ok(Json(app_state.part_service.usage_analytics(query.months).await?))
}

#[utoipa::path(
    get,
    path = "/api/parts/export",
    tag = "Parts",
    responses((status = 200, description = "Planilha XLSX com as peças filtradas")),
    security(("session_cookie" = []))
)]
pub async fn export_parts(
    State(app_state): State<AppState>,
    Query(query): Query<PartQuery>,
) -> Result<Response, AppError> {
    let parts = app_state.part_service.list(&query).await?;
    export_response(
        ExportFormat::Xlsx,
        "parts",
        &report_service::parts_table(&parts),
        app_state.document_service.font_dir(),
    )
}

#[utoipa::path(
    get,
    path = "/api/parts/template",
    tag = "Parts",
    responses((status = 200, description = "Modelo XLSX para importação")),
    security(("session_cookie" = []))
)]
pub async fn parts_template(State(app_state): State<AppState>) -> Result<Response, AppError> {
    export_response(
        ExportFormat::Xlsx,
        "parts-template",
        &report_service::parts_template(),
        app_state.document_service.font_dir(),
    )
}

#[utoipa::path(
    post,
    path = "/api/parts/import",
    tag = "Parts",
    responses(
        (status = 200, body = ImportSummary),
        (status = 422, description = "Arquivo ilegível ou sem colunas obrigatórias")
    ),
    security(("session_cookie" = []))
)]
pub async fn import_parts(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ImportSummary>, AppError> {
    let (file_name, bytes) = read_upload(multipart).await?;
    Ok(Json(app_state.import_service.import_parts(&file_name, &bytes).await?))
}
