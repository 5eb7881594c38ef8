// src/handlers/catalog.rs
//
// Cadastros de referência: prédios, centros de custo e funcionários.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, report::ExportFormat},
    config::AppState,
    handlers::{export_response, read_upload},
    models::{
        import::ImportSummary,
        reference::{
            Building, BuildingPayload, CostCenter, CostCenterPayload, StaffMember, StaffMemberDetail,
            StaffPayload, UpdateBuildingPayload, UpdateCostCenterPayload, UpdateStaffPayload,
        },
    },
    services::report_service,
};

// ---
// Prédios
// ---

#[utoipa::path(
    get,
    path = "/api/buildings",
    tag = "Catalog",
    responses((status = 200, body = Vec<Building>)),
    security(("session_cookie" = []))
)]
pub async fn list_buildings(State(app_state): State<AppState>) -> Result<Json<Vec<Building>>, AppError> {
    Ok(Json(app_state.catalog_service.list_buildings().await?))
}

#[utoipa::path(
    post,
    path = "/api/buildings",
    tag = "Catalog",
    request_body = BuildingPayload,
    responses((status = 201, body = Building), (status = 409, description = "Nome já existe")),
    security(("session_cookie" = []))
)]
pub async fn create_building(
    State(app_state): State<AppState>,
    Json(payload): Json<BuildingPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let building = app_state.catalog_service.create_building(&payload).await?;
    Ok((StatusCode::CREATED, Json(building)))
}

#[utoipa::path(
    patch,
    path = "/api/buildings/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path)),
    request_body = UpdateBuildingPayload,
    responses((status = 200, body = Building), (status = 404)),
    security(("session_cookie" = []))
)]
pub async fn update_building(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBuildingPayload>,
) -> Result<Json<Building>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.catalog_service.update_building(id, &payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/buildings/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path)),
    responses((status = 204), (status = 404), (status = 409, description = "Prédio em uso")),
    security(("session_cookie" = []))
)]
pub async fn delete_building(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.catalog_service.delete_building(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Centros de custo
// ---

#[utoipa::path(
    get,
    path = "/api/cost-centers",
    tag = "Catalog",
    responses((status = 200, body = Vec<CostCenter>)),
    security(("session_cookie" = []))
)]
pub async fn list_cost_centers(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<CostCenter>>, AppError> {
    Ok(Json(app_state.catalog_service.list_cost_centers().await?))
}

#[utoipa::path(
    post,
    path = "/api/cost-centers",
    tag = "Catalog",
    request_body = CostCenterPayload,
    responses((status = 201, body = CostCenter), (status = 409, description = "Código já existe")),
    security(("session_cookie" = []))
)]
pub async fn create_cost_center(
    State(app_state): State<AppState>,
    Json(payload): Json<CostCenterPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let cost_center = app_state.catalog_service.create_cost_center(&payload).await?;
    Ok((StatusCode::CREATED, Json(cost_center)))
}

#[utoipa::path(
    patch,
    path = "/api/cost-centers/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path)),
    request_body = UpdateCostCenterPayload,
    responses((status = 200, body = CostCenter), (status = 404)),
    security(("session_cookie" = []))
)]
pub async fn update_cost_center(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCostCenterPayload>,
) -> Result<Json<CostCenter>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.catalog_service.update_cost_center(id, &payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/cost-centers/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path)),
    responses((status = 204), (status = 404), (status = 409, description = "Centro de custo em uso")),
    security(("session_cookie" = []))
)]
pub async fn delete_cost_center(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.catalog_service.delete_cost_center(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Funcionários
// ---

#[utoipa::path(
    get,
    path = "/api/staff",
    tag = "Catalog",
    responses((status = 200, body = Vec<StaffMemberDetail>)),
    security(("session_cookie" = []))
)]
pub async fn list_staff(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<StaffMemberDetail>>, AppError> {
    Ok(Json(app_state.catalog_service.list_staff().await?))
}

#[utoipa::path(
    post,
    path = "/api/staff",
    tag = "Catalog",
    request_body = StaffPayload,
    responses((status = 201, body = StaffMember)),
    security(("session_cookie" = []))
)]
pub async fn create_staff(
    State(app_state): State<AppState>,
    Json(payload): Json<StaffPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let staff = app_state.catalog_service.create_staff(&payload).await?;
    Ok((StatusCode::CREATED, Json(staff)))
}

#[utoipa::path(
    patch,
    path = "/api/staff/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path)),
    request_body = UpdateStaffPayload,
    responses((status = 200, body = StaffMember), (status = 404)),
    security(("session_cookie" = []))
)]
pub async fn update_staff(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStaffPayload>,
) -> Result<Json<StaffMember>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.catalog_service.update_staff(id, &payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/staff/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path)),
    responses((status = 204), (status = 404), (status = 409, description = "Funcionário tem entregas")),
    security(("session_cookie" = []))
)]
pub async fn delete_staff(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.catalog_service.delete_staff(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/staff/export",
    tag = "Catalog",
    responses((status = 200, description = "Planilha XLSX de funcionários")),
    security(("session_cookie" = []))
)]
pub async fn export_staff(State(app_state): State<AppState>) -> Result<Response, AppError> {
    let staff = app_state.catalog_service.list_staff().await?;
    export_response(
        ExportFormat::Xlsx,
        "staff",
        &report_service::staff_table(&staff),
        app_state.document_service.font_dir(),
    )
}

#[utoipa::path(
    get,
    path = "/api/staff/template",
    tag = "Catalog",
    responses((status = 200, description = "Modelo XLSX para importação")),
    security(("session_cookie" = []))
)]
pub async fn staff_template(State(app_state): State<AppState>) -> Result<Response, AppError> {
    export_response(
        ExportFormat::Xlsx,
        "staff-template",
        &report_service::staff_template(),
        app_state.document_service.font_dir(),
    )
}

/// Prédio ou centro de custo desconhecido vira erro da linha, sem abortar o resto.
#[utoipa::path(
    post,
    path = "/api/staff/import",
    tag = "Catalog",
    responses((status = 200, body = ImportSummary), (status = 422)),
    security(("session_cookie" = []))
)]
pub async fn import_staff(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ImportSummary>, AppError> {
    let (file_name, bytes) = read_upload(multipart).await?;
    Ok(Json(app_state.import_service.import_staff(&file_name, &bytes).await?))
}
