// src/models/reference.rs
//
// Dados de referência: prédios, centros de custo e funcionários.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub id: Uuid,
    #[schema(example = "McIntosh Center")]
    pub name: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildingPayload {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    pub location: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBuildingPayload {
    #[validate(length(min = 1, message = "Name cannot be empty."))]
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostCenter {
    pub id: Uuid,
    #[schema(example = "FAC-100")]
    pub code: String,
    #[schema(example = "Facilities Maintenance")]
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostCenterPayload {
    #[validate(length(min = 1, message = "Code is required."))]
    pub code: String,
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCostCenterPayload {
    #[validate(length(min = 1, message = "Code cannot be empty."))]
    pub code: Option<String>,
    #[validate(length(min = 1, message = "Name cannot be empty."))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: Uuid,
    #[schema(example = "Jane Smith")]
    pub name: String,
    pub building_id: Option<Uuid>,
    pub cost_center_id: Option<Uuid>,
    #[schema(example = "j-smith@onu.edu")]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Funcionário com os nomes do prédio e do centro de custo (para as listas da tela).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffMemberDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub staff: StaffMember,
    pub building_name: Option<String>,
    pub cost_center_code: Option<String>,
    pub cost_center_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffPayload {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    pub building_id: Option<Uuid>,
    pub cost_center_id: Option<Uuid>,
    #[validate(email(message = "Invalid e-mail address."))]
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStaffPayload {
    #[validate(length(min = 1, message = "Name cannot be empty."))]
    pub name: Option<String>,
    pub building_id: Option<Uuid>,
    pub cost_center_id: Option<Uuid>,
    #[validate(email(message = "Invalid e-mail address."))]
    pub email: Option<String>,
    pub phone: Option<String>,
}
