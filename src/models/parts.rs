// src/models/parts.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub id: Uuid,
    #[schema(example = "FLT-2040")]
    pub part_id: String,
    #[schema(example = "HVAC filter 20x20x1")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = 12)]
    pub quantity: i32,
    #[schema(example = 4)]
    pub reorder_level: i32,
    #[schema(example = "8.75")]
    pub unit_cost: Option<Decimal>,
    #[schema(example = "HVAC")]
    pub category: Option<String>,
    pub location: Option<String>,
    pub shelf: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("Value cannot be negative.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePartPayload {
    #[validate(length(min = 1, message = "Part ID is required."))]
    pub part_id: String,
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Quantity cannot be negative."))]
    #[serde(default)]
    pub quantity: i32,
    #[validate(range(min = 0, message = "Reorder level cannot be negative."))]
    #[serde(default)]
    pub reorder_level: i32,
    #[validate(custom(function = "validate_not_negative"))]
    pub unit_cost: Option<Decimal>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub shelf: Option<String>,
}

/// Campos ausentes ficam como estão.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePartPayload {
    #[validate(length(min = 1, message = "Part ID cannot be empty."))]
    pub part_id: Option<String>,
    #[validate(length(min = 1, message = "Name cannot be empty."))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Quantity cannot be negative."))]
    pub quantity: Option<i32>,
    #[validate(range(min = 0, message = "Reorder level cannot be negative."))]
    pub reorder_level: Option<i32>,
    #[validate(custom(function = "validate_not_negative"))]
    pub unit_cost: Option<Decimal>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub shelf: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PartSort {
    #[default]
    Name,
    PartId,
    Quantity,
    Category,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

/// Filtros da listagem de peças; a exportação usa exatamente os mesmos.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub sort: PartSort,
    #[serde(default)]
    pub dir: SortDir,
}

impl PartQuery {
    /// Coluna vem de uma lista fechada, nunca do texto do usuário.
    pub fn order_by(&self) -> String {
        let column = match self.sort {
            PartSort::Name => "name",
            PartSort::PartId => "part_id",
            PartSort::Quantity => "quantity",
            PartSort::Category => "category",
            PartSort::UpdatedAt => "updated_at",
        };
        let dir = match self.dir {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        };
        format!("{} {} NULLS LAST, part_id ASC", column, dir)
    }
}

// --- Analytics ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyUsage {
    #[schema(example = "2025-03")]
    pub month: String,
    pub units: i64,
    pub total_cost: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopPartUsage {
    pub id: Uuid,
    pub part_id: String,
    pub name: String,
    pub units: i64,
    pub total_cost: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsageAnalytics {
    pub months: Vec<MonthlyUsage>,
    pub top_parts: Vec<TopPartUsage>,
    pub low_stock_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_by_is_whitelisted() {
        let q: PartQuery =
            serde_json::from_value(serde_json::json!({"sort": "quantity", "dir": "desc"})).unwrap();
        assert_eq!(q.order_by(), "quantity DESC NULLS LAST, part_id ASC");
        assert!(serde_json::from_value::<PartQuery>(serde_json::json!({"sort": "1; DROP TABLE parts"})).is_err());
    }

    #[test]
    fn negative_unit_cost_fails_validation() {
        let payload = CreatePartPayload {
            part_id: "A-1".into(),
            name: "Bolt".into(),
            description: None,
            quantity: 1,
            reorder_level: 0,
            unit_cost: Some(Decimal::new(-1, 0)),
            category: None,
            location: None,
            shelf: None,
        };
        assert!(payload.validate().is_err());
    }
}
