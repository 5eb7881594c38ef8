// src/models/manual_parts.rs
//
// Leituras do quiosque que não bateram com nenhuma peça cadastrada.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::parts::{validate_not_negative, Part};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "manual_entry_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ManualEntryStatus {
    Pending,
    Approved,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualPartsEntry {
    pub id: Uuid,
    #[schema(example = "0123456789012")]
    pub scanned_barcode: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub technician_used: Option<String>,
    pub date_scanned: DateTime<Utc>,
    pub status: ManualEntryStatus,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KioskScanPayload {
    #[validate(length(min = 1, message = "Barcode is required."))]
    pub barcode: String,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Quantity must be at least 1."))]
    #[serde(default = "one")]
    pub quantity: i32,
    pub technician: Option<String>,
}

fn one() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum KioskScanResult {
    Found { part: Part },
    Queued { entry: ManualPartsEntry },
}

/// Dados opcionais usados quando a aprovação cria uma peça nova.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveEntryPayload {
    #[validate(length(min = 1, message = "Name cannot be empty."))]
    pub name: Option<String>,
    pub category: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub unit_cost: Option<Decimal>,
    pub location: Option<String>,
    pub shelf: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedEntry {
    pub entry: ManualPartsEntry,
    pub part: Part,
    /// `true` quando a aprovação cadastrou uma peça nova.
    pub created: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_quantity_defaults_to_one() {
        let payload: KioskScanPayload =
            serde_json::from_value(serde_json::json!({"barcode": "12345"})).unwrap();
        assert_eq!(payload.quantity, 1);
        assert!(payload.validate().is_ok());
    }
}
