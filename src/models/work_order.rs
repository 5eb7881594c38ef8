// src/models/work_order.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::parts::validate_not_negative;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "work_order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "work_order_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrder {
    pub id: Uuid,
    #[schema(example = "WO-1A2B3C4D")]
    pub work_order_id: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    #[schema(example = "Plumbing")]
    pub kind: String,
    pub priority: WorkOrderPriority,
    pub status: WorkOrderStatus,
    pub description: String,
    pub location: Option<String>,
    pub assigned_to_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
    pub estimated_hours: Option<Decimal>,
    pub actual_hours: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkOrderPayload {
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "Type is required."))]
    pub kind: String,
    #[serde(default)]
    pub priority: WorkOrderPriority,
    #[validate(length(min = 1, message = "Description is required."))]
    pub description: String,
    pub location: Option<String>,
    pub assigned_to_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    #[validate(custom(function = "validate_not_negative"))]
    pub estimated_hours: Option<Decimal>,
}

/// Campo ausente vira `None`; `null` explícito vira `Some(None)` (limpar).
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// PATCH parcial. Só os campos presentes são alterados; `null` limpa
/// `location`, `assignedToId` e `dueDate`.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderPatch {
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "Type cannot be empty."))]
    pub kind: Option<String>,
    pub priority: Option<WorkOrderPriority>,
    pub status: Option<WorkOrderStatus>,
    #[validate(length(min = 1, message = "Description cannot be empty."))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub assigned_to_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<Option<NaiveDate>>,
    #[validate(custom(function = "validate_not_negative"))]
    pub estimated_hours: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub actual_hours: Option<Decimal>,
}

impl WorkOrderPatch {
    /// `completed_at` acompanha o status: entra ao concluir, sai ao reabrir.
    pub fn apply(self, order: &mut WorkOrder, now: DateTime<Utc>) {
        if let Some(kind) = self.kind {
            order.kind = kind;
        }
        if let Some(priority) = self.priority {
            order.priority = priority;
        }
        if let Some(description) = self.description {
            order.description = description;
        }
        if let Some(location) = self.location {
            order.location = location;
        }
        if let Some(assigned_to_id) = self.assigned_to_id {
            order.assigned_to_id = assigned_to_id;
        }
        if let Some(due_date) = self.due_date {
            order.due_date = due_date;
        }
        if self.estimated_hours.is_some() {
            order.estimated_hours = self.estimated_hours;
        }
        if self.actual_hours.is_some() {
            order.actual_hours = self.actual_hours;
        }
        if let Some(status) = self.status {
            let was_completed = order.status == WorkOrderStatus::Completed;
            match status {
                WorkOrderStatus::Completed if !was_completed => order.completed_at = Some(now),
                WorkOrderStatus::Completed => {}
                _ => order.completed_at = None,
            }
            order.status = status;
        }
        order.updated_at = now;
    }
}

/// Código legível: `WO-` + 8 hex maiúsculos.
pub fn generate_work_order_code() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("WO-{}", id[..8].to_uppercase())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderQuery {
    pub status: Option<WorkOrderStatus>,
    pub assigned_to_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartsUsed {
    pub id: Uuid,
    pub work_order_id: Uuid,
    pub part_id: Uuid,
    pub quantity: i32,
    pub issued_at: DateTime<Utc>,
    pub issued_by_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartsUsedDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub usage: PartsUsed,
    pub part_code: String,
    pub part_name: String,
    pub unit_cost: Option<Decimal>,
    pub issued_by_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePartsUsedPayload {
    pub work_order_id: Uuid,
    pub part_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1."))]
    pub quantity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn order(status: WorkOrderStatus) -> WorkOrder {
        let now = Utc::now();
        WorkOrder {
            id: Uuid::new_v4(),
            work_order_id: generate_work_order_code(),
            kind: "Electrical".into(),
            priority: WorkOrderPriority::Medium,
            status,
            description: "Replace ballast".into(),
            location: None,
            assigned_to_id: None,
            due_date: None,
            completed_at: None,
            estimated_hours: None,
            actual_hours: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn to(status: WorkOrderStatus) -> WorkOrderPatch {
        WorkOrderPatch { status: Some(status), ..Default::default() }
    }

    #[test]
    fn completing_sets_completed_at() {
        let mut wo = order(WorkOrderStatus::InProgress);
        let now = Utc::now();
        to(WorkOrderStatus::Completed).apply(&mut wo, now);
        assert_eq!(wo.status, WorkOrderStatus::Completed);
        assert_eq!(wo.completed_at, Some(now));
    }

    #[test]
    fn reopening_clears_completed_at() {
        let mut wo = order(WorkOrderStatus::InProgress);
        let first = Utc::now();
        to(WorkOrderStatus::Completed).apply(&mut wo, first);
        // Concluir de novo mantém a data original
        to(WorkOrderStatus::Completed).apply(&mut wo, first + Duration::hours(1));
        assert_eq!(wo.completed_at, Some(first));

        to(WorkOrderStatus::InProgress).apply(&mut wo, first + Duration::hours(2));
        assert_eq!(wo.completed_at, None);
    }

    #[test]
    fn patch_without_status_keeps_completion() {
        let mut wo = order(WorkOrderStatus::Completed);
        let at = Utc::now();
        wo.completed_at = Some(at);
        WorkOrderPatch { description: Some("Updated".into()), ..Default::default() }
            .apply(&mut wo, Utc::now());
        assert_eq!(wo.completed_at, Some(at));
        assert_eq!(wo.description, "Updated");
    }

    #[test]
    fn explicit_null_clears_but_absent_keeps() {
        let mut wo = order(WorkOrderStatus::Pending);
        wo.location = Some("Room 104".into());
        wo.assigned_to_id = Some(Uuid::new_v4());
        wo.due_date = NaiveDate::from_ymd_opt(2025, 6, 1);

        let keep: WorkOrderPatch =
            serde_json::from_value(serde_json::json!({ "description": "Updated" })).unwrap();
        assert_eq!(keep.location, None);
        keep.apply(&mut wo, Utc::now());
        assert_eq!(wo.location.as_deref(), Some("Room 104"));
        assert!(wo.assigned_to_id.is_some());

        let clear: WorkOrderPatch = serde_json::from_value(serde_json::json!({
            "location": null,
            "assignedToId": null,
            "dueDate": null
        }))
        .unwrap();
        assert_eq!(clear.location, Some(None));
        clear.apply(&mut wo, Utc::now());
        assert_eq!(wo.location, None);
        assert_eq!(wo.assigned_to_id, None);
        assert_eq!(wo.due_date, None);

        let set: WorkOrderPatch =
            serde_json::from_value(serde_json::json!({ "dueDate": "2025-07-15" })).unwrap();
        set.apply(&mut wo, Utc::now());
        assert_eq!(wo.due_date, NaiveDate::from_ymd_opt(2025, 7, 15));
    }

    #[test]
    fn codes_have_expected_shape() {
        let code = generate_work_order_code();
        assert!(code.starts_with("WO-"));
        assert_eq!(code.len(), 11);
        assert!(code[3..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn type_field_is_renamed() {
        let payload: CreateWorkOrderPayload = serde_json::from_value(serde_json::json!({
            "type": "HVAC",
            "description": "No heat in room 104"
        }))
        .unwrap();
        assert_eq!(payload.kind, "HVAC");
        assert_eq!(payload.priority, WorkOrderPriority::Medium);
    }
}
