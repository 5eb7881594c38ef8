// src/models/delivery.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::parts::SortDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "delivery_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Delivered,
    Cancelled,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartsDelivery {
    pub id: Uuid,
    pub part_id: Uuid,
    #[schema(example = 2)]
    pub quantity: i32,
    pub staff_member_id: Uuid,
    pub building_id: Option<Uuid>,
    pub cost_center_id: Option<Uuid>,
    pub status: DeliveryStatus,
    pub signature: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub delivered_at: DateTime<Utc>,
    pub delivered_by_id: Option<Uuid>,
    pub notes: Option<String>,
    pub project_code: Option<String>,
    pub unit_cost: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Entrega com os nomes já resolvidos. É a linha que aparece na tela,
/// no recibo e nas exportações.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub delivery: PartsDelivery,
    pub part_code: String,
    pub part_name: String,
    pub staff_name: String,
    pub staff_email: Option<String>,
    pub building_name: Option<String>,
    pub cost_center_code: Option<String>,
    pub cost_center_name: Option<String>,
    pub delivered_by_name: Option<String>,
}

impl DeliveryDetail {
    pub fn total_cost(&self) -> Option<Decimal> {
        self.delivery
            .unit_cost
            .map(|c| c * Decimal::from(self.delivery.quantity))
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeliveryPayload {
    pub part_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1."))]
    pub quantity: i32,
    pub staff_member_id: Uuid,
    /// Sem valor, usa o prédio / centro de custo do funcionário.
    pub building_id: Option<Uuid>,
    pub cost_center_id: Option<Uuid>,
    pub notes: Option<String>,
    pub project_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeliveryItem {
    pub part_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1."))]
    pub quantity: i32,
}

/// Várias peças para o mesmo funcionário numa única operação.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeliveryPayload {
    pub staff_member_id: Uuid,
    pub building_id: Option<Uuid>,
    pub cost_center_id: Option<Uuid>,
    pub notes: Option<String>,
    pub project_code: Option<String>,
    #[validate(length(min = 1, message = "At least one item is required."), nested)]
    pub items: Vec<BulkDeliveryItem>,
}

impl BulkDeliveryPayload {
    pub fn to_single(&self, item: &BulkDeliveryItem) -> CreateDeliveryPayload {
        CreateDeliveryPayload {
            part_id: item.part_id,
            quantity: item.quantity,
            staff_member_id: self.staff_member_id,
            building_id: self.building_id,
            cost_center_id: self.cost_center_id,
            notes: self.notes.clone(),
            project_code: self.project_code.clone(),
        }
    }

    /// Itens agrupados por peça (quantidades somadas) e ordenados por `part_id`,
    /// a ordem em que as linhas de `parts` são travadas.
    pub fn lock_order(&self) -> Vec<BulkDeliveryItem> {
        let mut merged: Vec<BulkDeliveryItem> = Vec::with_capacity(self.items.len());
        for item in &self.items {
            match merged.iter_mut().find(|m| m.part_id == item.part_id) {
                Some(m) => m.quantity = m.quantity.saturating_add(item.quantity),
                None => merged.push(item.clone()),
            }
        }
        merged.sort_by_key(|m| m.part_id);
        merged
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ConfirmDeliveryPayload {
    #[validate(length(min = 1, message = "Signature is required."))]
    pub signature: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeliverySort {
    #[default]
    DeliveredAt,
    PartName,
    StaffName,
    Building,
    CostCenter,
    Quantity,
    Status,
    TotalCost,
}

/// Filtros do relatório de entregas (JSON e exportação).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryQuery {
    /// `YYYY-MM`
    pub month: Option<String>,
    pub status: Option<DeliveryStatus>,
    pub building_id: Option<Uuid>,
    pub cost_center_id: Option<Uuid>,
    pub staff_member_id: Option<Uuid>,
    #[serde(default)]
    pub sort: DeliverySort,
    /// Sem `dir`, a data vem da mais recente para a mais antiga.
    pub dir: Option<SortDir>,
}

impl DeliveryQuery {
    pub fn direction(&self) -> SortDir {
        self.dir.unwrap_or(match self.sort {
            DeliverySort::DeliveredAt => SortDir::Desc,
            _ => SortDir::Asc,
        })
    }
}

/// Ordenação estável: empates mantêm a ordem de `delivered_at DESC` do banco.
pub fn sort_deliveries(rows: &mut [DeliveryDetail], sort: DeliverySort, dir: SortDir) {
    fn key_str(o: &Option<String>) -> String {
        o.as_deref().unwrap_or_default().to_lowercase()
    }

    rows.sort_by(|a, b| {
        let ord = match sort {
            DeliverySort::DeliveredAt => a.delivery.delivered_at.cmp(&b.delivery.delivered_at),
            DeliverySort::PartName => a.part_name.to_lowercase().cmp(&b.part_name.to_lowercase()),
            DeliverySort::StaffName => a.staff_name.to_lowercase().cmp(&b.staff_name.to_lowercase()),
            DeliverySort::Building => key_str(&a.building_name).cmp(&key_str(&b.building_name)),
            DeliverySort::CostCenter => key_str(&a.cost_center_code).cmp(&key_str(&b.cost_center_code)),
            DeliverySort::Quantity => a.delivery.quantity.cmp(&b.delivery.quantity),
            DeliverySort::Status => a.delivery.status.as_str().cmp(b.delivery.status.as_str()),
            DeliverySort::TotalCost => a.total_cost().cmp(&b.total_cost()),
        };
        match dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    });
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotal {
    #[schema(example = "2025-03")]
    pub month: String,
    pub deliveries: i64,
    pub units: i64,
    pub total_cost: Decimal,
}

/// Linha da aba de resumo do fechamento mensal.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostCenterSummary {
    pub cost_center_code: Option<String>,
    pub cost_center_name: Option<String>,
    pub deliveries: i64,
    pub units: i64,
    pub total_cost: Decimal,
}

/// Entregas canceladas não entram na cobrança.
pub fn summarize_by_cost_center(rows: &[DeliveryDetail]) -> Vec<CostCenterSummary> {
    let mut out: Vec<CostCenterSummary> = Vec::new();
    for row in rows
        .iter()
        .filter(|r| r.delivery.status != DeliveryStatus::Cancelled)
    {
        let idx = match out
            .iter()
            .position(|s| s.cost_center_code == row.cost_center_code)
        {
            Some(i) => i,
            None => {
                out.push(CostCenterSummary {
                    cost_center_code: row.cost_center_code.clone(),
                    cost_center_name: row.cost_center_name.clone(),
                    deliveries: 0,
                    units: 0,
                    total_cost: Decimal::ZERO,
                });
                out.len() - 1
            }
        };
        let entry = &mut out[idx];
        entry.deliveries += 1;
        entry.units += i64::from(row.delivery.quantity);
        entry.total_cost += row.total_cost().unwrap_or_default();
    }
    // Sem centro de custo vai para o fim
    out.sort_by(|a, b| match (&a.cost_center_code, &b.cost_center_code) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn detail(part: &str, qty: i32, cost_center: Option<&str>, day: u32) -> DeliveryDetail {
        let at = Utc.with_ymd_and_hms(2025, 3, day, 10, 0, 0).unwrap();
        DeliveryDetail {
            delivery: PartsDelivery {
                id: Uuid::new_v4(),
                part_id: Uuid::new_v4(),
                quantity: qty,
                staff_member_id: Uuid::new_v4(),
                building_id: None,
                cost_center_id: None,
                status: DeliveryStatus::Pending,
                signature: None,
                confirmed_at: None,
                delivered_at: at,
                delivered_by_id: None,
                notes: None,
                project_code: None,
                unit_cost: Some(Decimal::new(250, 2)),
                created_at: at,
                updated_at: at,
            },
            part_code: part.to_uppercase(),
            part_name: part.to_string(),
            staff_name: "Jane".into(),
            staff_email: None,
            building_name: None,
            cost_center_code: cost_center.map(str::to_string),
            cost_center_name: None,
            delivered_by_name: None,
        }
    }

    #[test]
    fn sort_by_part_name_is_stable() {
        let mut rows = vec![
            detail("bolt", 1, None, 3),
            detail("anchor", 1, None, 2),
            detail("bolt", 2, None, 1),
        ];
        sort_deliveries(&mut rows, DeliverySort::PartName, SortDir::Asc);
        let got: Vec<(String, i32)> = rows
            .iter()
            .map(|r| (r.part_name.clone(), r.delivery.quantity))
            .collect();
        assert_eq!(
            got,
            vec![("anchor".into(), 1), ("bolt".into(), 1), ("bolt".into(), 2)]
        );
    }

    #[test]
    fn default_direction_is_newest_first() {
        let q = DeliveryQuery::default();
        assert_eq!(q.direction(), SortDir::Desc);
        let q = DeliveryQuery { sort: DeliverySort::Quantity, ..Default::default() };
        assert_eq!(q.direction(), SortDir::Asc);
    }

    #[test]
    fn summary_groups_and_skips_cancelled() {
        let mut cancelled = detail("nut", 10, Some("FAC-1"), 4);
        cancelled.delivery.status = DeliveryStatus::Cancelled;
        let rows = vec![
            detail("bolt", 2, Some("FAC-2"), 1),
            detail("bolt", 1, None, 2),
            detail("nut", 4, Some("FAC-1"), 3),
            cancelled,
        ];
        let summary = summarize_by_cost_center(&rows);
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].cost_center_code.as_deref(), Some("FAC-1"));
        assert_eq!(summary[0].units, 4);
        assert_eq!(summary[0].total_cost, Decimal::new(1000, 2));
        assert_eq!(summary[2].cost_center_code, None);
    }

    #[test]
    fn bulk_requires_items() {
        let payload = BulkDeliveryPayload {
            staff_member_id: Uuid::new_v4(),
            building_id: None,
            cost_center_id: None,
            notes: None,
            project_code: None,
            items: vec![],
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn bulk_validates_each_item() {
        let payload: BulkDeliveryPayload = serde_json::from_value(serde_json::json!({
            "staffMemberId": Uuid::new_v4(),
            "items": [
                { "partId": Uuid::new_v4(), "quantity": 2 },
                { "partId": Uuid::new_v4(), "quantity": 0 }
            ]
        }))
        .unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.errors().contains_key("items"));
    }

    #[test]
    fn bulk_items_are_merged_and_locked_in_part_order() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let payload = BulkDeliveryPayload {
            staff_member_id: Uuid::new_v4(),
            building_id: None,
            cost_center_id: None,
            notes: None,
            project_code: None,
            items: vec![
                BulkDeliveryItem { part_id: b, quantity: 2 },
                BulkDeliveryItem { part_id: a, quantity: 1 },
                BulkDeliveryItem { part_id: b, quantity: 3 },
            ],
        };
        let order: Vec<(Uuid, i32)> = payload
            .lock_order()
            .iter()
            .map(|i| (i.part_id, i.quantity))
            .collect();
        assert_eq!(order, vec![(a, 1), (b, 5)]);

        let reversed = BulkDeliveryPayload {
            items: vec![
                BulkDeliveryItem { part_id: a, quantity: 1 },
                BulkDeliveryItem { part_id: b, quantity: 5 },
            ],
            ..payload
        };
        assert_eq!(reversed.lock_order()[0].part_id, a);
    }
}
