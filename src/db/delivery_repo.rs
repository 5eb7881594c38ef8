// src/db/delivery_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, month::MonthRange},
    models::delivery::{DeliveryDetail, DeliveryQuery, DeliveryStatus, PartsDelivery},
};

const DETAIL_SELECT: &str = r#"
    SELECT
        d.*,
        p.part_id AS part_code,
        p.name AS part_name,
        s.name AS staff_name,
        s.email AS staff_email,
        b.name AS building_name,
        c.code AS cost_center_code,
        c.name AS cost_center_name,
        u.name AS delivered_by_name
    FROM parts_delivery d
    JOIN parts p ON p.id = d.part_id
    JOIN staff_members s ON s.id = d.staff_member_id
    LEFT JOIN buildings b ON b.id = d.building_id
    LEFT JOIN cost_centers c ON c.id = d.cost_center_id
    LEFT JOIN users u ON u.id = d.delivered_by_id
"#;

/// Colunas gravadas numa entrega nova.
pub struct NewDelivery<'a> {
    pub part_id: Uuid,
    pub quantity: i32,
    pub staff_member_id: Uuid,
    pub building_id: Option<Uuid>,
    pub cost_center_id: Option<Uuid>,
    pub delivered_by_id: Uuid,
    pub notes: Option<&'a str>,
    pub project_code: Option<&'a str>,
    pub unit_cost: Option<Decimal>,
}

#[derive(Clone)]
pub struct DeliveryRepository {
    pool: PgPool,
}

impl DeliveryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(&self, executor: E, d: &NewDelivery<'_>) -> Result<PartsDelivery, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PartsDelivery>(
            r#"
            INSERT INTO parts_delivery
                (part_id, quantity, staff_member_id, building_id, cost_center_id,
                 status, delivered_by_id, notes, project_code, unit_cost)
            VALUES ($1, $2, $3, $4, $5, 'pending', $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(d.part_id)
        .bind(d.quantity)
        .bind(d.staff_member_id)
        .bind(d.building_id)
        .bind(d.cost_center_id)
        .bind(d.delivered_by_id)
        .bind(d.notes)
        .bind(d.project_code)
        .bind(d.unit_cost)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_db(e, "Delivery"))
    }

    pub async fn find_detail<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<DeliveryDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{} WHERE d.id = $1", DETAIL_SELECT);
        let row = sqlx::query_as::<_, DeliveryDetail>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    /// Base do relatório: filtros no SQL, ordem padrão por data decrescente.
    /// A ordenação pedida pelo usuário é aplicada depois, em memória.
    pub async fn list_details(
        &self,
        month: Option<&MonthRange>,
        q: &DeliveryQuery,
    ) -> Result<Vec<DeliveryDetail>, AppError> {
        let sql = format!(
            r#"{}
            WHERE ($1::timestamptz IS NULL OR d.delivered_at >= $1)
              AND ($2::timestamptz IS NULL OR d.delivered_at < $2)
              AND ($3::delivery_status IS NULL OR d.status = $3)
              AND ($4::uuid IS NULL OR d.building_id = $4)
              AND ($5::uuid IS NULL OR d.cost_center_id = $5)
              AND ($6::uuid IS NULL OR d.staff_member_id = $6)
            ORDER BY d.delivered_at DESC, d.id ASC
            "#,
            DETAIL_SELECT
        );
        let rows = sqlx::query_as::<_, DeliveryDetail>(&sql)
            .bind(month.map(|m| m.start))
            .bind(month.map(|m| m.end))
            .bind(q.status)
            .bind(q.building_id)
            .bind(q.cost_center_id)
            .bind(q.staff_member_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<PartsDelivery>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, PartsDelivery>("SELECT * FROM parts_delivery WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    /// Só entregas pendentes podem ser confirmadas; `None` caso contrário.
    pub async fn confirm(&self, id: Uuid, signature: &str) -> Result<Option<PartsDelivery>, AppError> {
        let row = sqlx::query_as::<_, PartsDelivery>(
            r#"
            UPDATE parts_delivery SET
                status = 'delivered',
                signature = $2,
                confirmed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(signature)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: DeliveryStatus,
    ) -> Result<PartsDelivery, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, PartsDelivery>(
            "UPDATE parts_delivery SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    /// (entregas, unidades, custo) do intervalo, sem as canceladas.
    pub async fn totals_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(i64, i64, Decimal), AppError> {
        let row: (i64, i64, Decimal) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*)::BIGINT,
                COALESCE(SUM(quantity), 0)::BIGINT,
                COALESCE(SUM(quantity * COALESCE(unit_cost, 0)), 0)::NUMERIC(14, 2)
            FROM parts_delivery
            WHERE delivered_at >= $1 AND delivered_at < $2 AND status <> 'cancelled'
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
