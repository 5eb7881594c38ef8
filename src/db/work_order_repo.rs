// src/db/work_order_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::work_order::{
        CreateWorkOrderPayload, PartsUsed, PartsUsedDetail, WorkOrder, WorkOrderQuery,
    },
};

#[derive(Clone)]
pub struct WorkOrderRepository {
    pool: PgPool,
}

impl WorkOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, q: &WorkOrderQuery) -> Result<Vec<WorkOrder>, AppError> {
        let rows = sqlx::query_as::<_, WorkOrder>(
            r#"
            SELECT * FROM work_orders
            WHERE ($1::work_order_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR assigned_to_id = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(q.status)
        .bind(q.assigned_to_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<WorkOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, WorkOrder>("SELECT * FROM work_orders WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<WorkOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, WorkOrder>("SELECT * FROM work_orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    pub async fn create(&self, code: &str, p: &CreateWorkOrderPayload) -> Result<WorkOrder, AppError> {
        sqlx::query_as::<_, WorkOrder>(
            r#"
            INSERT INTO work_orders
                (work_order_id, type, priority, description, location, assigned_to_id, due_date, estimated_hours)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(code)
        .bind(&p.kind)
        .bind(p.priority)
        .bind(&p.description)
        .bind(&p.location)
        .bind(p.assigned_to_id)
        .bind(p.due_date)
        .bind(p.estimated_hours)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, &format!("Work order '{}'", code)))
    }

    /// Grava a ordem inteira, já com o patch aplicado.
    pub async fn save<'e, E>(&self, executor: E, wo: &WorkOrder) -> Result<WorkOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, WorkOrder>(
            r#"
            UPDATE work_orders SET
                type = $2,
                priority = $3,
                status = $4,
                description = $5,
                location = $6,
                assigned_to_id = $7,
                due_date = $8,
                completed_at = $9,
                estimated_hours = $10,
                actual_hours = $11,
                updated_at = $12
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(wo.id)
        .bind(&wo.kind)
        .bind(wo.priority)
        .bind(wo.status)
        .bind(&wo.description)
        .bind(&wo.location)
        .bind(wo.assigned_to_id)
        .bind(wo.due_date)
        .bind(wo.completed_at)
        .bind(wo.estimated_hours)
        .bind(wo.actual_hours)
        .bind(wo.updated_at)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_db(e, "Work order"))
    }

    // ---
    // Peças usadas
    // ---

    pub async fn insert_parts_used<'e, E>(
        &self,
        executor: E,
        work_order_id: Uuid,
        part_id: Uuid,
        quantity: i32,
        issued_by_id: Uuid,
    ) -> Result<PartsUsed, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PartsUsed>(
            r#"
            INSERT INTO parts_used (work_order_id, part_id, quantity, issued_by_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(work_order_id)
        .bind(part_id)
        .bind(quantity)
        .bind(issued_by_id)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_db(e, "Parts used"))
    }

    pub async fn list_parts_used(&self, work_order_id: Uuid) -> Result<Vec<PartsUsedDetail>, AppError> {
        let rows = sqlx::query_as::<_, PartsUsedDetail>(
            r#"
            SELECT
                pu.*,
                p.part_id AS part_code,
                p.name AS part_name,
                p.unit_cost,
                u.name AS issued_by_name
            FROM parts_used pu
            JOIN parts p ON p.id = pu.part_id
            LEFT JOIN users u ON u.id = pu.issued_by_id
            WHERE pu.work_order_id = $1
            ORDER BY pu.issued_at ASC
            "#,
        )
        .bind(work_order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
