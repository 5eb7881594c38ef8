// src/db/manual_parts_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::manual_parts::{KioskScanPayload, ManualEntryStatus, ManualPartsEntry},
};

#[derive(Clone)]
pub struct ManualPartsRepository {
    pool: PgPool,
}

impl ManualPartsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, status: Option<ManualEntryStatus>) -> Result<Vec<ManualPartsEntry>, AppError> {
        let rows = sqlx::query_as::<_, ManualPartsEntry>(
            r#"
            SELECT * FROM manual_parts_entries
            WHERE ($1::manual_entry_status IS NULL OR status = $1)
            ORDER BY date_scanned DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create(&self, p: &KioskScanPayload) -> Result<ManualPartsEntry, AppError> {
        let row = sqlx::query_as::<_, ManualPartsEntry>(
            r#"
            INSERT INTO manual_parts_entries (scanned_barcode, description, quantity, technician_used)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(p.barcode.trim())
        .bind(&p.description)
        .bind(p.quantity)
        .bind(&p.technician)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<ManualPartsEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ManualPartsEntry>(
            "SELECT * FROM manual_parts_entries WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    pub async fn mark_approved<'e, E>(&self, executor: E, id: Uuid) -> Result<ManualPartsEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ManualPartsEntry>(
            "UPDATE manual_parts_entries SET status = 'approved' WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM manual_parts_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
