// src/db/staff_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::reference::{StaffMember, StaffMemberDetail, StaffPayload, UpdateStaffPayload},
};

const DETAIL_SELECT: &str = r#"
    SELECT s.*, b.name AS building_name, c.code AS cost_center_code, c.name AS cost_center_name
    FROM staff_members s
    LEFT JOIN buildings b ON b.id = s.building_id
    LEFT JOIN cost_centers c ON c.id = s.cost_center_id
"#;

#[derive(Clone)]
pub struct StaffRepository {
    pool: PgPool,
}

impl StaffRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<StaffMemberDetail>, AppError> {
        let sql = format!("{} ORDER BY s.name ASC", DETAIL_SELECT);
        let rows = sqlx::query_as::<_, StaffMemberDetail>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<StaffMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, StaffMember>("SELECT * FROM staff_members WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    pub async fn create<'e, E>(&self, executor: E, p: &StaffPayload) -> Result<StaffMember, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, StaffMember>(
            r#"
            INSERT INTO staff_members (name, building_id, cost_center_id, email, phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(p.name.trim())
        .bind(p.building_id)
        .bind(p.cost_center_id)
        .bind(p.email.as_deref().map(str::trim))
        .bind(&p.phone)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_db(e, "Staff member"))
    }

    pub async fn update(&self, id: Uuid, p: &UpdateStaffPayload) -> Result<Option<StaffMember>, AppError> {
        sqlx::query_as::<_, StaffMember>(
            r#"
            UPDATE staff_members SET
                name = COALESCE($2, name),
                building_id = COALESCE($3, building_id),
                cost_center_id = COALESCE($4, cost_center_id),
                email = COALESCE($5, email),
                phone = COALESCE($6, phone),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(p.name.as_deref().map(str::trim))
        .bind(p.building_id)
        .bind(p.cost_center_id)
        .bind(p.email.as_deref().map(str::trim))
        .bind(&p.phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, "Staff member"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM staff_members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_db(e, "Staff member"))?;
        Ok(result.rows_affected() > 0)
    }
}
