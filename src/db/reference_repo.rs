// src/db/reference_repo.rs
//
// Prédios e centros de custo.

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::reference::{
        Building, BuildingPayload, CostCenter, CostCenterPayload, UpdateBuildingPayload,
        UpdateCostCenterPayload,
    },
};

#[derive(Clone)]
pub struct ReferenceRepository {
    pool: PgPool,
}

impl ReferenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // --- Prédios ---

    pub async fn list_buildings(&self) -> Result<Vec<Building>, AppError> {
        let rows = sqlx::query_as::<_, Building>("SELECT * FROM buildings ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn find_building_by_name<'e, E>(&self, executor: E, name: &str) -> Result<Option<Building>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Building>("SELECT * FROM buildings WHERE LOWER(name) = LOWER($1)")
            .bind(name.trim())
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    pub async fn create_building(&self, p: &BuildingPayload) -> Result<Building, AppError> {
        sqlx::query_as::<_, Building>(
            "INSERT INTO buildings (name, location, description) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(p.name.trim())
        .bind(&p.location)
        .bind(&p.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, &format!("Building '{}'", p.name)))
    }

    pub async fn update_building(&self, id: Uuid, p: &UpdateBuildingPayload) -> Result<Option<Building>, AppError> {
        sqlx::query_as::<_, Building>(
            r#"
            UPDATE buildings SET
                name = COALESCE($2, name),
                location = COALESCE($3, location),
                description = COALESCE($4, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(p.name.as_deref().map(str::trim))
        .bind(&p.location)
        .bind(&p.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, "Building name"))
    }

    pub async fn delete_building(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM buildings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_db(e, "Building"))?;
        Ok(result.rows_affected() > 0)
    }

    // --- Centros de custo ---

    pub async fn list_cost_centers(&self) -> Result<Vec<CostCenter>, AppError> {
        let rows = sqlx::query_as::<_, CostCenter>("SELECT * FROM cost_centers ORDER BY code ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// A planilha de funcionários pode trazer o código ou o nome.
    pub async fn find_cost_center_by_code_or_name<'e, E>(
        &self,
        executor: E,
        value: &str,
    ) -> Result<Option<CostCenter>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, CostCenter>(
            r#"
            SELECT * FROM cost_centers
            WHERE LOWER(code) = LOWER($1) OR LOWER(name) = LOWER($1)
            ORDER BY (LOWER(code) = LOWER($1)) DESC
            LIMIT 1
            "#,
        )
        .bind(value.trim())
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    pub async fn create_cost_center(&self, p: &CostCenterPayload) -> Result<CostCenter, AppError> {
        sqlx::query_as::<_, CostCenter>(
            "INSERT INTO cost_centers (code, name, description) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(p.code.trim())
        .bind(&p.name)
        .bind(&p.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, &format!("Cost center '{}'", p.code)))
    }

    pub async fn update_cost_center(
        &self,
        id: Uuid,
        p: &UpdateCostCenterPayload,
    ) -> Result<Option<CostCenter>, AppError> {
        sqlx::query_as::<_, CostCenter>(
            r#"
            UPDATE cost_centers SET
                code = COALESCE($2, code),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(p.code.as_deref().map(str::trim))
        .bind(&p.name)
        .bind(&p.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, "Cost center code"))
    }

    pub async fn delete_cost_center(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM cost_centers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_db(e, "Cost center"))?;
        Ok(result.rows_affected() > 0)
    }
}
