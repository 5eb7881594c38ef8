// src/db/part_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::parts::{CreatePartPayload, MonthlyUsage, Part, PartQuery, TopPartUsage, UpdatePartPayload},
};

#[derive(Clone)]
pub struct PartRepository {
    pool: PgPool,
}

impl PartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    pub async fn list(&self, query: &PartQuery) -> Result<Vec<Part>, AppError> {
        // ORDER BY vem de `order_by()`, que só monta colunas conhecidas.
        let sql = format!(
            r#"
            SELECT * FROM parts
            WHERE ($1::text IS NULL
                   OR part_id ILIKE '%' || $1 || '%'
                   OR name ILIKE '%' || $1 || '%'
                   OR description ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR category = $2)
            ORDER BY {}
            "#,
            query.order_by()
        );
        let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let category = query.category.as_deref().filter(|s| !s.is_empty());

        let parts = sqlx::query_as::<_, Part>(&sql)
            .bind(search)
            .bind(category)
            .fetch_all(&self.pool)
            .await?;
        Ok(parts)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Part>, AppError> {
        let part = sqlx::query_as::<_, Part>("SELECT * FROM parts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(part)
    }

    pub async fn find_by_code<'e, E>(&self, executor: E, code: &str) -> Result<Option<Part>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let part = sqlx::query_as::<_, Part>("SELECT * FROM parts WHERE part_id = $1")
            .bind(code.trim())
            .fetch_optional(executor)
            .await?;
        Ok(part)
    }

    /// Trava a linha até o fim da transação.
    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Part>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let part = sqlx::query_as::<_, Part>("SELECT * FROM parts WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(part)
    }

    pub async fn low_stock(&self) -> Result<Vec<Part>, AppError> {
        let parts = sqlx::query_as::<_, Part>(
            "SELECT * FROM parts WHERE quantity <= reorder_level ORDER BY quantity ASC, part_id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(parts)
    }

    pub async fn low_stock_count(&self) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM parts WHERE quantity <= reorder_level")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    // ---
    // Escrita
    // ---

    pub async fn create<'e, E>(&self, executor: E, p: &CreatePartPayload) -> Result<Part, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Part>(
            r#"
            INSERT INTO parts (part_id, name, description, quantity, reorder_level, unit_cost, category, location, shelf)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(p.part_id.trim())
        .bind(&p.name)
        .bind(&p.description)
        .bind(p.quantity)
        .bind(p.reorder_level)
        .bind(p.unit_cost)
        .bind(&p.category)
        .bind(&p.location)
        .bind(&p.shelf)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_db(e, &format!("Part '{}'", p.part_id)))
    }

    pub async fn update(&self, id: Uuid, p: &UpdatePartPayload) -> Result<Option<Part>, AppError> {
        sqlx::query_as::<_, Part>(
            r#"
            UPDATE parts SET
                part_id = COALESCE($2, part_id),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                quantity = COALESCE($5, quantity),
                reorder_level = COALESCE($6, reorder_level),
                unit_cost = COALESCE($7, unit_cost),
                category = COALESCE($8, category),
                location = COALESCE($9, location),
                shelf = COALESCE($10, shelf),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(p.part_id.as_deref().map(str::trim))
        .bind(&p.name)
        .bind(&p.description)
        .bind(p.quantity)
        .bind(p.reorder_level)
        .bind(p.unit_cost)
        .bind(&p.category)
        .bind(&p.location)
        .bind(&p.shelf)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, "Part ID"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM parts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_db(e, "Part"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Baixa condicional: `false` quando não há saldo suficiente.
    pub async fn decrement_stock<'e, E>(&self, executor: E, id: Uuid, quantity: i32) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE parts SET quantity = quantity - $1, updated_at = NOW()
            WHERE id = $2 AND quantity >= $1
            "#,
        )
        .bind(quantity)
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn increment_stock<'e, E>(&self, executor: E, id: Uuid, quantity: i32) -> Result<Part, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Part>(
            "UPDATE parts SET quantity = quantity + $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(quantity)
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Part".into()))
    }

    /// Importação: cria ou atualiza pelo código da peça.
    pub async fn upsert_by_code<'e, E>(&self, executor: E, p: &CreatePartPayload) -> Result<Part, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let part = sqlx::query_as::<_, Part>(
            r#"
            INSERT INTO parts (part_id, name, description, quantity, reorder_level, unit_cost, category, location, shelf)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (part_id) DO UPDATE SET
                name = EXCLUDED.name,
                description = COALESCE(EXCLUDED.description, parts.description),
                quantity = EXCLUDED.quantity,
                reorder_level = EXCLUDED.reorder_level,
                unit_cost = COALESCE(EXCLUDED.unit_cost, parts.unit_cost),
                category = COALESCE(EXCLUDED.category, parts.category),
                location = COALESCE(EXCLUDED.location, parts.location),
                shelf = COALESCE(EXCLUDED.shelf, parts.shelf),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(p.part_id.trim())
        .bind(&p.name)
        .bind(&p.description)
        .bind(p.quantity)
        .bind(p.reorder_level)
        .bind(p.unit_cost)
        .bind(&p.category)
        .bind(&p.location)
        .bind(&p.shelf)
        .fetch_one(executor)
        .await?;
        Ok(part)
    }

    // ---
    // Analytics
    // ---

    /// Unidades e custo por mês (entregas não canceladas + peças usadas em OS).
    pub async fn usage_by_month(&self, months: i32) -> Result<Vec<MonthlyUsage>, AppError> {
        let rows = sqlx::query_as::<_, MonthlyUsage>(
            r#"
            WITH usage AS (
                SELECT d.delivered_at AS at, d.quantity, COALESCE(d.unit_cost, p.unit_cost, 0) AS unit_cost
                FROM parts_delivery d JOIN parts p ON p.id = d.part_id
                WHERE d.status <> 'cancelled'
                UNION ALL
                SELECT u.issued_at AS at, u.quantity, COALESCE(p.unit_cost, 0) AS unit_cost
                FROM parts_used u JOIN parts p ON p.id = u.part_id
            )
            SELECT
                TO_CHAR(DATE_TRUNC('month', at), 'YYYY-MM') AS month,
                COALESCE(SUM(quantity), 0)::BIGINT AS units,
                COALESCE(SUM(quantity * unit_cost), 0)::NUMERIC(14, 2) AS total_cost
            FROM usage
            WHERE at >= DATE_TRUNC('month', NOW()) - make_interval(months => $1::int - 1)
            GROUP BY 1
            ORDER BY 1 ASC
            "#,
        )
        .bind(months)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn top_parts(&self, months: i32, limit: i64) -> Result<Vec<TopPartUsage>, AppError> {
        let rows = sqlx::query_as::<_, TopPartUsage>(
            r#"
            WITH usage AS (
                SELECT part_id, quantity, unit_cost, delivered_at AS at
                FROM parts_delivery WHERE status <> 'cancelled'
                UNION ALL
                SELECT part_id, quantity, NULL::NUMERIC AS unit_cost, issued_at AS at
                FROM parts_used
            )
            SELECT
                p.id, p.part_id, p.name,
                SUM(u.quantity)::BIGINT AS units,
                COALESCE(SUM(u.quantity * COALESCE(u.unit_cost, p.unit_cost, 0)), 0)::NUMERIC(14, 2) AS total_cost
            FROM usage u JOIN parts p ON p.id = u.part_id
            WHERE u.at >= DATE_TRUNC('month', NOW()) - make_interval(months => $1::int - 1)
            GROUP BY p.id, p.part_id, p.name
            ORDER BY units DESC, p.part_id ASC
            LIMIT $2
            "#,
        )
        .bind(months)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
