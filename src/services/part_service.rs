// src/services/part_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PartRepository,
    models::parts::{CreatePartPayload, Part, PartQuery, UpdatePartPayload, UsageAnalytics},
    services::realtime::Notifier,
};

const DEFAULT_ANALYTICS_MONTHS: i32 = 6;
const MAX_ANALYTICS_MONTHS: i32 = 36;
const TOP_PARTS: i64 = 10;

#[derive(Clone)]
pub struct PartService {
    pool: PgPool,
    part_repo: PartRepository,
    notifier: Notifier,
}

/// Janela de meses das análises, limitada a [1, 36].
pub fn analytics_window(months: Option<i32>) -> i32 {
    months
        .unwrap_or(DEFAULT_ANALYTICS_MONTHS)
        .clamp(1, MAX_ANALYTICS_MONTHS)
}

impl PartService {
    pub fn new(pool: PgPool, part_repo: PartRepository, notifier: Notifier) -> Self {
        Self {
            pool,
            part_repo,
            notifier,
        }
    }

    pub async fn list(&self, q: &PartQuery) -> Result<Vec<Part>, AppError> {
        self.part_repo.list(q).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Part, AppError> {
        self.part_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Part".into()))
    }

    pub async fn create(&self, p: &CreatePartPayload) -> Result<Part, AppError> {
        let part = self.part_repo.create(&self.pool, p).await?;
        tracing::info!("➕ Peça {} cadastrada ({} un.)", part.part_id, part.quantity);
        self.notifier.data_changed("parts");
        Ok(part)
    }

    pub async fn update(&self, id: Uuid, p: &UpdatePartPayload) -> Result<Part, AppError> {
        let part = self
            .part_repo
            .update(id, p)
            .await?
            .ok_or_else(|| AppError::NotFound("Part".into()))?;
        self.notifier.data_changed("parts");
        Ok(part)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.part_repo.delete(id).await? {
            return Err(AppError::NotFound("Part".into()));
        }
        tracing::info!("🗑️ Peça {} removida", id);
        self.notifier.data_changed("parts");
        Ok(())
    }

    pub async fn low_stock(&self) -> Result<Vec<Part>, AppError> {
        self.part_repo.low_stock().await
    }

    pub async fn usage_analytics(&self, months: Option<i32>) -> Result<UsageAnalytics, AppError> {
        let window = analytics_window(months);
        let months = self.part_repo.usage_by_month(window).await?;
        let top_parts = self.part_repo.top_parts(window, TOP_PARTS).await?;
        let low_stock_count = self.part_repo.low_stock_count().await?;
        Ok(UsageAnalytics {
            months,
            top_parts,
            low_stock_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analytics_window_is_clamped() {
        assert_eq!(analytics_window(None), 6);
        assert_eq!(analytics_window(Some(0)), 1);
        assert_eq!(analytics_window(Some(120)), 36);
        assert_eq!(analytics_window(Some(12)), 12);
    }
}
