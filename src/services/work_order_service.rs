// src/services/work_order_service.rs

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{PartRepository, WorkOrderRepository},
    models::work_order::{
        generate_work_order_code, CreatePartsUsedPayload, CreateWorkOrderPayload, PartsUsed,
        PartsUsedDetail, WorkOrder, WorkOrderPatch, WorkOrderQuery,
    },
    services::realtime::Notifier,
};

#[derive(Clone)]
pub struct WorkOrderService {
    pool: PgPool,
    work_order_repo: WorkOrderRepository,
    part_repo: PartRepository,
    notifier: Notifier,
}

impl WorkOrderService {
    pub fn new(
        pool: PgPool,
        work_order_repo: WorkOrderRepository,
        part_repo: PartRepository,
        notifier: Notifier,
    ) -> Self {
        Self {
            pool,
            work_order_repo,
            part_repo,
            notifier,
        }
    }

    pub async fn list(&self, q: &WorkOrderQuery) -> Result<Vec<WorkOrder>, AppError> {
        self.work_order_repo.list(q).await
    }

    pub async fn get(&self, id: Uuid) -> Result<WorkOrder, AppError> {
        self.work_order_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Work order".into()))
    }

    pub async fn create(&self, p: &CreateWorkOrderPayload) -> Result<WorkOrder, AppError> {
        let code = generate_work_order_code();
        let wo = self.work_order_repo.create(&code, p).await?;
        tracing::info!("🛠️ Ordem de serviço {} criada", wo.work_order_id);
        self.notifier.data_changed("work-orders");
        Ok(wo)
    }

    pub async fn update(&self, id: Uuid, patch: WorkOrderPatch) -> Result<WorkOrder, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut wo = self
            .work_order_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Work order".into()))?;

        let previous = wo.status;
        patch.apply(&mut wo, Utc::now());
        let saved = self.work_order_repo.save(&mut *tx, &wo).await?;

        tx.commit().await?;

        if previous != saved.status {
            tracing::info!(
                "🛠️ Ordem {}: {:?} -> {:?}",
                saved.work_order_id,
                previous,
                saved.status
            );
        }
        self.notifier.data_changed("work-orders");
        Ok(saved)
    }

    pub async fn parts_for(&self, work_order_id: Uuid) -> Result<Vec<PartsUsedDetail>, AppError> {
        // 404 para ordem inexistente, em vez de lista vazia
        self.get(work_order_id).await?;
        self.work_order_repo.list_parts_used(work_order_id).await
    }

    /// Baixa de estoque + registro do uso, na mesma transação.
    pub async fn record_parts_used(
        &self,
        p: &CreatePartsUsedPayload,
        issued_by: Uuid,
    ) -> Result<PartsUsed, AppError> {
        let mut tx = self.pool.begin().await?;

        self.work_order_repo
            .find_by_id(&mut *tx, p.work_order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Work order".into()))?;

        let part = self
            .part_repo
            .find_for_update(&mut *tx, p.part_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Part".into()))?;

        if !self.part_repo.decrement_stock(&mut *tx, part.id, p.quantity).await? {
            return Err(AppError::InsufficientStock {
                part: part.part_id,
                available: part.quantity,
                requested: p.quantity,
            });
        }

        let used = self
            .work_order_repo
            .insert_parts_used(&mut *tx, p.work_order_id, part.id, p.quantity, issued_by)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "🔩 {} un. de {} usadas na ordem {}",
            used.quantity,
            part.part_id,
            used.work_order_id
        );
        self.notifier.data_changed("parts");
        self.notifier.data_changed("work-orders");
        Ok(used)
    }
}
