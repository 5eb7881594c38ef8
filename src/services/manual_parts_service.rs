// src/services/manual_parts_service.rs
//
// Quiosque e fila de revisão das leituras manuais.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ManualPartsRepository, PartRepository},
    models::{
        manual_parts::{
            ApproveEntryPayload, ApprovedEntry, KioskScanPayload, KioskScanResult, ManualEntryStatus,
            ManualPartsEntry,
        },
        parts::CreatePartPayload,
    },
    services::realtime::Notifier,
};

#[derive(Clone)]
pub struct ManualPartsService {
    pool: PgPool,
    manual_repo: ManualPartsRepository,
    part_repo: PartRepository,
    notifier: Notifier,
}

/// Peça nova criada a partir de uma leitura aprovada.
fn new_part_from_entry(entry: &ManualPartsEntry, extra: &ApproveEntryPayload) -> CreatePartPayload {
    let name = extra
        .name
        .clone()
        .or_else(|| entry.description.clone())
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| format!("Scanned part {}", entry.scanned_barcode));

    CreatePartPayload {
        part_id: entry.scanned_barcode.clone(),
        name,
        description: entry.description.clone(),
        quantity: entry.quantity,
        reorder_level: 0,
        unit_cost: extra.unit_cost,
        category: extra.category.clone(),
        location: extra.location.clone(),
        shelf: extra.shelf.clone(),
    }
}

impl ManualPartsService {
    pub fn new(
        pool: PgPool,
        manual_repo: ManualPartsRepository,
        part_repo: PartRepository,
        notifier: Notifier,
    ) -> Self {
        Self {
            pool,
            manual_repo,
            part_repo,
            notifier,
        }
    }

    /// Código conhecido devolve a peça; desconhecido entra na fila de revisão.
    pub async fn scan(&self, p: &KioskScanPayload) -> Result<KioskScanResult, AppError> {
        if let Some(part) = self.part_repo.find_by_code(&self.pool, &p.barcode).await? {
            return Ok(KioskScanResult::Found { part });
        }

        let entry = self.manual_repo.create(p).await?;
        tracing::info!("🔎 Código '{}' não cadastrado, enviado para revisão", entry.scanned_barcode);
        self.notifier.data_changed("manual-parts-review");
        Ok(KioskScanResult::Queued { entry })
    }

    pub async fn list(&self, status: Option<ManualEntryStatus>) -> Result<Vec<ManualPartsEntry>, AppError> {
        self.manual_repo.list(status).await
    }

    pub async fn approve(&self, id: Uuid, extra: &ApproveEntryPayload) -> Result<ApprovedEntry, AppError> {
        let mut tx = self.pool.begin().await?;

        let entry = self
            .manual_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Manual parts entry".into()))?;

        if entry.status == ManualEntryStatus::Approved {
            return Err(AppError::Conflict("Entry was already approved".into()));
        }

        let (part, created) = match self.part_repo.find_by_code(&mut *tx, &entry.scanned_barcode).await? {
            Some(existing) => {
                let part = self
                    .part_repo
                    .increment_stock(&mut *tx, existing.id, entry.quantity)
                    .await?;
                (part, false)
            }
            None => {
                let payload = new_part_from_entry(&entry, extra);
                (self.part_repo.create(&mut *tx, &payload).await?, true)
            }
        };

        let entry = self.manual_repo.mark_approved(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(
            "✅ Leitura {} aprovada ({} peça {})",
            id,
            if created { "nova" } else { "estoque de" },
            part.part_id
        );
        self.notifier.data_changed("manual-parts-review");
        self.notifier.data_changed("parts");
        Ok(ApprovedEntry { entry, part, created })
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.manual_repo.delete(id).await? {
            return Err(AppError::NotFound("Manual parts entry".into()));
        }
        self.notifier.data_changed("manual-parts-review");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(description: Option<&str>) -> ManualPartsEntry {
        ManualPartsEntry {
            id: Uuid::new_v4(),
            scanned_barcode: "0042".into(),
            description: description.map(str::to_string),
            quantity: 3,
            technician_used: Some("Sam".into()),
            date_scanned: Utc::now(),
            status: ManualEntryStatus::Pending,
        }
    }

    #[test]
    fn new_part_uses_barcode_as_code() {
        let part = new_part_from_entry(&entry(Some("Door hinge")), &ApproveEntryPayload::default());
        assert_eq!(part.part_id, "0042");
        assert_eq!(part.name, "Door hinge");
        assert_eq!(part.quantity, 3);
    }

    #[test]
    fn explicit_name_wins_and_fallback_exists() {
        let extra = ApproveEntryPayload { name: Some("Hinge, brass".into()), ..Default::default() };
        assert_eq!(new_part_from_entry(&entry(Some("x")), &extra).name, "Hinge, brass");
        assert_eq!(
            new_part_from_entry(&entry(None), &ApproveEntryPayload::default()).name,
            "Scanned part 0042"
        );
    }
}
