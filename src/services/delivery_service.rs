// src/services/delivery_service.rs

use std::sync::Arc;

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::{error::AppError, month::MonthRange},
    db::{delivery_repo::NewDelivery, DeliveryRepository, PartRepository, StaffRepository},
    models::delivery::{
        sort_deliveries, BulkDeliveryPayload, CreateDeliveryPayload, DeliveryDetail, DeliveryQuery,
        DeliveryStatus, MonthlyTotal, PartsDelivery,
    },
    services::{
        mail::{delivery_confirmed_email, Mailer},
        realtime::Notifier,
    },
};

#[derive(Clone)]
pub struct DeliveryService {
    pool: PgPool,
    part_repo: PartRepository,
    staff_repo: StaffRepository,
    delivery_repo: DeliveryRepository,
    notifier: Notifier,
    mailer: Arc<dyn Mailer>,
}

/// Envia o comprovante, se houver e-mail. Falha de envio só vai para o log.
pub async fn send_confirmation(mailer: &dyn Mailer, detail: &DeliveryDetail) -> bool {
    let Some(message) = delivery_confirmed_email(detail) else {
        return false;
    };
    match mailer.send(message).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Falha ao enviar e-mail da entrega {}: {:?}", detail.delivery.id, e);
            false
        }
    }
}

impl DeliveryService {
    pub fn new(
        pool: PgPool,
        part_repo: PartRepository,
        staff_repo: StaffRepository,
        delivery_repo: DeliveryRepository,
        notifier: Notifier,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            pool,
            part_repo,
            staff_repo,
            delivery_repo,
            notifier,
            mailer,
        }
    }

    /// Baixa de estoque + registro da entrega, dentro da transação recebida.
    async fn issue(
        &self,
        conn: &mut PgConnection,
        p: &CreateDeliveryPayload,
        delivered_by: Uuid,
    ) -> Result<PartsDelivery, AppError> {
        let staff = self
            .staff_repo
            .find_by_id(&mut *conn, p.staff_member_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Staff member".into()))?;

        let part = self
            .part_repo
            .find_for_update(&mut *conn, p.part_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Part".into()))?;

        let insufficient = || AppError::InsufficientStock {
            part: part.part_id.clone(),
            available: part.quantity,
            requested: p.quantity,
        };
        if part.quantity < p.quantity {
            return Err(insufficient());
        }
        if !self.part_repo.decrement_stock(&mut *conn, part.id, p.quantity).await? {
            return Err(insufficient());
        }

        self.delivery_repo
            .insert(
                &mut *conn,
                &NewDelivery {
                    part_id: part.id,
                    quantity: p.quantity,
                    staff_member_id: staff.id,
                    building_id: p.building_id.or(staff.building_id),
                    cost_center_id: p.cost_center_id.or(staff.cost_center_id),
                    delivered_by_id: delivered_by,
                    notes: p.notes.as_deref(),
                    project_code: p.project_code.as_deref(),
                    unit_cost: part.unit_cost,
                },
            )
            .await
    }

    pub async fn create(&self, p: &CreateDeliveryPayload, delivered_by: Uuid) -> Result<PartsDelivery, AppError> {
        let mut tx = self.pool.begin().await?;
        let delivery = self.issue(&mut *tx, p, delivered_by).await?;
        tx.commit().await?;

        tracing::info!(
            "📦 Entrega {} criada: {} un. da peça {}",
            delivery.id,
            delivery.quantity,
            delivery.part_id
        );
        self.notifier.data_changed("parts-delivery");
        self.notifier.data_changed("parts");
        Ok(delivery)
    }

    /// Tudo ou nada: faltou estoque em um item, nenhum é gravado.
    /// Peças repetidas viram uma entrega só; as travas seguem a ordem de `part_id`.
    pub async fn create_bulk(
        &self,
        p: &BulkDeliveryPayload,
        delivered_by: Uuid,
    ) -> Result<Vec<PartsDelivery>, AppError> {
        let items = p.lock_order();
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(items.len());
        for item in &items {
            let single = p.to_single(item);
            created.push(self.issue(&mut *tx, &single, delivered_by).await?);
        }
        tx.commit().await?;

        tracing::info!("📦 {} entregas criadas em lote", created.len());
        self.notifier.data_changed("parts-delivery");
        self.notifier.data_changed("parts");
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<DeliveryDetail, AppError> {
        self.delivery_repo
            .find_detail(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Delivery".into()))
    }

    pub async fn confirm(&self, id: Uuid, signature: &str) -> Result<DeliveryDetail, AppError> {
        if self.delivery_repo.confirm(id, signature).await?.is_none() {
            let current = self.get(id).await?;
            return Err(AppError::Conflict(format!(
                "Delivery is already {}",
                current.delivery.status.as_str()
            )));
        }

        let detail = self.get(id).await?;
        tracing::info!("✍️ Entrega {} confirmada por {}", id, detail.staff_name);

        send_confirmation(self.mailer.as_ref(), &detail).await;
        self.notifier.data_changed("parts-delivery");
        Ok(detail)
    }

    /// Só pendentes; devolve a quantidade ao estoque na mesma transação.
    pub async fn cancel(&self, id: Uuid) -> Result<PartsDelivery, AppError> {
        let mut tx = self.pool.begin().await?;

        let delivery = self
            .delivery_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Delivery".into()))?;

        if delivery.status != DeliveryStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Only pending deliveries can be cancelled (current: {})",
                delivery.status.as_str()
            )));
        }

        self.part_repo
            .increment_stock(&mut *tx, delivery.part_id, delivery.quantity)
            .await?;
        let cancelled = self
            .delivery_repo
            .set_status(&mut *tx, id, DeliveryStatus::Cancelled)
            .await?;

        tx.commit().await?;

        tracing::info!("↩️ Entrega {} cancelada, {} un. devolvidas", id, delivery.quantity);
        self.notifier.data_changed("parts-delivery");
        self.notifier.data_changed("parts");
        Ok(cancelled)
    }

    /// Linhas do relatório. A tela e as exportações usam esta mesma função.
    pub async fn report(&self, q: &DeliveryQuery) -> Result<Vec<DeliveryDetail>, AppError> {
        let month = match q.month.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            Some(m) => Some(MonthRange::parse(m)?),
            None => None,
        };
        let mut rows = self.delivery_repo.list_details(month.as_ref(), q).await?;
        sort_deliveries(&mut rows, q.sort, q.direction());
        Ok(rows)
    }

    pub async fn monthly_total(&self, month: &MonthRange) -> Result<MonthlyTotal, AppError> {
        let (deliveries, units, total_cost) = self
            .delivery_repo
            .totals_between(month.start, month.end)
            .await?;
        Ok(MonthlyTotal {
            month: month.label(),
            deliveries,
            units,
            total_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::delivery::tests::detail;
    use crate::services::mail::{tests::RecordingMailer, EmailMessage};
    use async_trait::async_trait;

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _message: EmailMessage) -> anyhow::Result<()> {
            anyhow::bail!("mail API unavailable")
        }
    }

    #[tokio::test]
    async fn confirmation_sends_exactly_one_email() {
        let mailer = RecordingMailer::default();
        let mut d = detail("filter", 2, None, 5);
        d.staff_email = Some("tech@onu.edu".into());

        assert!(send_confirmation(&mailer, &d).await);
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "tech@onu.edu");
    }

    #[tokio::test]
    async fn confirmation_without_email_sends_nothing() {
        let mailer = RecordingMailer::default();
        let d = detail("filter", 2, None, 5);
        assert!(!send_confirmation(&mailer, &d).await);
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn mail_failure_is_swallowed() {
        let mut d = detail("filter", 2, None, 5);
        d.staff_email = Some("tech@onu.edu".into());
        assert!(!send_confirmation(&FailingMailer, &d).await);
    }
}
