// src/services/catalog_service.rs
//
// Cadastros de apoio: prédios, centros de custo e funcionários.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ReferenceRepository, StaffRepository},
    models::reference::{
        Building, BuildingPayload, CostCenter, CostCenterPayload, StaffMember, StaffMemberDetail,
        StaffPayload, UpdateBuildingPayload, UpdateCostCenterPayload, UpdateStaffPayload,
    },
    services::realtime::Notifier,
};

#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
    reference_repo: ReferenceRepository,
    staff_repo: StaffRepository,
    notifier: Notifier,
}

impl CatalogService {
    pub fn new(
        pool: PgPool,
        reference_repo: ReferenceRepository,
        staff_repo: StaffRepository,
        notifier: Notifier,
    ) -> Self {
        Self {
            pool,
            reference_repo,
            staff_repo,
            notifier,
        }
    }

    // --- Prédios ---

    pub async fn list_buildings(&self) -> Result<Vec<Building>, AppError> {
        self.reference_repo.list_buildings().await
    }

    pub async fn create_building(&self, p: &BuildingPayload) -> Result<Building, AppError> {
        let b = self.reference_repo.create_building(p).await?;
        self.notifier.data_changed("buildings");
        Ok(b)
    }

    pub async fn update_building(&self, id: Uuid, p: &UpdateBuildingPayload) -> Result<Building, AppError> {
        let b = self
            .reference_repo
            .update_building(id, p)
            .await?
            .ok_or_else(|| AppError::NotFound("Building".into()))?;
        self.notifier.data_changed("buildings");
        Ok(b)
    }

    pub async fn delete_building(&self, id: Uuid) -> Result<(), AppError> {
        if !self.reference_repo.delete_building(id).await? {
            return Err(AppError::NotFound("Building".into()));
        }
        self.notifier.data_changed("buildings");
        Ok(())
    }

    // --- Centros de custo ---

    pub async fn list_cost_centers(&self) -> Result<Vec<CostCenter>, AppError> {
        self.reference_repo.list_cost_centers().await
    }

    pub async fn create_cost_center(&self, p: &CostCenterPayload) -> Result<CostCenter, AppError> {
        let c = self.reference_repo.create_cost_center(p).await?;
        self.notifier.data_changed("cost-centers");
        Ok(c)
    }

    pub async fn update_cost_center(
        &self,
        id: Uuid,
        p: &UpdateCostCenterPayload,
    ) -> Result<CostCenter, AppError> {
        let c = self
            .reference_repo
            .update_cost_center(id, p)
            .await?
            .ok_or_else(|| AppError::NotFound("Cost center".into()))?;
        self.notifier.data_changed("cost-centers");
        Ok(c)
    }

    pub async fn delete_cost_center(&self, id: Uuid) -> Result<(), AppError> {
        if !self.reference_repo.delete_cost_center(id).await? {
            return Err(AppError::NotFound("Cost center".into()));
        }
        self.notifier.data_changed("cost-centers");
        Ok(())
    }

    // --- Funcionários ---

    pub async fn list_staff(&self) -> Result<Vec<StaffMemberDetail>, AppError> {
        self.staff_repo.list().await
    }

    pub async fn create_staff(&self, p: &StaffPayload) -> Result<StaffMember, AppError> {
        let s = self.staff_repo.create(&self.pool, p).await?;
        tracing::info!("👷 Funcionário '{}' cadastrado", s.name);
        self.notifier.data_changed("staff");
        Ok(s)
    }

    pub async fn update_staff(&self, id: Uuid, p: &UpdateStaffPayload) -> Result<StaffMember, AppError> {
        let s = self
            .staff_repo
            .update(id, p)
            .await?
            .ok_or_else(|| AppError::NotFound("Staff member".into()))?;
        self.notifier.data_changed("staff");
        Ok(s)
    }

    pub async fn delete_staff(&self, id: Uuid) -> Result<(), AppError> {
        if !self.staff_repo.delete(id).await? {
            return Err(AppError::NotFound("Staff member".into()));
        }
        self.notifier.data_changed("staff");
        Ok(())
    }
}
