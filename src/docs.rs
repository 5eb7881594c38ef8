// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::middleware::auth::SESSION_COOKIE;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::current_user,
        handlers::auth::health,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::list_technicians,
        handlers::users::create_technician,
        handlers::users::update_technician,
        handlers::users::delete_technician,

        // --- Parts ---
        handlers::parts::list_parts,
        handlers::parts::create_part,
        handlers::parts::get_part,
        handlers::parts::update_part,
        handlers::parts::delete_part,
        handlers::parts::low_stock,
        handlers::parts::usage_analytics,
        handlers::parts::export_parts,
        handlers::parts::parts_template,
        handlers::parts::import_parts,

        // --- Catalog ---
        handlers::catalog::list_buildings,
        handlers::catalog::create_building,
        handlers::catalog::update_building,
        handlers::catalog::delete_building,
        handlers::catalog::list_cost_centers,
        handlers::catalog::create_cost_center,
        handlers::catalog::update_cost_center,
        handlers::catalog::delete_cost_center,
        handlers::catalog::list_staff,
        handlers::catalog::create_staff,
        handlers::catalog::update_staff,
        handlers::catalog::delete_staff,
        handlers::catalog::export_staff,
        handlers::catalog::staff_template,
        handlers::catalog::import_staff,

        // --- Deliveries ---
        handlers::deliveries::list_deliveries,
        handlers::deliveries::create_delivery,
        handlers::deliveries::create_bulk_delivery,
        handlers::deliveries::get_delivery,
        handlers::deliveries::monthly_total,
        handlers::deliveries::confirm_delivery,
        handlers::deliveries::cancel_delivery,
        handlers::deliveries::delivery_receipt,
        handlers::deliveries::export_deliveries,
        handlers::deliveries::excel_final,

        // --- Work orders ---
        handlers::work_orders::list_work_orders,
        handlers::work_orders::create_work_order,
        handlers::work_orders::get_work_order,
        handlers::work_orders::update_work_order,
        handlers::work_orders::work_order_parts,
        handlers::work_orders::record_parts_used,

        // --- Manual parts ---
        handlers::manual_parts::list_entries,
        handlers::manual_parts::approve_entry,
        handlers::manual_parts::delete_entry,
        handlers::manual_parts::kiosk_scan,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::LoginPayload,
            models::auth::CreateUserPayload,
            models::auth::CreateTechnicianPayload,
            models::auth::UpdateTechnicianPayload,

            // --- Parts ---
            models::parts::Part,
            models::parts::CreatePartPayload,
            models::parts::UpdatePartPayload,
            models::parts::MonthlyUsage,
            models::parts::TopPartUsage,
            models::parts::UsageAnalytics,

            // --- Catalog ---
            models::reference::Building,
            models::reference::BuildingPayload,
            models::reference::UpdateBuildingPayload,
            models::reference::CostCenter,
            models::reference::CostCenterPayload,
            models::reference::UpdateCostCenterPayload,
            models::reference::StaffMember,
            models::reference::StaffMemberDetail,
            models::reference::StaffPayload,
            models::reference::UpdateStaffPayload,

            // --- Deliveries ---
            models::delivery::DeliveryStatus,
            models::delivery::PartsDelivery,
            models::delivery::DeliveryDetail,
            models::delivery::CreateDeliveryPayload,
            models::delivery::BulkDeliveryItem,
            models::delivery::BulkDeliveryPayload,
            models::delivery::ConfirmDeliveryPayload,
            models::delivery::MonthlyTotal,
            models::delivery::CostCenterSummary,

            // --- Work orders ---
            models::work_order::WorkOrderStatus,
            models::work_order::WorkOrderPriority,
            models::work_order::WorkOrder,
            models::work_order::CreateWorkOrderPayload,
            models::work_order::WorkOrderPatch,
            models::work_order::PartsUsed,
            models::work_order::PartsUsedDetail,
            models::work_order::CreatePartsUsedPayload,

            // --- Manual parts ---
            models::manual_parts::ManualEntryStatus,
            models::manual_parts::ManualPartsEntry,
            models::manual_parts::KioskScanPayload,
            models::manual_parts::KioskScanResult,
            models::manual_parts::ApproveEntryPayload,
            models::manual_parts::ApprovedEntry,

            // --- Import ---
            models::import::ImportRowError,
            models::import::ImportSummary,
        )
    ),
    tags(
        (name = "Auth", description = "Login, logout e sessão atual"),
        (name = "Health", description = "Verificação de vida"),
        (name = "Users", description = "Usuários e técnicos"),
        (name = "Parts", description = "Estoque de peças, importação e análise de uso"),
        (name = "Catalog", description = "Prédios, centros de custo e funcionários"),
        (name = "Deliveries", description = "Entregas de peças, recibos e relatórios"),
        (name = "Work Orders", description = "Ordens de serviço e peças usadas"),
        (name = "Manual Parts", description = "Quiosque e fila de revisão de leituras")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
        );
        // Clientes fora do navegador mandam o mesmo token como Bearer
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
