// src/lib.rs

pub mod client;
pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::{access::role_guard, auth::auth_guard};

// Planilhas de importação passam fácil do limite padrão de 2 MB
const UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

/// Monta o router completo. O `main` e os testes de integração usam este mesmo.
pub fn build_router(app_state: AppState) -> Router {
    // Sem sessão
    let public_routes = Router::new()
        .route("/api/health", get(handlers::auth::health))
        .route("/api/login", post(handlers::auth::login))
        .route("/api/logout", post(handlers::auth::logout))
        .route("/api/current-user", get(handlers::auth::current_user))
        .route("/ws", get(handlers::ws::ws_handler));

    let user_routes = Router::new()
        .route(
            "/api/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/api/technicians",
            get(handlers::users::list_technicians).post(handlers::users::create_technician),
        )
        .route(
            "/api/technicians/{id}",
            patch(handlers::users::update_technician).delete(handlers::users::delete_technician),
        );

    let part_routes = Router::new()
        .route(
            "/api/parts",
            get(handlers::parts::list_parts).post(handlers::parts::create_part),
        )
        .route("/api/parts/low-stock", get(handlers::parts::low_stock))
        .route("/api/parts/usage-analytics", get(handlers::parts::usage_analytics))
        .route("/api/parts/export", get(handlers::parts::export_parts))
        .route("/api/parts/template", get(handlers::parts::parts_template))
        .route("/api/parts/import", post(handlers::parts::import_parts))
        .route(
            "/api/parts/{id}",
            get(handlers::parts::get_part)
                .patch(handlers::parts::update_part)
                .delete(handlers::parts::delete_part),
        );

    let catalog_routes = Router::new()
        .route(
            "/api/buildings",
            get(handlers::catalog::list_buildings).post(handlers::catalog::create_building),
        )
        .route(
            "/api/buildings/{id}",
            patch(handlers::catalog::update_building).delete(handlers::catalog::delete_building),
        )
        .route(
            "/api/cost-centers",
            get(handlers::catalog::list_cost_centers).post(handlers::catalog::create_cost_center),
        )
        .route(
            "/api/cost-centers/{id}",
            patch(handlers::catalog::update_cost_center)
                .delete(handlers::catalog::delete_cost_center),
        )
        .route(
            "/api/staff",
            get(handlers::catalog::list_staff).post(handlers::catalog::create_staff),
        )
        .route("/api/staff/export", get(handlers::catalog::export_staff))
        .route("/api/staff/template", get(handlers::catalog::staff_template))
        .route("/api/staff/import", post(handlers::catalog::import_staff))
        .route(
            "/api/staff/{id}",
            patch(handlers::catalog::update_staff).delete(handlers::catalog::delete_staff),
        );

    let delivery_routes = Router::new()
        .route(
            "/api/parts-delivery",
            get(handlers::deliveries::list_deliveries).post(handlers::deliveries::create_delivery),
        )
        .route("/api/parts-delivery/bulk", post(handlers::deliveries::create_bulk_delivery))
        .route(
            "/api/parts-delivery/monthly-total",
            get(handlers::deliveries::monthly_total),
        )
        .route("/api/parts-delivery/export", get(handlers::deliveries::export_deliveries))
        .route("/api/parts-delivery/{id}", get(handlers::deliveries::get_delivery))
        .route(
            "/api/parts-delivery/{id}/confirm",
            post(handlers::deliveries::confirm_delivery),
        )
        .route(
            "/api/parts-delivery/{id}/cancel",
            post(handlers::deliveries::cancel_delivery),
        )
        .route(
            "/api/parts-delivery/{id}/receipt",
            get(handlers::deliveries::delivery_receipt),
        )
        .route("/api/excel-final", get(handlers::deliveries::excel_final));

    let work_order_routes = Router::new()
        .route(
            "/api/work-orders",
            get(handlers::work_orders::list_work_orders)
                .post(handlers::work_orders::create_work_order),
        )
        .route(
            "/api/work-orders/{id}",
            get(handlers::work_orders::get_work_order)
                .patch(handlers::work_orders::update_work_order),
        )
        .route(
            "/api/work-orders/{id}/parts",
            get(handlers::work_orders::work_order_parts),
        )
        .route("/api/parts-used", post(handlers::work_orders::record_parts_used));

    let manual_parts_routes = Router::new()
        .route(
            "/api/manual-parts-review",
            get(handlers::manual_parts::list_entries),
        )
        .route(
            "/api/manual-parts-review/{id}",
            delete(handlers::manual_parts::delete_entry),
        )
        .route(
            "/api/manual-parts-review/{id}/approve",
            post(handlers::manual_parts::approve_entry),
        )
        .route("/api/kiosk/scan", post(handlers::manual_parts::kiosk_scan));

    // O auth_guard roda primeiro (camada mais externa), depois o role_guard
    let protected_routes = Router::new()
        .merge(user_routes)
        .merge(part_routes)
        .merge(catalog_routes)
        .merge(delivery_routes)
        .merge(work_order_routes)
        .merge(manual_parts_routes)
        .route_layer(axum_middleware::from_fn(role_guard))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
