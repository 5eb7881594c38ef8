// Fluxos de estoque contra um Postgres real. Sem `DATABASE_URL`, os testes
// retornam sem fazer nada.

use std::sync::Arc;

use parts_tracker::{
    common::error::AppError,
    config::{AppConfig, AppState},
    models::{
        auth::Role,
        delivery::{CreateDeliveryPayload, DeliveryStatus},
        parts::CreatePartPayload,
        reference::{BuildingPayload, StaffPayload},
    },
    services::mail::LogMailer,
};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

async fn state() -> Option<AppState> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL não definido; pulando");
        return None;
    };
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&database_url)
        .await
        .expect("connect");
    sqlx::migrate!().run(&pool).await.expect("migrations");

    let config = AppConfig {
        database_url,
        jwt_secret: "test-secret".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        session_ttl_hours: 12,
        cookie_secure: false,
        font_dir: "./fonts".to_string(),
        mail_api_url: None,
        mail_api_key: None,
        mail_from: "parts-tracker@localhost".to_string(),
        db_max_connections: 4,
        admin_username: None,
        admin_password: None,
    };
    Some(AppState::build(config, pool, Arc::new(LogMailer)))
}

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, &Uuid::new_v4().simple().to_string()[..8])
}

async fn part_quantity(state: &AppState, id: Uuid) -> i32 {
    state.part_service.get(id).await.expect("part").quantity
}

async fn delivery_count(state: &AppState, part_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM parts_delivery WHERE part_id = $1")
        .bind(part_id)
        .fetch_one(&state.db_pool)
        .await
        .expect("count")
}

#[tokio::test]
async fn delivery_decrements_stock_and_confirm_marks_delivered() {
    let Some(state) = state().await else { return };

    let technician = state
        .auth_service
        .create_user(&unique("tech"), "secret123", "Tech", Role::Technician, None)
        .await
        .expect("user");
    let part = state
        .part_service
        .create(&CreatePartPayload {
            part_id: unique("FLT"),
            name: "Filter".into(),
            description: None,
            quantity: 5,
            reorder_level: 1,
            unit_cost: None,
            category: None,
            location: None,
            shelf: None,
        })
        .await
        .expect("part");
    let staff = state
        .catalog_service
        .create_staff(&StaffPayload {
            name: unique("Staff"),
            building_id: None,
            cost_center_id: None,
            email: None,
            phone: None,
        })
        .await
        .expect("staff");

    let payload = CreateDeliveryPayload {
        part_id: part.id,
        quantity: 3,
        staff_member_id: staff.id,
        building_id: None,
        cost_center_id: None,
        notes: None,
        project_code: None,
    };
    let delivery = state
        .delivery_service
        .create(&payload, technician.id)
        .await
        .expect("delivery");
    assert_eq!(delivery.status, DeliveryStatus::Pending);
    assert_eq!(part_quantity(&state, part.id).await, 2);

    // Sem estoque: nada muda, nenhuma linha nova
    let err = state
        .delivery_service
        .create(&payload, technician.id)
        .await
        .expect_err("insufficient stock");
    assert!(matches!(err, AppError::InsufficientStock { available: 2, requested: 3, .. }));
    assert_eq!(part_quantity(&state, part.id).await, 2);
    assert_eq!(delivery_count(&state, part.id).await, 1);

    let confirmed = state
        .delivery_service
        .confirm(delivery.id, "data:image/png;base64,AAAA")
        .await
        .expect("confirm");
    assert_eq!(confirmed.delivery.status, DeliveryStatus::Delivered);
    assert!(confirmed.delivery.confirmed_at.is_some());
    assert_eq!(confirmed.delivery.signature.as_deref(), Some("data:image/png;base64,AAAA"));

    let again = state
        .delivery_service
        .confirm(delivery.id, "data:image/png;base64,BBBB")
        .await
        .expect_err("already delivered");
    assert!(matches!(again, AppError::Conflict(_)));
}

#[tokio::test]
async fn staff_import_reports_unknown_building_as_row_error() {
    let Some(state) = state().await else { return };

    let building = state
        .catalog_service
        .create_building(&BuildingPayload {
            name: unique("Hall"),
            location: None,
            description: None,
        })
        .await
        .expect("building");

    let csv = format!(
        "Name,Building\n{},{}\n{},{}\n",
        unique("Ana"),
        building.name,
        unique("Bob"),
        unique("Nowhere")
    );
    let summary = state
        .import_service
        .import_staff("staff.csv", csv.as_bytes())
        .await
        .expect("import");

    assert_eq!(summary.total_rows, 2);
    assert_eq!(summary.imported_rows, 1);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].row, 3);
}
