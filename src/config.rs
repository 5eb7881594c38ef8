// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        DeliveryRepository, ManualPartsRepository, PartRepository, ReferenceRepository,
        StaffRepository, UserRepository, WorkOrderRepository,
    },
    services::{
        auth::AuthService,
        catalog_service::CatalogService,
        delivery_service::DeliveryService,
        document_service::DocumentService,
        import_service::ImportService,
        mail::{HttpMailer, LogMailer, Mailer},
        manual_parts_service::ManualPartsService,
        part_service::PartService,
        realtime::Notifier,
        work_order_service::WorkOrderService,
    },
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
    pub font_dir: String,
    pub mail_api_url: Option<String>,
    pub mail_api_key: Option<String>,
    pub mail_from: String,
    pub db_max_connections: u32,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T> {
    match optional(name) {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} tem valor inválido: '{}'", name, v)),
        None => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            session_ttl_hours: parsed("SESSION_TTL_HOURS", 12)?,
            cookie_secure: parsed("COOKIE_SECURE", false)?,
            font_dir: optional("FONT_DIR").unwrap_or_else(|| "./fonts".to_string()),
            mail_api_url: optional("MAIL_API_URL"),
            mail_api_key: optional("MAIL_API_KEY"),
            mail_from: optional("MAIL_FROM").unwrap_or_else(|| "parts-tracker@localhost".to_string()),
            db_max_connections: parsed("DB_MAX_CONNECTIONS", 5)?,
            admin_username: optional("ADMIN_USERNAME"),
            admin_password: optional("ADMIN_PASSWORD"),
        })
    }

    fn mailer(&self) -> Arc<dyn Mailer> {
        match &self.mail_api_url {
            Some(url) => Arc::new(HttpMailer::new(
                url.clone(),
                self.mail_api_key.clone(),
                self.mail_from.clone(),
            )),
            None => {
                tracing::warn!("MAIL_API_URL não definida; e-mails só vão para o log");
                Arc::new(LogMailer)
            }
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<AppConfig>,
    pub notifier: Notifier,
    pub auth_service: AuthService,
    pub part_service: PartService,
    pub catalog_service: CatalogService,
    pub delivery_service: DeliveryService,
    pub work_order_service: WorkOrderService,
    pub manual_parts_service: ManualPartsService,
    pub import_service: ImportService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let mailer = config.mailer();
        Ok(Self::build(config, db_pool, mailer))
    }

    /// Monta o gráfico de dependências sobre um pool já criado.
    pub fn build(config: AppConfig, db_pool: PgPool, mailer: Arc<dyn Mailer>) -> Self {
        let notifier = Notifier::new();

        let user_repo = UserRepository::new(db_pool.clone());
        let part_repo = PartRepository::new(db_pool.clone());
        let reference_repo = ReferenceRepository::new(db_pool.clone());
        let staff_repo = StaffRepository::new(db_pool.clone());
        let delivery_repo = DeliveryRepository::new(db_pool.clone());
        let work_order_repo = WorkOrderRepository::new(db_pool.clone());
        let manual_repo = ManualPartsRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo,
            config.jwt_secret.clone(),
            chrono::Duration::hours(config.session_ttl_hours),
            db_pool.clone(),
        );
        let part_service = PartService::new(db_pool.clone(), part_repo.clone(), notifier.clone());
        let catalog_service = CatalogService::new(
            db_pool.clone(),
            reference_repo.clone(),
            staff_repo.clone(),
            notifier.clone(),
        );
        let delivery_service = DeliveryService::new(
            db_pool.clone(),
            part_repo.clone(),
            staff_repo.clone(),
            delivery_repo,
            notifier.clone(),
            mailer,
        );
        let work_order_service = WorkOrderService::new(
            db_pool.clone(),
            work_order_repo,
            part_repo.clone(),
            notifier.clone(),
        );
        let manual_parts_service = ManualPartsService::new(
            db_pool.clone(),
            manual_repo,
            part_repo.clone(),
            notifier.clone(),
        );
        let import_service = ImportService::new(
            db_pool.clone(),
            staff_repo,
            reference_repo,
            part_repo,
            notifier.clone(),
        );
        let document_service = DocumentService::new(config.font_dir.clone());

        Self {
            db_pool,
            config: Arc::new(config),
            notifier,
            auth_service,
            part_service,
            catalog_service,
            delivery_service,
            work_order_service,
            manual_parts_service,
            import_service,
            document_service,
        }
    }
}
