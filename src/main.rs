//src/main.rs

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use parts_tracker::{build_router, config::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG sobrescreve; padrão é info para o app e warn para o resto
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,parts_tracker=info,tower_http=info")),
        )
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .context("Falha ao inicializar o estado da aplicação")?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados")?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Primeiro acesso: cria o admin se ADMIN_USERNAME/ADMIN_PASSWORD vierem no ambiente
    if let (Some(username), Some(password)) = (
        app_state.config.admin_username.as_deref(),
        app_state.config.admin_password.as_deref(),
    ) {
        app_state
            .auth_service
            .bootstrap_admin(username, password)
            .await
            .context("Falha ao criar o usuário admin inicial")?;
    }

    // Sessões expiradas saem da tabela de hora em hora
    let auth_service = app_state.auth_service.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
        loop {
            interval.tick().await;
            match auth_service.purge_expired_sessions().await {
                Ok(0) => {}
                Ok(n) => tracing::info!("🧹 {} sessões expiradas removidas", n),
                Err(e) => tracing::warn!("Falha ao limpar sessões expiradas: {}", e),
            }
        }
    });

    let bind_addr = app_state.config.bind_addr.clone();
    let app = build_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", bind_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Erro no servidor Axum")?;
    Ok(())
}
