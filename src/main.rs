//src/main.rs

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use forecast_backend::{config::AppState, routes::build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controla o nível; sem ela, "info"
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .context("Falha ao inicializar o estado da aplicação.")?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados.")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let bind_addr = app_state.config.bind_addr.clone();
    tracing::info!(mode = ?app_state.config.runtime_mode, "modo de execução");

    let app = build_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {bind_addr}"))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    tracing::info!("📚 Swagger UI em /swagger-ui");

    // ConnectInfo alimenta o IP usado nos logs e na auditoria
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("Erro no servidor Axum")?;

    Ok(())
}
