//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use rental_backend::config::{AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG manda; sem ele, `info`
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let settings = Settings::from_env()?;
    let sweep_interval = settings.sweep_interval;
    let addr = settings.bind_addr.clone();

    // Se a configuração ou o banco falharem, a aplicação não deve iniciar
    let app_state = AppState::new(settings).await?;

    app_state.sweep_service.clone().spawn_periodic(sweep_interval);
    tracing::info!(?sweep_interval, "🧹 Varredura periódica agendada");

    let app = rental_backend::app(app_state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
