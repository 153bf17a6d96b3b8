use image_lookup_relay::{
    api::{build_router, init_app_state},
    config::{Config, LoggingConfig},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.is_json() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    init_tracing(&config.logging);

    let address = config.server.bind_address();
    let max_body_bytes = config.server.max_body_bytes;

    let state = init_app_state(config)?;
    let router = build_router(state, max_body_bytes);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Server is running and listening on {}", address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
