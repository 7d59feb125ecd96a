use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cities::{config::Config, routes, weather::OpenMeteoClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting city weather service");

    let config = Config::from_env()?;

    let weather_client = OpenMeteoClient::new(&config.weather)?;

    let app_state = cities::build_state(
        &config.database,
        config.session.clone(),
        Arc::new(weather_client),
        config.weather.stale_after_seconds,
        &config.server.seed_file,
    )
    .await?;

    info!("City weather service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    info!("City weather service listening on {}", config.server.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down city weather service");
        })
        .await?;

    Ok(())
}
