use std::{env, net::SocketAddr};
use survey_web::{resolve_backend_url, resolve_refresh_interval, router, AppState, Backend};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let backend_url = resolve_backend_url();
    info!("survey backend at {backend_url}");
    let state = AppState::new(Backend::new(backend_url));

    // Periodic stats refresh. The first fetch happens lazily on the first
    // dashboard visit; overlapping refreshes are harmless, last write wins.
    let refresher = state.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(resolve_refresh_interval());
        ticker.tick().await;
        loop {
            ticker.tick().await;
            refresher.refresh_stats().await;
        }
    });

    let app = router(state);

    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
    }
}
