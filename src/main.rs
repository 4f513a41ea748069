//! Pixel Cover Back binary entrypoint wiring the catalog, the score store, REST and SSE layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixel_cover_back::{
    config::AppConfig,
    dao::{
        catalog::CatalogGateway,
        score_store::{
            ScoreStore,
            file::{FileScoreStore, FileStoreConfig},
        },
    },
    routes,
    services::sse_service,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let catalog = build_catalog()?;

    let store = FileScoreStore::new(FileStoreConfig::new(config.score_path().clone()));
    let (score, degraded) = match store.load().await {
        Ok(score) => {
            info!(score, path = %store.path().display(), "loaded saved score");
            (score, false)
        }
        Err(err) => {
            warn!(error = %err, "failed to load saved score; starting from zero");
            (0, true)
        }
    };

    let app_state = AppState::new(config, catalog, Arc::new(store), score);
    app_state.set_degraded(degraded);
    tokio::spawn(sse_service::forward_degraded_status(app_state.clone()));

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Connect the music catalog selected at compile time.
#[cfg(feature = "spotify-catalog")]
fn build_catalog() -> anyhow::Result<Arc<dyn CatalogGateway>> {
    use pixel_cover_back::dao::catalog::spotify::{SpotifyCatalog, config::SpotifyConfig};

    let config = SpotifyConfig::from_env().context("reading Spotify configuration")?;
    info!(api = %config.api_url, market = %config.market, "using the Spotify catalog");
    let catalog = SpotifyCatalog::new(config).context("building Spotify client")?;
    Ok(Arc::new(catalog))
}

#[cfg(not(feature = "spotify-catalog"))]
fn build_catalog() -> anyhow::Result<Arc<dyn CatalogGateway>> {
    anyhow::bail!("no catalog backend compiled in; enable the `spotify-catalog` feature")
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
