use std::time::Duration;

use tracing_subscriber::EnvFilter;

use fare_server::config::ServerConfig;
use fare_server::fares::{FareClient, FareClientConfig, FileFareSource};
use fare_server::filter::{FilterDefaults, JsonFileStore, MemoryStore};
use fare_server::geometry::{DirectoryGeometryStore, GeometryClient, GeometryClientConfig};
use fare_server::web::{AppState, FareBackend, GeometryBackend, create_router};

/// How often to reload a local fare file (5 minutes).
const FARE_FILE_RELOAD_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fare_server=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let fares = match (&config.fare_api_url, &config.fare_data_file) {
        (Some(url), _) => {
            let mut client_config = FareClientConfig::new(url);
            match &config.fare_api_key {
                Some(key) => client_config = client_config.with_api_key(key),
                None => tracing::warn!("FARE_API_KEY not set; requests are unauthenticated"),
            }
            tracing::info!(%url, "using fare query service");
            FareBackend::Http(FareClient::new(client_config)?)
        }
        (None, Some(path)) => {
            let source = FileFareSource::new(path)?;
            if source.is_empty().await {
                tracing::warn!(path = %path.display(), "fare data file has no records");
            }

            // Reload the file periodically so edits show up without a restart
            let reloading = source.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(FARE_FILE_RELOAD_INTERVAL);
                interval.tick().await; // First tick is immediate, skip it
                loop {
                    interval.tick().await;
                    match reloading.reload().await {
                        Ok(count) => tracing::info!(rows = count, "reloaded fare data"),
                        Err(e) => tracing::warn!(error = %e, "failed to reload fare data"),
                    }
                }
            });

            FareBackend::File(source)
        }
        (None, None) => return Err("set FARE_API_URL or FARE_DATA_FILE".into()),
    };

    let geometry = match (&config.geometry_url, &config.geometry_dir) {
        (Some(url), _) => {
            GeometryBackend::Http(GeometryClient::new(GeometryClientConfig::new(url))?)
        }
        (None, Some(dir)) => GeometryBackend::Directory(DirectoryGeometryStore::new(dir)),
        (None, None) => {
            tracing::warn!("no GEOMETRY_URL or GEOMETRY_DIR; route maps will be empty");
            GeometryBackend::Disabled
        }
    };

    let defaults = FilterDefaults::default();
    let state = match &config.filter_store_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "saving filters to disk");
            AppState::new(fares, geometry, JsonFileStore::new(path), defaults)
        }
        None => AppState::new(fares, geometry, MemoryStore::new(), defaults),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "fare explorer listening");
    tracing::info!("  GET  /health             - Health check");
    tracing::info!("  POST /api/journeys       - Search and filter journeys");
    tracing::info!("  GET  /api/routes         - Route geometry for station pairs");
    tracing::info!("  GET  /api/filters/:name  - Load saved filters");
    tracing::info!("  POST /api/filters/:name  - Apply a filter action");

    axum::serve(listener, app).await?;
    Ok(())
}
