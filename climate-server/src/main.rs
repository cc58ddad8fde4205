use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use climate_server::cache::StationDataCache;
use climate_server::config::AppConfig;
use climate_server::noaa::NoaaClient;
use climate_server::registry::StationRegistry;
use climate_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "climate_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let client = match NoaaClient::new(config.noaa.clone()) {
        Ok(client) => client,
        Err(e) => {
            error!("failed to create NOAA client: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Searches are meaningless without the catalogue, so fail fast
    info!(base_url = %config.noaa.base_url, "loading station registry");
    let registry = match StationRegistry::load(&client).await {
        Ok(registry) => registry,
        Err(e) => {
            error!("failed to load station registry: {e}");
            return ExitCode::FAILURE;
        }
    };

    let cache = StationDataCache::new(client, &config.cache);
    let app = create_router(AppState::new(registry, cache));

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.bind_addr, "failed to bind: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(addr = %config.bind_addr, "climate server listening");
    println!("API Endpoints:");
    println!("  GET  /status    - Health check");
    println!("  GET  /stations  - Stations near a point with data for a year range");
    println!("  GET  /station   - Annual and seasonal averages of one station");

    if let Err(e) = axum::serve(listener, app).await {
        error!("server error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
