//! Local stand-ins for the NOAA bucket, served over real HTTP in tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;

/// Serve `router` on an ephemeral localhost port and return its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// In-memory NOAA bucket. Feeds are raw bytes so tests can serve invalid
/// UTF-8. Feeds that were not configured answer 404.
#[derive(Clone, Default)]
pub struct FakeNoaa {
    stations: Option<Vec<u8>>,
    inventory: Option<Vec<u8>>,
    observations: HashMap<String, Vec<u8>>,
    observation_hits: Arc<AtomicUsize>,
}

impl FakeNoaa {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stations(mut self, text: impl Into<Vec<u8>>) -> Self {
        self.stations = Some(text.into());
        self
    }

    pub fn with_inventory(mut self, text: impl Into<Vec<u8>>) -> Self {
        self.inventory = Some(text.into());
        self
    }

    pub fn with_observations(mut self, station_id: &str, csv: impl Into<Vec<u8>>) -> Self {
        self.observations.insert(station_id.to_string(), csv.into());
        self
    }

    /// Number of per-station CSV requests served so far.
    pub fn observation_hits(&self) -> usize {
        self.observation_hits.load(Ordering::SeqCst)
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/ghcnd-stations.txt", get(stations))
            .route("/ghcnd-inventory.txt", get(inventory))
            .route("/csv/by_station/:file", get(observations))
            .with_state(self.clone())
    }
}

async fn stations(State(noaa): State<FakeNoaa>) -> Result<Vec<u8>, StatusCode> {
    noaa.stations.ok_or(StatusCode::NOT_FOUND)
}

async fn inventory(State(noaa): State<FakeNoaa>) -> Result<Vec<u8>, StatusCode> {
    noaa.inventory.ok_or(StatusCode::NOT_FOUND)
}

async fn observations(
    State(noaa): State<FakeNoaa>,
    Path(file): Path<String>,
) -> Result<Vec<u8>, StatusCode> {
    noaa.observation_hits.fetch_add(1, Ordering::SeqCst);
    file.strip_suffix(".csv")
        .and_then(|id| noaa.observations.get(id).cloned())
        .ok_or(StatusCode::NOT_FOUND)
}
