//! HTTP route handlers.

use std::marker::PhantomData;
use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::aggregate::StationDetail;
use crate::cache::ObservationSource;
use crate::domain::StationMatch;
use crate::noaa::FeedError;
use crate::registry::StationQuery;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<S: ObservationSource>(state: AppState<S>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/status", get(status))
        .route("/stations", get(search_stations::<S>))
        .route("/station", get(station_detail::<S>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness check.
async fn status() -> &'static str {
    "OK"
}

type SearchResponse = ApiResponse<Vec<StationMatch>>;
type DetailResponse = ApiResponse<Option<StationDetail>>;

/// Stations near a point with data for a range of years.
async fn search_stations<S: ObservationSource>(
    State(state): State<AppState<S>>,
    Query(req): Query<StationSearchRequest>,
) -> Result<Json<SearchResponse>, Rejection<Vec<StationMatch>>> {
    let query = parse_search(&req)?;
    let outcome = state.registry.search(&query);

    debug!(
        lat = query.latitude,
        long = query.longitude,
        radius = query.radius_km,
        found = outcome.stations.len(),
        "station search"
    );

    let mut response = ApiResponse::ok(outcome.stations);
    if let Some(reason) = outcome.empty_reason {
        response.error_message = reason.to_string();
        response.error_code = Some(reason.code());
    }
    Ok(Json(response))
}

/// Annual and seasonal averages of one station.
async fn station_detail<S: ObservationSource>(
    State(state): State<AppState<S>>,
    Query(req): Query<StationDetailRequest>,
) -> Result<Json<DetailResponse>, Rejection<Option<StationDetail>>> {
    let id = req
        .id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::bad_request("Please provide a valid station ID."))?;

    let observations = state.cache.get(id).await.map_err(AppError::from)?;
    let detail = StationDetail::from_observations(&observations);

    Ok(Json(ApiResponse::ok(Some(detail))))
}

/// Validate the search query.
///
/// Presence of every parameter is checked before any of them is parsed, so
/// a request missing `end` with a malformed `lat` reports the missing `end`.
fn parse_search(req: &StationSearchRequest) -> Result<StationQuery, AppError> {
    let lat = required(&req.lat, "Please provide a latitude.")?;
    let long = required(&req.long, "Please provide a longitude.")?;
    let radius = required(&req.radius, "Please provide a radius.")?;
    let limit = required(&req.limit, "Please provide a selection limit.")?;
    let start = required(&req.start, "Please provide a start year.")?;
    let end = required(&req.end, "Please provide an end year.")?;

    let latitude: f64 = number(lat)?;
    let longitude: f64 = number(long)?;
    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(invalid_number());
    }

    // Zero or negative means no limit
    let limit: i64 = number(limit)?;
    let limit = usize::try_from(limit).unwrap_or(0);

    Ok(StationQuery {
        latitude,
        longitude,
        radius_km: number(radius)?,
        limit,
        start_year: number(start)?,
        end_year: number(end)?,
    })
}

fn required<'a>(value: &'a Option<String>, missing: &str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::bad_request(missing))
}

fn number<T: FromStr>(value: &str) -> Result<T, AppError> {
    value.parse().map_err(|_| invalid_number())
}

fn invalid_number() -> AppError {
    AppError::bad_request("Please provide a valid number.")
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Internal { message: String },
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
        }
    }
}

impl From<FeedError> for AppError {
    fn from(e: FeedError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

/// An [`AppError`] rendered with the empty payload of its endpoint: `[]` for
/// lists, `null` for objects.
pub struct Rejection<T> {
    error: AppError,
    payload: PhantomData<fn() -> T>,
}

impl<T> From<AppError> for Rejection<T> {
    fn from(error: AppError) -> Self {
        Self {
            error,
            payload: PhantomData,
        }
    }
}

impl<T: Serialize + Default> IntoResponse for Rejection<T> {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self.error {
            AppError::BadRequest { message } => {
                warn!(%message, "rejected request");
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::Internal { message } => {
                error!(%message, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        let body = Json(ApiResponse {
            data: T::default(),
            error_message: message,
            error_code: None,
        });
        (status, body).into_response()
    }
}
