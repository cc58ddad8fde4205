//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

/// Envelope for every JSON response.
///
/// `error_message` is always present and empty on success, so clients can
/// show it without checking the status first.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub data: T,
    pub error_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data,
            error_message: String::new(),
            error_code: None,
        }
    }
}

/// Query of `GET /stations`.
///
/// Every field arrives as text so that a missing parameter and a malformed
/// one produce different messages.
#[derive(Debug, Default, Deserialize)]
pub struct StationSearchRequest {
    pub lat: Option<String>,
    pub long: Option<String>,
    pub radius: Option<String>,
    pub limit: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Query of `GET /station`.
#[derive(Debug, Default, Deserialize)]
pub struct StationDetailRequest {
    pub id: Option<String>,
}
