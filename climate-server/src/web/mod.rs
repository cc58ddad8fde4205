//! Web layer for the climate station service.
//!
//! Provides the station search and station detail endpoints.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
