//! Health check endpoints.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use contabil_core::ledger::BookStats;
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `healthy` when the book answered within the operation timeout.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Book size, absent when the book did not answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<BookStats>,
}

/// Health check handler.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.book.stats().await {
        Ok(stats) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                version: env!("CARGO_PKG_VERSION"),
                book: Some(stats),
            }),
        ),
        Err(e) => {
            warn!(error = %e, "Health check could not read the ledger book");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    version: env!("CARGO_PKG_VERSION"),
                    book: None,
                }),
            )
        }
    }
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
