//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST routes over the ledger book
//! - JSON error responses with per-line fault indices

pub mod error;
pub mod routes;

#[cfg(test)]
mod test_support;

use axum::Router;
use contabil_core::ledger::LedgerBook;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The ledger book every route reads from or posts to.
    pub book: Arc<LedgerBook>,
}

impl AppState {
    /// Wraps a book for sharing across handlers.
    #[must_use]
    pub fn new(book: LedgerBook) -> Self {
        Self {
            book: Arc::new(book),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
