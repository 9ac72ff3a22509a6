//! Error responses.
//!
//! Every failure leaves the API as `{"error", "message", "lines"}`. Posting
//! eligibility failures add `accounts`; unbalanced entries add `debit` and
//! `credit`.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use contabil_core::ledger::{LedgerError, ValidationKind};
use contabil_shared::AppError;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::error;

/// Anything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The ledger refused or could not serve the request.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The request never reached the ledger.
    #[error(transparent)]
    App(#[from] AppError),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        let code = match self {
            Self::Ledger(e) => e.http_status_code(),
            Self::App(e) => e.status_code(),
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn body(&self) -> Value {
        match self {
            Self::Ledger(e) => {
                let mut body = json!({
                    "error": e.error_code(),
                    "message": e.to_string(),
                    "lines": e.line_indices(),
                });
                match e {
                    LedgerError::PostingNotAllowed { accounts, .. } => {
                        body["accounts"] = json!(accounts);
                    }
                    LedgerError::Validation(v) => {
                        if let ValidationKind::Unbalanced { debit, credit } = &v.kind {
                            body["debit"] = json!(debit);
                            body["credit"] = json!(credit);
                        }
                    }
                    _ => {}
                }
                body
            }
            Self::App(e) => json!({
                "error": e.error_code(),
                "message": e.to_string(),
                "lines": [],
            }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::App(AppError::BadRequest(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::App(AppError::BadRequest(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::App(AppError::BadRequest(rejection.body_text()))
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
