//! Journal entry routes.
//!
//! `POST /ledger/entries` is the only write path of the API.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection, rejection::PathRejection},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use contabil_core::ledger::{
    CandidateEntry, EntryLine, JournalEntry, LedgerError, ValidationError, ValidationKind,
};
use contabil_shared::types::JournalEntryId;
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiResult;

/// Creates the journal entry routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ledger/entries", post(post_entry))
        .route("/ledger/entries/{entry_id}", get(get_entry))
}

/// Request body for posting an entry.
///
/// The date stays a string here so a malformed date is reported as an
/// entry validation fault rather than a JSON error.
#[derive(Debug, Deserialize)]
pub struct PostEntryRequest {
    /// Accounting date (YYYY-MM-DD).
    pub date: String,
    /// Free text; required by validation.
    #[serde(default)]
    pub narrative: String,
    /// Optional notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Ordered postings.
    #[serde(default)]
    pub lines: Vec<EntryLine>,
}

impl PostEntryRequest {
    fn into_candidate(self) -> Result<CandidateEntry, LedgerError> {
        let date = self
            .date
            .trim()
            .parse::<NaiveDate>()
            .map_err(|_| ValidationError::entry(ValidationKind::InvalidDate))?;

        Ok(CandidateEntry {
            date,
            narrative: self.narrative,
            notes: self.notes,
            lines: self.lines,
        })
    }
}

/// Posts a journal entry.
async fn post_entry(
    State(state): State<AppState>,
    payload: Result<Json<PostEntryRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<JournalEntry>)> {
    let Json(request) = payload?;
    let candidate = request.into_candidate()?;
    let entry = state.book.post(candidate).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Returns one posted entry.
async fn get_entry(
    State(state): State<AppState>,
    entry_id: Result<Path<JournalEntryId>, PathRejection>,
) -> ApiResult<Json<JournalEntry>> {
    let Path(entry_id) = entry_id?;
    Ok(Json(state.book.entry(entry_id).await?))
}
