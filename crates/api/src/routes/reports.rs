//! Ledger report routes.

use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use chrono::NaiveDate;
use contabil_core::ledger::{AccountType, TrialBalance};
use contabil_shared::types::Money;
use serde::Serialize;

use super::accounts::RangeQuery;
use crate::AppState;
use crate::error::ApiResult;

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ledger/trial-balance", get(get_trial_balance))
        .route("/ledger/statement-totals", get(get_statement_totals))
}

/// Closing balances per account type over the whole chart.
#[derive(Debug, Serialize)]
pub struct StatementTotalsResponse {
    /// Range start.
    pub from: NaiveDate,
    /// Range end.
    pub to: NaiveDate,
    /// One total per account type.
    pub totals: BTreeMap<AccountType, Money>,
}

async fn get_trial_balance(
    State(state): State<AppState>,
    range: Result<Query<RangeQuery>, QueryRejection>,
) -> ApiResult<Json<TrialBalance>> {
    let Query(range) = range?;
    Ok(Json(state.book.trial_balance(range.from, range.to).await?))
}

async fn get_statement_totals(
    State(state): State<AppState>,
    range: Result<Query<RangeQuery>, QueryRejection>,
) -> ApiResult<Json<StatementTotalsResponse>> {
    let Query(RangeQuery { from, to }) = range?;
    let totals = state.book.statement_totals(from, to).await?;
    Ok(Json(StatementTotalsResponse { from, to, totals }))
}
