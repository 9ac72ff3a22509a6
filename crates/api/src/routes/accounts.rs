//! Chart of accounts routes.
//!
//! Read-only: account mutation belongs to the chart management flow.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDate;
use contabil_core::ledger::{Account, AccountStatement, AsOf};
use contabil_shared::AppError;
use contabil_shared::types::{AccountId, Money};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiResult;

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ledger/accounts", get(list_accounts))
        .route("/ledger/accounts/{account_id}", get(get_account))
        .route("/ledger/accounts/{account_id}/movements", get(get_movements))
        .route("/ledger/accounts/{account_id}/subtree-total", get(get_subtree_total))
}

/// Inclusive date range.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    /// Range start (YYYY-MM-DD).
    pub from: NaiveDate,
    /// Range end (YYYY-MM-DD).
    pub to: NaiveDate,
}

/// Date range that may be omitted for a snapshot.
#[derive(Debug, Deserialize)]
pub struct OptionalRangeQuery {
    /// Range start (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Range end (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
}

/// Subtree balance from current account balances.
#[derive(Debug, Serialize)]
pub struct SnapshotTotalResponse {
    /// Root of the subtree.
    pub account_id: AccountId,
    /// Sum of the current balances across the subtree.
    pub closing_balance: Money,
}

/// Lists the chart with current balances.
async fn list_accounts(State(state): State<AppState>) -> ApiResult<Json<Vec<Account>>> {
    Ok(Json(state.book.accounts().await?))
}

/// Returns one account.
async fn get_account(
    State(state): State<AppState>,
    account_id: Result<Path<AccountId>, PathRejection>,
) -> ApiResult<Json<Account>> {
    let Path(account_id) = account_id?;
    Ok(Json(state.book.account(account_id).await?))
}

/// Returns an account statement for `[from, to]`.
async fn get_movements(
    State(state): State<AppState>,
    account_id: Result<Path<AccountId>, PathRejection>,
    range: Result<Query<RangeQuery>, QueryRejection>,
) -> ApiResult<Json<AccountStatement>> {
    let Path(account_id) = account_id?;
    let Query(range) = range?;
    let statement = state
        .book
        .account_statement(account_id, range.from, range.to)
        .await?;
    Ok(Json(statement))
}

/// Returns subtree totals for `[from, to]`, or current balances without a range.
async fn get_subtree_total(
    State(state): State<AppState>,
    account_id: Result<Path<AccountId>, PathRejection>,
    range: Result<Query<OptionalRangeQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Path(account_id) = account_id?;
    let Query(range) = range?;

    match (range.from, range.to) {
        (Some(from), Some(to)) => {
            let total = state.book.subtree_movement_total(account_id, from, to).await?;
            Ok(Json(total).into_response())
        }
        (None, None) => {
            let closing_balance = state.book.subtree_total(account_id, AsOf::Snapshot).await?;
            Ok(Json(SnapshotTotalResponse {
                account_id,
                closing_balance,
            })
            .into_response())
        }
        _ => Err(AppError::BadRequest("Provide both from and to, or neither".to_string()).into()),
    }
}
