//! Router harness shared by the route tests.

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use contabil_core::ledger::{
    AccountType, InMemoryAccountRegistry, InMemoryEntryStore, LedgerBook, LedgerPoster,
    NewAccount,
};
use contabil_shared::types::AccountId;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::{AppState, create_router};

/// A router over a small chart: assets (group) with cash and bank, plus
/// capital and sales at the root.
pub struct TestLedger {
    pub router: Router,
    pub state: AppState,
    pub assets: AccountId,
    pub cash: AccountId,
    pub bank: AccountId,
    pub capital: AccountId,
    pub sales: AccountId,
}

impl TestLedger {
    pub fn new() -> Self {
        let assets = NewAccount::group("1", "Ativo", AccountType::Asset, None);
        let cash = NewAccount::leaf("1.1", "Caixa", AccountType::Asset, Some(assets.id));
        let bank = NewAccount::leaf("1.2", "Banco", AccountType::Asset, Some(assets.id));
        let capital = NewAccount::leaf("2.1", "Capital", AccountType::Equity, None);
        let sales = NewAccount::leaf("3.1", "Vendas", AccountType::Revenue, None);
        let ids = [assets.id, cash.id, bank.id, capital.id, sales.id];

        let registry =
            InMemoryAccountRegistry::from_chart(vec![assets, cash, bank, capital, sales]).unwrap();
        let book = LedgerBook::new(
            registry,
            InMemoryEntryStore::new(),
            LedgerPoster::default(),
            Duration::from_secs(1),
        );
        let state = AppState::new(book);

        Self {
            router: create_router(state.clone()),
            state,
            assets: ids[0],
            cash: ids[1],
            bank: ids[2],
            capital: ids[3],
            sales: ids[4],
        }
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> Response<Body> {
        self.post_raw(uri, body.to_string()).await
    }

    pub async fn post_raw(&self, uri: &str, body: String) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Posts a two-line entry and returns the response body.
    pub async fn post_pair(
        &self,
        date: &str,
        debit: AccountId,
        credit: AccountId,
        amount: &str,
    ) -> Value {
        let response = self
            .post_json(
                "/api/v1/ledger/entries",
                &json!({
                    "date": date,
                    "narrative": "Lançamento",
                    "lines": [
                        {"account_id": debit, "side": "debit", "amount": amount},
                        {"account_id": credit, "side": "credit", "amount": amount},
                    ]
                }),
            )
            .await;
        assert_eq!(response.status(), 201);
        body_json(response).await
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
