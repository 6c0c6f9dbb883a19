use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};

use crate::analytics::aggregate;
use crate::charts::{AnalyticsView, render};
use crate::error::ApiError;
use crate::wallet_api::{
    DEFAULT_PAGE_SIZE, StatementPage, TransactionSource, WalletApiClient, WalletReceipt,
};

pub const ANALYTICS_FAILURE: &str = "Failed to load data. Please try again.";
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Clone)]
pub struct AppState {
    pub api: WalletApiClient,
    pub history: Arc<dyn TransactionSource>,
}

impl AppState {
    pub fn new(api: WalletApiClient) -> Self {
        Self {
            history: Arc::new(api.clone()),
            api,
        }
    }
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub balance: f64,
}

#[derive(Debug, Deserialize)]
pub struct StatementQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RechargeRequest {
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub recipient_id: String,
    pub amount: f64,
}

/// Fetch the history, reduce it and return every chart payload.
pub async fn analytics(
    auth: crate::BearerAuth,
    State(state): State<AppState>,
) -> Result<Json<AnalyticsView>, ApiError> {
    tracing::info!("📊 Building transaction analytics");
    let start_time = std::time::Instant::now();

    let records = state.history.chart_history(&auth.token).await.map_err(|e| {
        tracing::error!(
            error = %e,
            duration_ms = start_time.elapsed().as_millis(),
            "❌ Failed to fetch chart history"
        );
        ApiError::from_fetch(&e, ANALYTICS_FAILURE)
    })?;

    let view = render(&aggregate(&records));

    tracing::info!(
        records = records.len(),
        days = view.trend.len(),
        total_amount = view.total_amount,
        duration_ms = start_time.elapsed().as_millis(),
        "✅ Transaction analytics ready"
    );
    Ok(Json(view))
}

pub async fn balance(
    auth: crate::BearerAuth,
    State(state): State<AppState>,
) -> Result<Json<BalanceResponse>, ApiError> {
    tracing::debug!("💰 Fetching wallet balance");
    let balance = state.api.balance(&auth.token).await.map_err(|e| {
        tracing::error!(error = %e, "❌ Balance fetch failed");
        ApiError::from(e)
    })?;
    Ok(Json(BalanceResponse { balance }))
}

/// One ledger page. `size` is clamped to 1..=100.
pub async fn statement(
    auth: crate::BearerAuth,
    State(state): State<AppState>,
    Query(query): Query<StatementQuery>,
) -> Result<Json<StatementPage>, ApiError> {
    let page = query.page.unwrap_or(0);
    let size = query.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    tracing::debug!(page, size, "📒 Fetching statement page");

    let statement = state.api.statement(&auth.token, page, size).await.map_err(|e| {
        tracing::error!(error = %e, page, size, "❌ Statement fetch failed");
        ApiError::from(e)
    })?;

    tracing::debug!(
        rows = statement.content.len(),
        total_pages = statement.total_pages,
        "✅ Statement page loaded"
    );
    Ok(Json(statement))
}

pub async fn recharge(
    auth: crate::BearerAuth,
    State(state): State<AppState>,
    Json(req): Json<RechargeRequest>,
) -> Result<Json<WalletReceipt>, ApiError> {
    validate_amount(req.amount)?;
    tracing::info!(amount = req.amount, "🔋 Recharging wallet");

    let receipt = state.api.recharge(&auth.token, req.amount).await.map_err(|e| {
        tracing::error!(error = %e, amount = req.amount, "❌ Recharge failed");
        ApiError::from(e)
    })?;

    tracing::info!(amount = req.amount, "✅ Recharge accepted");
    Ok(Json(receipt))
}

pub async fn transfer(
    auth: crate::BearerAuth,
    State(state): State<AppState>,
    Json(req): Json<TransferRequest>,
) -> Result<Json<WalletReceipt>, ApiError> {
    validate_amount(req.amount)?;
    let recipient_id = req.recipient_id.trim();
    if recipient_id.is_empty() {
        return Err(ApiError::bad_request("recipientId is required"));
    }
    tracing::info!(recipient_id, amount = req.amount, "💸 Transferring funds");

    let receipt = state
        .api
        .transfer(&auth.token, recipient_id, req.amount)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, recipient_id, amount = req.amount, "❌ Transfer failed");
            ApiError::from(e)
        })?;

    tracing::info!(recipient_id, amount = req.amount, "✅ Transfer accepted");
    Ok(Json(receipt))
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn validate_amount(amount: f64) -> Result<(), ApiError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(ApiError::bad_request("amount must be a positive number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::transaction::{TransactionRecord, TransactionType, parse_timestamp};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use httpmock::prelude::*;
    use serde_json::{Value, json};
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::Duration;
    use tower::ServiceExt;

    /// In-memory history that remembers the last token it was asked for.
    struct StubHistory {
        records: Vec<TransactionRecord>,
        fail_with: Option<u16>,
        seen_token: Mutex<Option<String>>,
    }

    impl StubHistory {
        fn ok(records: Vec<TransactionRecord>) -> Self {
            Self {
                records,
                fail_with: None,
                seen_token: Mutex::new(None),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                records: vec![],
                fail_with: Some(status),
                seen_token: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl TransactionSource for StubHistory {
        async fn chart_history(&self, token: &str) -> Result<Vec<TransactionRecord>, FetchError> {
            *self.seen_token.lock().unwrap() = Some(token.to_string());
            match self.fail_with {
                Some(status) => Err(FetchError::Status { status }),
                None => Ok(self.records.clone()),
            }
        }
    }

    fn api(base: &str) -> WalletApiClient {
        WalletApiClient::new(base, Duration::from_secs(5)).unwrap()
    }

    fn app_with_history(history: Arc<StubHistory>) -> axum::Router {
        let state = AppState {
            api: api("http://127.0.0.1:9"),
            history,
        };
        crate::router(state, Path::new("does-not-exist"))
    }

    fn proxy_app(server: &MockServer) -> axum::Router {
        crate::router(AppState::new(api(&server.base_url())), Path::new("does-not-exist"))
    }

    fn sample() -> Vec<TransactionRecord> {
        let rec = |kind, amount, ts: &str, sender: Option<&str>| TransactionRecord {
            id: None,
            kind,
            amount,
            timestamp: parse_timestamp(ts).unwrap(),
            sender_id: sender.map(String::from),
            recipient_id: None,
        };
        vec![
            rec(TransactionType::Transfer, 1000.0, "2023-12-01T00:00:00Z", Some("u1")),
            rec(TransactionType::Recharge, 500.0, "2023-12-02T00:00:00Z", None),
            rec(TransactionType::Cashback, 200.0, "2023-12-03T00:00:00Z", None),
        ]
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, token: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn analytics_forwards_token_and_renders_charts() {
        let history = Arc::new(StubHistory::ok(sample()));
        let app = app_with_history(history.clone());

        let resp = app.oneshot(get("/dashboard/analytics", Some("abc"))).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(history.seen_token.lock().unwrap().as_deref(), Some("abc"));
        let body = body_json(resp).await;
        assert_eq!(body["empty"], json!(false));
        assert_eq!(body["summary"][0]["amount"], json!(1000.0));
        assert_eq!(body["trend"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn analytics_with_no_history_reports_empty() {
        let app = app_with_history(Arc::new(StubHistory::ok(vec![])));

        let resp = app.oneshot(get("/dashboard/analytics", Some("abc"))).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["empty"], json!(true));
        assert_eq!(body["message"], json!("No data available"));
        assert_eq!(body["bar"][0]["percentage"], json!(0.0));
    }

    #[tokio::test]
    async fn analytics_failure_shows_friendly_message() {
        let app = app_with_history(Arc::new(StubHistory::failing(500)));

        let resp = app.oneshot(get("/dashboard/analytics", Some("abc"))).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(resp).await;
        assert_eq!(body["error"], json!(ANALYTICS_FAILURE));
    }

    #[tokio::test]
    async fn upstream_unauthorized_is_passed_through() {
        let app = app_with_history(Arc::new(StubHistory::failing(401)));

        let resp = app.oneshot(get("/dashboard/analytics", Some("stale"))).await.unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_token_is_rejected_before_fetching() {
        let history = Arc::new(StubHistory::ok(sample()));
        let app = app_with_history(history.clone());

        let resp = app.oneshot(get("/dashboard/analytics", None)).await.unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(history.seen_token.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn health_needs_no_token() {
        let app = app_with_history(Arc::new(StubHistory::ok(vec![])));
        let resp = app.oneshot(get("/health", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["status"], json!("ok"));
    }

    #[tokio::test]
    async fn statement_clamps_page_size() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/wallet/statement")
                    .query_param("page", "2")
                    .query_param("size", "100")
                    .header("authorization", "Bearer abc");
                then.status(200).json_body(json!({
                    "content": [],
                    "totalPages": 3,
                    "totalElements": 250,
                    "number": 2,
                    "size": 100
                }));
            })
            .await;
        let app = proxy_app(&server);

        let resp = app
            .oneshot(get("/dashboard/statement?page=2&size=5000", Some("abc")))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["totalElements"], json!(250));
    }

    #[tokio::test]
    async fn balance_is_proxied() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/wallet/balance");
                then.status(200).json_body(json!({ "balance": 4200 }));
            })
            .await;
        let app = proxy_app(&server);

        let resp = app.oneshot(get("/dashboard/balance", Some("abc"))).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["balance"], json!(4200.0));
    }

    #[tokio::test]
    async fn transfer_validates_before_calling_upstream() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/wallet/transfer");
                then.status(200).json_body(json!({ "success": true }));
            })
            .await;
        let app = proxy_app(&server);

        let resp = app
            .clone()
            .oneshot(post_json(
                "/dashboard/transfer",
                "abc",
                json!({ "recipientId": " ", "amount": 10 }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = app
            .clone()
            .oneshot(post_json(
                "/dashboard/transfer",
                "abc",
                json!({ "recipientId": "u2", "amount": -5 }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = app
            .oneshot(post_json(
                "/dashboard/transfer",
                "abc",
                json!({ "recipientId": "u2", "amount": 25 }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        mock.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn recharge_error_message_reaches_the_browser() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/wallet/recharge").query_param("amount", "100");
                then.status(422).json_body(json!({ "message": "Recharge limit exceeded" }));
            })
            .await;
        let app = proxy_app(&server);

        let resp = app
            .oneshot(post_json("/dashboard/recharge", "abc", json!({ "amount": 100 })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(resp).await["error"], json!("Recharge limit exceeded"));
    }
}
