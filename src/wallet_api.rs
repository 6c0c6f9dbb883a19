//! Async client for the remote wallet API.
//!
//! Every call forwards the caller's bearer token untouched. Failures are
//! reported once, with no retries; the dashboard decides what to show.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::transaction::TransactionRecord;

pub const DEFAULT_PAGE_SIZE: u32 = 5;

/// One page of the wallet statement (ledger).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementPage {
    #[serde(default)]
    pub content: Vec<TransactionRecord>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_elements: u64,
    /// Zero-based page index.
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
}

#[derive(Debug, Deserialize)]
struct BalanceBody {
    balance: f64,
}

/// Opaque body returned by recharge and transfer.
pub type WalletReceipt = serde_json::Value;

/// Anything that can produce the transaction history for a token.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn chart_history(&self, token: &str) -> Result<Vec<TransactionRecord>, FetchError>;
}

#[derive(Clone)]
pub struct WalletApiClient {
    http: reqwest::Client,
    api_base: String,
}

impl WalletApiClient {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        crate::tls::install_crypto_provider();
        let http = reqwest::Client::builder()
            .user_agent(format!("wallet-analytics/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(FetchError::Network)?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Full transaction history used by the analytics charts.
    pub async fn fetch_chart_history(
        &self,
        token: &str,
    ) -> Result<Vec<TransactionRecord>, FetchError> {
        let req = self.request(Method::GET, "/api/wallet/chartsHistory", token);
        let resp = self.send(req).await?;
        decode(resp).await
    }

    pub async fn balance(&self, token: &str) -> Result<f64, FetchError> {
        let resp = self.send(self.request(Method::GET, "/api/wallet/balance", token)).await?;
        let body: BalanceBody = decode(resp).await?;
        Ok(body.balance)
    }

    pub async fn statement(
        &self,
        token: &str,
        page: u32,
        size: u32,
    ) -> Result<StatementPage, FetchError> {
        let req = self
            .request(Method::GET, "/api/wallet/statement", token)
            .query(&[("page", page), ("size", size)]);
        let resp = self.send(req).await?;
        decode(resp).await
    }

    pub async fn recharge(&self, token: &str, amount: f64) -> Result<WalletReceipt, FetchError> {
        let amount = amount.to_string();
        let req = self
            .request(Method::POST, "/api/wallet/recharge", token)
            .query(&[("amount", amount.as_str())]);
        let resp = self.send(req).await?;
        decode(resp).await
    }

    pub async fn transfer(
        &self,
        token: &str,
        recipient_id: &str,
        amount: f64,
    ) -> Result<WalletReceipt, FetchError> {
        let amount = amount.to_string();
        let req = self
            .request(Method::POST, "/api/wallet/transfer", token)
            .query(&[("recipientId", recipient_id), ("amount", amount.as_str())]);
        let resp = self.send(req).await?;
        decode(resp).await
    }

    fn request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.api_base, path))
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, FetchError> {
        let resp = req.send().await.map_err(|e| {
            tracing::error!(error = %e, "❌ Wallet API unreachable");
            FetchError::Network(e)
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let status = status.as_u16();
        let body = resp.text().await.unwrap_or_default();
        let err = match error_message(&body) {
            Some(message) => FetchError::Api { status, message },
            None => FetchError::Status { status },
        };
        tracing::warn!(status, error = %err, "⚠️ Wallet API returned an error");
        Err(err)
    }
}

#[async_trait]
impl TransactionSource for WalletApiClient {
    async fn chart_history(&self, token: &str) -> Result<Vec<TransactionRecord>, FetchError> {
        self.fetch_chart_history(token).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, FetchError> {
    let bytes = resp.bytes().await.map_err(FetchError::Network)?;
    serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))
}

/// Pulls `message` out of a JSON error body, if there is one.
fn error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json.get("message")?
        .as_str()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
}
