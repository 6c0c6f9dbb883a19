//! Wallet analytics service: dashboard API in front of the remote wallet API.

mod analytics;
mod charts;
mod config;
mod dashboard;
mod error;
mod logging;
mod tls;
mod transaction;
mod wallet_api;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
    routing::{get, post},
    Router,
};
use std::{future::Future, path::Path};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::Config;
use crate::dashboard::AppState;
use crate::error::ApiError;
use crate::wallet_api::WalletApiClient;

/// Bearer token taken from the incoming request and forwarded to the wallet API.
pub struct BearerAuth {
    pub token: String,
}

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        std::future::ready(bearer_token(&parts.headers).map(|token| BearerAuth { token }))
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization"))?
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header"))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| ApiError::unauthorized("Unsupported auth scheme"))?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(ApiError::unauthorized("Unsupported auth scheme"));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(ApiError::unauthorized("Missing bearer token"));
    }
    Ok(token.to_string())
}

pub fn router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/health", get(dashboard::health))
        .route("/dashboard/analytics", get(dashboard::analytics))
        .route("/dashboard/balance", get(dashboard::balance))
        .route("/dashboard/statement", get(dashboard::statement))
        .route("/dashboard/recharge", post(dashboard::recharge))
        .route("/dashboard/transfer", post(dashboard::transfer))
        // Serve the dashboard front end, with index.html support
        .fallback_service(ServeDir::new(static_dir).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();
    tls::install_crypto_provider();

    let config = Config::from_env().map_err(|e| {
        tracing::error!(error = %e, "❌ Invalid configuration");
        e
    })?;

    tracing::info!(
        service = "Wallet Analytics",
        version = env!("CARGO_PKG_VERSION"),
        "🚀 Starting wallet analytics service"
    );

    let api = WalletApiClient::new(&config.api_base_url, config.api_timeout)?;
    tracing::info!(
        api_base = api.api_base(),
        timeout_secs = config.api_timeout.as_secs(),
        "🔗 Wallet API client ready"
    );

    let app = router(AppState::new(api), &config.static_dir);

    tracing::info!(
        routes = "/health, /dashboard/{analytics,balance,statement,recharge,transfer}",
        static_content = %config.static_dir.display(),
        "✅ Application routes configured"
    );

    println!("{}", logging::banner(&config));

    let addr = config.bind_addr;
    match &config.tls {
        Some(files) => {
            tracing::debug!(
                cert_file = %files.cert.display(),
                key_file = %files.key.display(),
                "🔐 Loading TLS configuration"
            );
            let tls = tls::load_server_config(files).await.map_err(|e| {
                tracing::error!(
                    error = %e,
                    cert_file = %files.cert.display(),
                    key_file = %files.key.display(),
                    "❌ Failed to load TLS configuration"
                );
                e
            })?;

            tracing::info!(bind_address = %addr, "🚀 Starting HTTPS server with TLS");
            axum_server::bind_rustls(addr, tls)
                .serve(app.into_make_service())
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "❌ Server failed");
                    e
                })?;
        }
        None => {
            tracing::warn!(
                bind_address = %addr,
                "⚠️ Starting plain HTTP server (TLS disabled)"
            );
            axum_server::bind(addr)
                .serve(app.into_make_service())
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "❌ Server failed");
                    e
                })?;
        }
    }

    tracing::info!("👋 Server shutdown completed");
    Ok(())
}
