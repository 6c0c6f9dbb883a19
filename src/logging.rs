use std::io::IsTerminal;

use nu_ansi_term::Color;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Service logs at info; `tower_http` at debug so `TraceLayer` shows each request.
const DEFAULT_DIRECTIVES: &str = "info,tower_http=debug";

/// Install the global subscriber. Colour is only used on a terminal.
pub fn init_logging() {
    let raw = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(env_filter(raw.as_deref()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(std::io::stdout().is_terminal())
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE)
                .compact(),
        )
        .init();
}

/// `RUST_LOG` wins when it parses; a blank or broken value falls back to the default.
fn env_filter(raw: Option<&str>) -> EnvFilter {
    raw.map(str::trim)
        .filter(|directives| !directives.is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Startup banner printed once the router is configured.
pub fn banner(config: &Config) -> String {
    let scheme = if config.tls.is_some() { "https" } else { "http" };
    let accent = Color::Yellow.bold();
    let dim = Color::DarkGray;

    let mut lines = vec![
        String::new(),
        accent.paint("🎯 Wallet Analytics Service").to_string(),
        format!("📍 Listening on {}://{}", scheme, config.bind_addr),
        format!("🔗 Wallet API: {}", config.api_base_url),
    ];
    if config.tls.is_some() {
        lines.push("🔐 TLS encryption enabled".to_string());
    } else {
        lines.push(Color::Red.paint("⚠️  TLS disabled (plain HTTP)").to_string());
    }
    lines.push(format!(
        "📊 Analytics: {}",
        dim.paint(format!("{}://{}/dashboard/analytics", scheme, config.bind_addr))
    ));
    lines.join("\n")
}
