use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8443";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Runtime settings, read from `WALLET_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub bind_addr: SocketAddr,
    /// `None` serves plain HTTP.
    pub tls: Option<TlsFiles>,
    pub api_timeout: Duration,
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFiles {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("WALLET_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "WALLET_API_BASE_URL",
                value: api_base_url,
                reason: "expected an http:// or https:// URL".into(),
            });
        }
        let api_base_url = api_base_url.trim_end_matches('/').to_string();

        let bind_raw = lookup("WALLET_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            key: "WALLET_BIND_ADDR",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let tls_disabled = match lookup("WALLET_TLS_DISABLED") {
            None => false,
            Some(v) => parse_flag("WALLET_TLS_DISABLED", &v)?,
        };
        let tls = if tls_disabled {
            None
        } else {
            Some(TlsFiles {
                cert: lookup("WALLET_TLS_CERT").unwrap_or_else(|| "cert.pem".into()).into(),
                key: lookup("WALLET_TLS_KEY").unwrap_or_else(|| "key.pem".into()).into(),
            })
        };

        let api_timeout = match lookup("WALLET_API_TIMEOUT_SECS") {
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Some(v) => match v.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "WALLET_API_TIMEOUT_SECS",
                        value: v,
                        reason: "expected a positive number of seconds".into(),
                    });
                }
            },
        };

        let static_dir = lookup("WALLET_STATIC_DIR").unwrap_or_else(|| "src/static".into()).into();

        Ok(Self {
            api_base_url,
            bind_addr,
            tls,
            api_timeout,
            static_dir,
        })
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "expected true or false".into(),
        }),
    }
}
