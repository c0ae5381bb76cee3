// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read once from the environment at startup and never
//! changes afterwards. Values are trimmed; an empty value counts as unset.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `GATEFI_API_KEY` | Value of the `api-key` header | Required |
//! | `GATEFI_SECRET_KEY` | HMAC-SHA256 signing secret | Required |
//! | `GATEFI_API_BASE_URL` | Provider base URL | `https://api-sandbox.gatefi.com` |
//! | `GATEFI_HTTP_TIMEOUT_SECS` | Provider call timeout | `30` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TLS_CERT_PATH` | PEM certificate chain (enables HTTPS with `TLS_KEY_PATH`) | Unset |
//! | `TLS_KEY_PATH` | PEM private key | Unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{fmt, net::SocketAddr, path::PathBuf, time::Duration};

use url::Url;

pub const GATEFI_API_KEY_ENV: &str = "GATEFI_API_KEY";
pub const GATEFI_SECRET_KEY_ENV: &str = "GATEFI_SECRET_KEY";
pub const GATEFI_API_BASE_URL_ENV: &str = "GATEFI_API_BASE_URL";
pub const GATEFI_HTTP_TIMEOUT_ENV: &str = "GATEFI_HTTP_TIMEOUT_SECS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_GATEFI_API_BASE_URL: &str = "https://api-sandbox.gatefi.com";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Provider credentials and endpoint.
#[derive(Clone)]
pub struct GatefiConfig {
    pub api_base_url: String,
    pub api_key: String,
    pub secret_key: String,
    pub timeout: Duration,
}

impl fmt::Debug for GatefiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatefiConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub tls: Option<TlsConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gatefi: GatefiConfig,
    pub server: ServerConfig,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let api_base_url = env.or_default(GATEFI_API_BASE_URL_ENV, DEFAULT_GATEFI_API_BASE_URL);
        match Url::parse(&api_base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::Invalid {
                    name: GATEFI_API_BASE_URL_ENV,
                    reason: format!("unsupported scheme `{}`", url.scheme()),
                })
            }
            Err(e) => {
                return Err(ConfigError::Invalid {
                    name: GATEFI_API_BASE_URL_ENV,
                    reason: e.to_string(),
                })
            }
        }

        let timeout_secs = match env.optional(GATEFI_HTTP_TIMEOUT_ENV) {
            None => DEFAULT_HTTP_TIMEOUT_SECS,
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    name: GATEFI_HTTP_TIMEOUT_ENV,
                    reason: format!("expected a positive number of seconds, got `{raw}`"),
                })?,
        };

        let gatefi = GatefiConfig {
            api_base_url,
            api_key: env.required(GATEFI_API_KEY_ENV)?,
            secret_key: env.required(GATEFI_SECRET_KEY_ENV)?,
            timeout: Duration::from_secs(timeout_secs),
        };

        let host = env.or_default(HOST_ENV, DEFAULT_HOST);
        let port = match env.optional(PORT_ENV) {
            None => DEFAULT_PORT,
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: format!("`{raw}`: {e}"),
            })?,
        };
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e| ConfigError::Invalid {
                    name: HOST_ENV,
                    reason: format!("`{host}`: {e}"),
                })?;

        let tls = match (env.optional(TLS_CERT_PATH_ENV), env.optional(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsConfig {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        let log_format = match env.optional(LOG_FORMAT_ENV) {
            None => LogFormat::Pretty,
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" => LogFormat::Pretty,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: LOG_FORMAT_ENV,
                        reason: format!("expected `json` or `pretty`, got `{raw}`"),
                    })
                }
            },
        };

        Ok(Self {
            gatefi,
            server: ServerConfig { bind_addr, tls },
            log_format,
        })
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn or_default(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }
}
