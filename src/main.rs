// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process::ExitCode, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use relational_ramp_server::{
    api::router,
    config::{AppConfig, LogFormat, TlsConfig, DEFAULT_LOG_FILTER},
    providers::gatefi::TransportError,
    state::AppState,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("provider client error: {0}")]
    Provider(#[from] TransportError),

    #[error("failed to load TLS certificate: {0}")]
    Tls(std::io::Error),

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

async fn load_tls(tls: &TlsConfig) -> Result<RustlsConfig, StartupError> {
    // rustls needs a process-wide provider before any config is built
    let _ = rustls::crypto::ring::default_provider().install_default();
    RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
        .await
        .map_err(StartupError::Tls)
}

async fn run(config: AppConfig) -> Result<(), StartupError> {
    let state = AppState::from_config(&config.gatefi)?;
    let app = router(state);
    let addr = config.server.bind_addr;

    let handle: Handle<std::net::SocketAddr> = Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
    });

    match &config.server.tls {
        Some(tls) => {
            let rustls = load_tls(tls).await?;
            info!(%addr, provider = %config.gatefi.api_base_url, "ramp server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, rustls)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .map_err(StartupError::Serve)
        }
        None => {
            warn!("TLS_CERT_PATH not set, serving plain HTTP");
            info!(%addr, provider = %config.gatefi.api_base_url, "ramp server listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .map_err(StartupError::Serve)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => {
            info!("ramp server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "ramp server failed");
            ExitCode::FAILURE
        }
    }
}
