// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server lifecycle.

use tokio_util::sync::CancellationToken;
use tracing::info;

use chime_core::ChimeError;

use crate::{build_router, GatewayState};

/// Bind configuration for the gateway server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Serve the webhook endpoint until the cancellation token fires.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), ChimeError> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|e| ChimeError::Internal(format!(
            "failed to bind {}:{}: {e}",
            config.host, config.port
        )))?;

    let addr = listener.local_addr().map_err(|e| {
        ChimeError::Internal(format!("failed to read local address: {e}"))
    })?;
    info!(%addr, "webhook gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| ChimeError::Internal(format!("gateway server error: {e}")))
}
