// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP handlers for the webhook endpoint.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::Host;
use serde::Serialize;
use teloxide::types::Update;
use tracing::{debug, error, warn};

use crate::GatewayState;

/// Response body for webhook (re)registration.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// Whether registration succeeded.
    pub status: bool,
    /// Failure detail; absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// GET handler: register this endpoint as the bot's webhook.
///
/// The public URL is derived from the request's own Host header plus
/// the configured path. Registration failures are reported in the
/// response body, never propagated as HTTP errors.
pub async fn register_webhook(
    State(state): State<GatewayState>,
    Host(host): Host,
) -> Json<RegisterResponse> {
    let url = format!("https://{host}{}", state.webhook_path);

    match chime_telegram::register_webhook(&state.bot, &url, state.certificate_path.as_deref())
        .await
    {
        Ok(()) => {
            debug!(url = url.as_str(), "webhook registered");
            Json(RegisterResponse {
                status: true,
                error_message: None,
            })
        }
        Err(e) => {
            warn!(url = url.as_str(), error = %e, "webhook registration failed");
            Json(RegisterResponse {
                status: false,
                error_message: Some(e.to_string()),
            })
        }
    }
}

/// POST handler: feed one update through the router.
///
/// Always answers 200 with an empty body. Chat-facing users never see
/// internal errors; at worst a conversation round silently fails, and a
/// non-2xx would only make Telegram redeliver an update we already
/// persisted.
pub async fn receive_update(State(state): State<GatewayState>, body: Bytes) -> StatusCode {
    let update = match parse_update(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, "discarding malformed update payload");
            return StatusCode::OK;
        }
    };

    if let Err(e) = state.router.handle_update(update).await {
        error!(error = %e, "update handling failed");
    }
    StatusCode::OK
}

/// Parse a webhook body into a Telegram update.
pub fn parse_update(body: &[u8]) -> Result<Update, serde_json::Error> {
    serde_json::from_slice(body)
}
