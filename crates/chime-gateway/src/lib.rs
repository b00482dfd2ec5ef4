// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP webhook gateway.
//!
//! `GET {webhook_path}` re-registers the webhook with Telegram and
//! reports the outcome as a structured status payload; `POST
//! {webhook_path}` feeds one update through the router and always
//! answers 200 -- outbound sends go through the Bot API client, never
//! through the webhook response.

pub mod handlers;
pub mod server;

use std::sync::Arc;

use teloxide::Bot;

use chime_telegram::UpdateRouter;

pub use server::{start_server, ServerConfig};

/// Shared state for the gateway handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Update router; each POST is handled as its own task.
    pub router: Arc<UpdateRouter>,
    /// Bot handle used for webhook registration.
    pub bot: Bot,
    /// Path the webhook is served and registered under.
    pub webhook_path: String,
    /// Optional public-key certificate for registration.
    pub certificate_path: Option<String>,
}

impl GatewayState {
    pub fn new(
        router: Arc<UpdateRouter>,
        bot: Bot,
        webhook_path: String,
        certificate_path: Option<String>,
    ) -> Self {
        Self {
            router,
            bot,
            webhook_path,
            certificate_path,
        }
    }
}

/// Build the axum router serving the webhook endpoint.
pub fn build_router(state: GatewayState) -> axum::Router {
    use axum::routing::get;

    let path = state.webhook_path.clone();
    axum::Router::new()
        .route(
            &path,
            get(handlers::register_webhook).post(handlers::receive_update),
        )
        .with_state(state)
}
