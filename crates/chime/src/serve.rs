// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring for the `serve` subcommand.
//!
//! Constructs every collaborator once, injects them into the pipeline
//! and router, and runs the webhook gateway until ctrl-c.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use chime_config::ChimeConfig;
use chime_core::{ChatSender, ChimeError, MessageStore, ModelApi, TriggerCounter};
use chime_counter::RedisCounter;
use chime_gateway::{GatewayState, ServerConfig};
use chime_openai::OpenAiClient;
use chime_pipeline::MessagePipeline;
use chime_storage::SqliteStore;
use chime_telegram::{BotSender, RecordedSender, TelegramChannel, UpdateRouter};

/// Run the bot until shutdown.
pub async fn run(config: ChimeConfig) -> Result<(), ChimeError> {
    if config.telegram.bot_token.is_none() {
        warn!("telegram.bot_token not set; chat transport disabled, nothing to serve");
        return Ok(());
    }

    let channel = TelegramChannel::new(&config.telegram)?;
    let bot_user = channel.fetch_identity().await?;
    info!(
        bot_user_id = bot_user.user_id,
        bot_name = bot_user.full_name().as_str(),
        "bot identity resolved"
    );

    let store = Arc::new(SqliteStore::open(&config.storage.database_path).await?);
    info!(path = config.storage.database_path.as_str(), "message store opened");

    let counter: Arc<dyn TriggerCounter> = Arc::new(RedisCounter::new(&config.redis.url)?);

    // A missing credential is surfaced on first dispatch, not here: the
    // transport must keep persisting messages either way.
    let model_api: Option<Arc<dyn ModelApi>> = match &config.openai.api_key {
        Some(api_key) => Some(Arc::new(OpenAiClient::new(
            api_key,
            Duration::from_secs(config.openai.request_timeout_secs),
        )?)),
        None => {
            warn!("openai.api_key not set; conversation dispatch will fail on first use");
            None
        }
    };

    // Every outbound send goes through the recording decorator so the
    // bot's own messages land in the store.
    let sender: Arc<dyn ChatSender> = Arc::new(RecordedSender::new(
        BotSender::new(channel.bot().clone()),
        store.clone() as Arc<dyn MessageStore>,
        bot_user.clone(),
    ));

    let defaults = config.instruction.as_defaults();
    let pipeline = Arc::new(MessagePipeline::new(
        store.clone(),
        counter,
        model_api,
        defaults.clone(),
        bot_user.user_id,
    ));

    let router = Arc::new(UpdateRouter::new(
        channel.bot().clone(),
        store.clone(),
        pipeline,
        sender,
        defaults,
    ));

    let state = GatewayState::new(
        router,
        channel.bot().clone(),
        config.telegram.webhook_path.clone(),
        config.telegram.certificate_path.clone(),
    );

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            signal_cancel.cancel();
        }
    });

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };
    chime_gateway::start_server(&server_config, state, cancel).await?;

    store.close().await?;
    info!("chime stopped");
    Ok(())
}
