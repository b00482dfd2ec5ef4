// SPDX-FileCopyrightText: 2026 Chime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Redis-backed trigger counter.
//!
//! Tracks, per group, how many messages have accumulated since the last
//! conversation trigger. The value lives only in Redis: a cache flush
//! resets in-flight counts, losing at most one trigger cycle's worth of
//! counting, never messages.
//!
//! Atomicity of concurrent increments is delegated entirely to Redis
//! INCR/DECRBY; this crate takes no lock of its own. That delegation is
//! a hard dependency of the pipeline's correctness.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::warn;

use chime_core::{ChimeError, TriggerCounter};

/// Key prefix for per-group counters.
const KEY_PREFIX: &str = "chime:pending";

/// Trigger counter over a shared Redis instance.
///
/// Holds a `redis::Client` and checks out a multiplexed async
/// connection per operation; the client itself is cheap to clone and
/// safe to share across tasks.
#[derive(Clone)]
pub struct RedisCounter {
    client: redis::Client,
}

impl RedisCounter {
    /// Create a counter against the given Redis URL.
    ///
    /// The URL is validated eagerly; the connection itself is
    /// established lazily per operation.
    pub fn new(url: &str) -> Result<Self, ChimeError> {
        let client = redis::Client::open(url).map_err(|e| ChimeError::Cache {
            message: format!("invalid redis url: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, ChimeError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| ChimeError::Cache {
                message: format!("redis connection failed: {e}"),
                source: Some(Box::new(e)),
            })
    }
}

/// Counter key for a group.
fn counter_key(group_id: i64) -> String {
    format!("{KEY_PREFIX}:{group_id}")
}

#[async_trait]
impl TriggerCounter for RedisCounter {
    async fn increment(&self, group_id: i64) -> Result<i64, ChimeError> {
        let mut conn = self.connection().await?;
        let count: i64 = conn
            .incr(counter_key(group_id), 1)
            .await
            .map_err(|e| ChimeError::Cache {
                message: format!("INCR failed for group {group_id}: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(count)
    }

    async fn decrement_by(&self, group_id: i64, amount: i64) -> Result<i64, ChimeError> {
        let mut conn = self.connection().await?;
        let remaining: i64 = conn
            .decr(counter_key(group_id), amount)
            .await
            .map_err(|e| ChimeError::Cache {
                message: format!("DECRBY failed for group {group_id}: {e}"),
                source: Some(Box::new(e)),
            })?;
        if remaining < 0 {
            // Mismatched bookkeeping in the caller, not a valid state.
            warn!(group_id, remaining, "trigger counter went negative");
            debug_assert!(remaining >= 0, "trigger counter must not go negative");
        }
        Ok(remaining)
    }
}
