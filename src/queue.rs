//! Like events travel through a Redis list: producers `LPUSH` JSON, the
//! worker `RPOP`s, so events are handled oldest first.

use anyhow::Result;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::future::Future;

use crate::models::LikeEvent;

#[derive(Clone)]
pub struct LikeQueue {
    conn: ConnectionManager,
    key: String,
}

impl LikeQueue {
    pub async fn connect(redis_url: &str, key: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self {
            conn,
            key: key.to_string(),
        })
    }

    /// Rejects events with blank ids before they reach the list.
    pub async fn push(&self, event: &LikeEvent) -> Result<()> {
        validate_event(event)?;
        let payload = encode_event(event)?;
        let mut conn = self.conn.clone();
        redis::cmd("LPUSH")
            .arg(&self.key)
            .arg(payload)
            .query_async::<_, i64>(&mut conn)
            .await?;
        Ok(())
    }

    /// Next event, or `None` when the queue is empty. Payloads that do not
    /// decode are logged and skipped.
    pub async fn pop(&self) -> Result<Option<LikeEvent>> {
        next_valid_event(&self.key, || {
            let mut conn = self.conn.clone();
            let key = self.key.clone();
            async move {
                let payload: Option<String> = redis::cmd("RPOP").arg(&key).query_async(&mut conn).await?;
                Ok::<_, anyhow::Error>(payload)
            }
        })
        .await
    }
}

/// Pulls payloads until one decodes or the source runs dry.
pub async fn next_valid_event<F, Fut>(queue: &str, mut next_payload: F) -> Result<Option<LikeEvent>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<String>>>,
{
    while let Some(payload) = next_payload().await? {
        match decode_event(&payload) {
            Ok(event) => return Ok(Some(event)),
            Err(e) => {
                tracing::warn!(queue = %queue, error = %e, payload = %payload, "dropping malformed like event");
            }
        }
    }
    Ok(None)
}

/// Where the worker takes like events from.
#[async_trait]
pub trait LikeSource: Send + Sync {
    fn name(&self) -> &str;

    /// Next event, or `None` when nothing is waiting.
    async fn next_event(&self) -> Result<Option<LikeEvent>>;
}

#[async_trait]
impl LikeSource for LikeQueue {
    fn name(&self) -> &str {
        &self.key
    }

    async fn next_event(&self) -> Result<Option<LikeEvent>> {
        self.pop().await
    }
}

pub fn encode_event(event: &LikeEvent) -> serde_json::Result<String> {
    serde_json::to_string(event)
}

pub fn validate_event(event: &LikeEvent) -> Result<()> {
    if event.user_id.trim().is_empty() || event.place_id.trim().is_empty() {
        anyhow::bail!("like event is missing userId or placeId");
    }
    Ok(())
}

/// Decodes a queued payload; blank ids are rejected.
pub fn decode_event(payload: &str) -> Result<LikeEvent> {
    let event: LikeEvent = serde_json::from_str(payload)?;
    validate_event(&event)?;
    Ok(event)
}
