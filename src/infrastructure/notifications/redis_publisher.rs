use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::domain::events::{BillingEvent, EventPublisher, PublishError};

/// Publishes billing events as JSON to a redis pub/sub channel.
///
/// Pub/sub is fire-and-forget: subscribers that are offline miss events.
#[derive(Clone)]
pub struct RedisEventPublisher {
  connection: ConnectionManager,
  channel: String,
}

impl RedisEventPublisher {
  pub fn new(connection: ConnectionManager, channel: impl Into<String>) -> Self {
    Self {
      connection,
      channel: channel.into(),
    }
  }

  pub fn channel(&self) -> &str {
    &self.channel
  }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
  async fn publish(&self, event: &BillingEvent) -> Result<(), PublishError> {
    let payload =
      serde_json::to_string(event).map_err(|e| PublishError::Serialize(e.to_string()))?;

    let mut connection = self.connection.clone();
    let receivers: i64 = connection
      .publish(&self.channel, payload)
      .await
      .map_err(|e| PublishError::Transport(e.to_string()))?;

    tracing::debug!(
      event = event.name(),
      channel = %self.channel,
      receivers,
      "Published billing event"
    );
    Ok(())
  }
}
