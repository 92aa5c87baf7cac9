use async_trait::async_trait;
use thiserror::Error;

use super::entities::BillingEvent;

#[derive(Debug, Error)]
pub enum PublishError {
  #[error("Failed to serialize event: {0}")]
  Serialize(String),

  #[error("Event transport failed: {0}")]
  Transport(String),
}

/// Hook for "emit event on committed change"
#[async_trait]
pub trait EventPublisher: Send + Sync {
  async fn publish(&self, event: &BillingEvent) -> Result<(), PublishError>;
}

/// Publishes an event for a change that is already committed.
///
/// The change stays in place whatever happens here; a failed publish is only
/// logged.
pub async fn publish_committed(publisher: &dyn EventPublisher, event: BillingEvent) {
  if let Err(e) = publisher.publish(&event).await {
    tracing::warn!(
      event = event.name(),
      invoice_id = %event.invoice_id,
      "Failed to publish billing event: {}",
      e
    );
  }
}
