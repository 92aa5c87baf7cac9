use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::events::{BillingEvent, EventPublisher, PublishError};

/// In-process fan-out of billing events.
///
/// Subscribers that fall behind by more than `capacity` events miss the oldest
/// ones (`RecvError::Lagged`) and should refetch.
#[derive(Debug, Clone)]
pub struct BroadcastEventPublisher {
  sender: broadcast::Sender<BillingEvent>,
}

impl BroadcastEventPublisher {
  pub fn new(capacity: usize) -> Self {
    let (sender, _) = broadcast::channel(capacity);
    Self { sender }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<BillingEvent> {
    self.sender.subscribe()
  }
}

#[async_trait]
impl EventPublisher for BroadcastEventPublisher {
  async fn publish(&self, event: &BillingEvent) -> Result<(), PublishError> {
    // No subscribers is not an error
    if self.sender.send(event.clone()).is_err() {
      tracing::debug!(event = event.name(), "No subscribers for billing event");
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::events::BillingEventKind;
  use chrono::Utc;
  use uuid::Uuid;

  fn event() -> BillingEvent {
    BillingEvent {
      id: Uuid::new_v4(),
      occurred_at: Utc::now(),
      invoice_id: Uuid::new_v4(),
      business_id: Uuid::new_v4(),
      customer_id: Uuid::new_v4(),
      kind: BillingEventKind::EditRequestRejected {
        request_id: Uuid::new_v4(),
      },
    }
  }

  #[tokio::test]
  async fn test_publish_reaches_every_subscriber() {
    let publisher = BroadcastEventPublisher::new(8);
    let mut first = publisher.subscribe();
    let mut second = publisher.subscribe();

    let sent = event();
    publisher.publish(&sent).await.unwrap();

    assert_eq!(first.recv().await.unwrap(), sent);
    assert_eq!(second.recv().await.unwrap(), sent);
  }

  #[tokio::test]
  async fn test_publish_without_subscribers_succeeds() {
    let publisher = BroadcastEventPublisher::new(8);
    assert!(publisher.publish(&event()).await.is_ok());
  }
}
