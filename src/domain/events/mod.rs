pub mod entities;
pub mod ports;

pub use entities::{BillingEvent, BillingEventKind};
pub use ports::{EventPublisher, PublishError, publish_committed};
