use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::invoice::ValueObjectError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditRequestStatus {
  Pending,
  Approved,
  Rejected,
}

impl EditRequestStatus {
  pub fn is_terminal(&self) -> bool {
    !matches!(self, EditRequestStatus::Pending)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      EditRequestStatus::Pending => "pending",
      EditRequestStatus::Approved => "approved",
      EditRequestStatus::Rejected => "rejected",
    }
  }
}

impl FromStr for EditRequestStatus {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "pending" => Ok(EditRequestStatus::Pending),
      "approved" => Ok(EditRequestStatus::Approved),
      "rejected" => Ok(EditRequestStatus::Rejected),
      _ => Err(ValueObjectError::InvalidStatus(s.to_string())),
    }
  }
}

impl fmt::Display for EditRequestStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// What approval does when the invoice changed after the request was submitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleRequestPolicy {
  /// Approval replaces whatever items the invoice holds at that moment
  #[default]
  LastApprovalWins,
  /// Approval is refused unless the invoice is still at the submitted revision
  RejectStale,
}

// Request Message - optional note from the customer to the business
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequestMessage(String);

impl RequestMessage {
  pub const MAX_CHARS: usize = 1000;

  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidMessage(
        "Message cannot be blank".to_string(),
      ));
    }
    if trimmed.chars().count() > Self::MAX_CHARS {
      return Err(ValueObjectError::InvalidMessage(format!(
        "Message cannot exceed {} characters",
        Self::MAX_CHARS
      )));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }
}

impl TryFrom<String> for RequestMessage {
  type Error = ValueObjectError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Self::new(value)
  }
}

impl From<RequestMessage> for String {
  fn from(message: RequestMessage) -> Self {
    message.0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_status_terminality() {
    assert!(!EditRequestStatus::Pending.is_terminal());
    assert!(EditRequestStatus::Approved.is_terminal());
    assert!(EditRequestStatus::Rejected.is_terminal());
    assert_eq!(
      EditRequestStatus::from_str("Approved").unwrap(),
      EditRequestStatus::Approved
    );
    assert!(EditRequestStatus::from_str("cancelled").is_err());
  }

  #[test]
  fn test_stale_policy_from_config_value() {
    #[derive(Deserialize)]
    struct Workflow {
      stale_request_policy: StaleRequestPolicy,
    }

    let parsed: Workflow = toml::from_str("stale_request_policy = \"reject_stale\"").unwrap();
    assert_eq!(parsed.stale_request_policy, StaleRequestPolicy::RejectStale);
    assert_eq!(StaleRequestPolicy::default(), StaleRequestPolicy::LastApprovalWins);
  }

  #[test]
  fn test_request_message() {
    assert_eq!(
      RequestMessage::new("  qty should be 3 ".to_string())
        .unwrap()
        .value(),
      "qty should be 3"
    );
    assert!(RequestMessage::new("   ".to_string()).is_err());
    assert!(RequestMessage::new("x".repeat(1001)).is_err());
    assert!(RequestMessage::new("é".repeat(1000)).is_ok());
  }
}
