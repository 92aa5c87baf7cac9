use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::EditRequestEntityError;
use super::value_objects::{EditRequestStatus, RequestMessage};
use crate::domain::invoice::{Invoice, ItemSnapshot};

/// A customer's proposed replacement of an invoice's line items.
///
/// `original_items` and `requested_items` are copies taken at submission time
/// and never change afterwards, whatever happens to the invoice. Once the
/// status leaves `pending` it is final.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRequest {
  pub id: Uuid,
  pub invoice_id: Uuid,
  pub business_id: Uuid,
  pub requester_id: Uuid,
  pub original_items: Vec<ItemSnapshot>,
  pub requested_items: Vec<ItemSnapshot>,
  pub message: Option<RequestMessage>,
  pub status: EditRequestStatus,
  /// Invoice revision the customer was looking at
  pub base_revision: i64,
  pub created_at: DateTime<Utc>,
  pub reviewed_at: Option<DateTime<Utc>>,
  pub reviewed_by: Option<Uuid>,
}

impl EditRequest {
  pub fn new(
    invoice: &Invoice,
    requester_id: Uuid,
    original_items: Vec<ItemSnapshot>,
    requested_items: Vec<ItemSnapshot>,
    message: Option<RequestMessage>,
  ) -> Self {
    Self {
      id: Uuid::new_v4(),
      invoice_id: invoice.id,
      business_id: invoice.business_id,
      requester_id,
      original_items,
      requested_items,
      message,
      status: EditRequestStatus::Pending,
      base_revision: invoice.revision,
      created_at: Utc::now(),
      reviewed_at: None,
      reviewed_by: None,
    }
  }

  pub fn approve(&mut self, reviewer_id: Uuid) -> Result<(), EditRequestEntityError> {
    self.review(EditRequestStatus::Approved, reviewer_id)
  }

  pub fn reject(&mut self, reviewer_id: Uuid) -> Result<(), EditRequestEntityError> {
    self.review(EditRequestStatus::Rejected, reviewer_id)
  }

  fn review(
    &mut self,
    outcome: EditRequestStatus,
    reviewer_id: Uuid,
  ) -> Result<(), EditRequestEntityError> {
    if self.status.is_terminal() {
      return Err(EditRequestEntityError::AlreadyReviewed {
        status: self.status,
      });
    }

    self.status = outcome;
    self.reviewed_at = Some(Utc::now());
    self.reviewed_by = Some(reviewer_id);
    Ok(())
  }

  pub fn is_pending(&self) -> bool {
    self.status == EditRequestStatus::Pending
  }

  /// Whether the invoice moved on since the request was submitted
  pub fn is_stale_against(&self, invoice: &Invoice) -> bool {
    invoice.revision != self.base_revision
  }
}
