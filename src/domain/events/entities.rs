use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::invoice::Invoice;

/// A committed change to the ledger or the edit-request workflow.
///
/// Carries enough context (invoice, business, customer) for a subscriber to
/// decide whether it cares, plus kind-specific data to apply a delta instead
/// of refetching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingEvent {
  pub id: Uuid,
  pub occurred_at: DateTime<Utc>,
  pub invoice_id: Uuid,
  pub business_id: Uuid,
  pub customer_id: Uuid,
  #[serde(flatten)]
  pub kind: BillingEventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BillingEventKind {
  InvoiceCreated {
    invoice_number: String,
    total_amount: Decimal,
  },
  InvoicePaid {
    amount: Decimal,
  },
  InvoiceItemsReplaced {
    revision: i64,
    total_amount: Decimal,
  },
  InvoiceOverdue {
    due_date: NaiveDate,
  },
  EditRequestSubmitted {
    request_id: Uuid,
  },
  EditRequestApproved {
    request_id: Uuid,
    revision: i64,
    total_amount: Decimal,
  },
  EditRequestRejected {
    request_id: Uuid,
  },
}

impl BillingEvent {
  pub fn for_invoice(invoice: &Invoice, kind: BillingEventKind) -> Self {
    Self {
      id: Uuid::new_v4(),
      occurred_at: Utc::now(),
      invoice_id: invoice.id,
      business_id: invoice.business_id,
      customer_id: invoice.customer_id,
      kind,
    }
  }

  /// Whether `user_id` is a party to the invoice this event is about
  pub fn concerns(&self, user_id: Uuid) -> bool {
    self.business_id == user_id || self.customer_id == user_id
  }

  pub fn name(&self) -> &'static str {
    match self.kind {
      BillingEventKind::InvoiceCreated { .. } => "invoice_created",
      BillingEventKind::InvoicePaid { .. } => "invoice_paid",
      BillingEventKind::InvoiceItemsReplaced { .. } => "invoice_items_replaced",
      BillingEventKind::InvoiceOverdue { .. } => "invoice_overdue",
      BillingEventKind::EditRequestSubmitted { .. } => "edit_request_submitted",
      BillingEventKind::EditRequestApproved { .. } => "edit_request_approved",
      BillingEventKind::EditRequestRejected { .. } => "edit_request_rejected",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  fn event(kind: BillingEventKind) -> BillingEvent {
    BillingEvent {
      id: Uuid::new_v4(),
      occurred_at: Utc::now(),
      invoice_id: Uuid::new_v4(),
      business_id: Uuid::new_v4(),
      customer_id: Uuid::new_v4(),
      kind,
    }
  }

  #[test]
  fn test_event_json_is_tagged_and_flat() {
    let e = event(BillingEventKind::InvoicePaid { amount: dec!(20) });
    let json = serde_json::to_value(&e).unwrap();

    assert_eq!(json["type"], "invoice_paid");
    assert_eq!(json["invoice_id"], e.invoice_id.to_string());
    assert!(json.get("kind").is_none());

    let back: BillingEvent = serde_json::from_value(json).unwrap();
    assert_eq!(back, e);
  }

  #[test]
  fn test_event_concerns_parties_only() {
    let e = event(BillingEventKind::EditRequestRejected {
      request_id: Uuid::new_v4(),
    });
    assert!(e.concerns(e.business_id));
    assert!(e.concerns(e.customer_id));
    assert!(!e.concerns(Uuid::new_v4()));
    assert_eq!(e.name(), "edit_request_rejected");
  }
}
