use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::application::invoice::LineItemInputDto;

/// One line item as sent by clients
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LineItemRequest {
  #[validate(length(
    min = 1,
    max = 255,
    message = "Item name must be between 1 and 255 characters"
  ))]
  pub name: String,

  pub quantity: Decimal,

  pub unit_price: Decimal,
}

impl From<LineItemRequest> for LineItemInputDto {
  fn from(item: LineItemRequest) -> Self {
    Self {
      name: item.name,
      quantity: item.quantity,
      unit_price: item.unit_price,
    }
  }
}

pub fn into_line_item_inputs(items: Vec<LineItemRequest>) -> Vec<LineItemInputDto> {
  items.into_iter().map(LineItemInputDto::from).collect()
}

/// Request for issuing an invoice
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
  pub customer_id: Uuid,

  pub invoice_date: NaiveDate,

  #[validate(
    length(min = 1, message = "At least one line item is required"),
    nested
  )]
  pub line_items: Vec<LineItemRequest>,
}

/// Request for replacing every line item of an invoice
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReplaceItemsRequest {
  #[validate(
    length(min = 1, message = "At least one line item is required"),
    nested
  )]
  pub line_items: Vec<LineItemRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkPaidRequest {
  pub amount: Decimal,
}

/// Request for marking overdue invoices; `as_of` defaults to today
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarkOverdueRequest {
  #[serde(default)]
  pub as_of: Option<NaiveDate>,
}

/// Request for registering a customer with the calling business
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterCustomerRequest {
  pub customer_id: Uuid,

  #[validate(length(
    min = 1,
    max = 255,
    message = "Display name must be between 1 and 255 characters"
  ))]
  pub display_name: String,

  #[validate(email(message = "Invalid email format"))]
  #[serde(default)]
  pub email: Option<String>,

  #[validate(range(
    min = 0,
    max = 3650,
    message = "Payment terms must be between 0 and 3650 days"
  ))]
  #[serde(default)]
  pub payment_terms_days: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePaymentTermsRequest {
  #[validate(range(
    min = 0,
    max = 3650,
    message = "Payment terms must be between 0 and 3650 days"
  ))]
  pub payment_terms_days: i32,
}

/// Request for proposing new line items for an invoice
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitEditRequestRequest {
  #[validate(
    length(min = 1, message = "At least one requested item is required"),
    nested
  )]
  pub requested_items: Vec<LineItemRequest>,

  #[validate(length(max = 1000, message = "Message cannot exceed 1000 characters"))]
  #[serde(default)]
  pub message: Option<String>,
}

/// Query string of the invoice listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListInvoicesQuery {
  pub status: Option<String>,
}

/// Standard error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
  /// Error type/code
  pub error: String,

  /// Human-readable error message
  pub message: String,
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  fn widget() -> LineItemRequest {
    LineItemRequest {
      name: "Widget".to_string(),
      quantity: dec!(2),
      unit_price: dec!(10),
    }
  }

  #[test]
  fn test_create_invoice_request_validation_valid() {
    let request = CreateInvoiceRequest {
      customer_id: Uuid::new_v4(),
      invoice_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
      line_items: vec![widget()],
    };

    assert!(request.validate().is_ok());
  }

  #[test]
  fn test_create_invoice_request_requires_items() {
    let request = CreateInvoiceRequest {
      customer_id: Uuid::new_v4(),
      invoice_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
      line_items: vec![],
    };

    let errors = request.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("line_items"));
  }

  #[test]
  fn test_line_item_request_serializes_for_error_params() {
    let value = serde_json::to_value(vec![widget()]).unwrap();
    assert_eq!(value[0]["name"], "Widget");
  }

  #[test]
  fn test_nested_item_name_is_validated() {
    let mut item = widget();
    item.name = String::new();
    let request = ReplaceItemsRequest {
      line_items: vec![item],
    };

    assert!(request.validate().is_err());
  }

  #[test]
  fn test_register_customer_request_validation() {
    let mut request = RegisterCustomerRequest {
      customer_id: Uuid::new_v4(),
      display_name: "Acme Ltd".to_string(),
      email: Some("billing@acme.test".to_string()),
      payment_terms_days: Some(14),
    };
    assert!(request.validate().is_ok());

    request.email = Some("not-an-email".to_string());
    assert!(request.validate().is_err());

    request.email = None;
    request.payment_terms_days = Some(-5);
    assert!(request.validate().is_err());
  }

  #[test]
  fn test_submit_request_message_limit() {
    let request = SubmitEditRequestRequest {
      requested_items: vec![widget()],
      message: Some("x".repeat(1001)),
    };

    assert!(request.validate().is_err());
  }

  #[test]
  fn test_mark_overdue_request_accepts_empty_body() {
    let request: MarkOverdueRequest = serde_json::from_str("{}").unwrap();
    assert!(request.as_of.is_none());
  }
}
