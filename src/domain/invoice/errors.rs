use super::value_objects::{InvoiceStatus, ValueObjectError};
use crate::domain::errors::{ErrorKind, RepositoryError};
use thiserror::Error;
use uuid::Uuid;

/// Rule violations detected by the invoice entity itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvoiceEntityError {
  #[error("An invoice needs at least one line item")]
  NoLineItems,

  #[error("Cannot change status from {from} to {to}")]
  InvalidStatusTransition {
    from: InvoiceStatus,
    to: InvoiceStatus,
  },

  #[error("Invoice is {status} and can no longer be edited")]
  NotEditable { status: InvoiceStatus },

  #[error(transparent)]
  Value(#[from] ValueObjectError),
}

#[derive(Debug, Error)]
pub enum InvoiceError {
  #[error("Validation error: {0}")]
  Validation(#[from] ValueObjectError),

  #[error("No line items provided")]
  NoLineItems,

  #[error("Invoice not found: {0}")]
  InvoiceNotFound(Uuid),

  #[error("Customer {customer_id} is not registered with business {business_id}")]
  CustomerNotRegistered { business_id: Uuid, customer_id: Uuid },

  #[error("Customer {0} is already registered")]
  CustomerAlreadyRegistered(Uuid),

  #[error("Invalid state: {0}")]
  InvalidState(String),

  #[error("Permission denied: {0}")]
  PermissionDenied(String),

  #[error("Repository error: {0}")]
  Repository(#[from] RepositoryError),
}

impl InvoiceError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      InvoiceError::Validation(_) | InvoiceError::NoLineItems => ErrorKind::Validation,
      InvoiceError::InvoiceNotFound(_) | InvoiceError::CustomerNotRegistered { .. } => {
        ErrorKind::NotFound
      }
      InvoiceError::CustomerAlreadyRegistered(_) | InvoiceError::InvalidState(_) => {
        ErrorKind::InvalidState
      }
      InvoiceError::PermissionDenied(_) => ErrorKind::PermissionDenied,
      InvoiceError::Repository(e) => e.kind(),
    }
  }
}

impl From<InvoiceEntityError> for InvoiceError {
  fn from(error: InvoiceEntityError) -> Self {
    match error {
      InvoiceEntityError::NoLineItems => InvoiceError::NoLineItems,
      InvoiceEntityError::Value(e) => InvoiceError::Validation(e),
      other => InvoiceError::InvalidState(other.to_string()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_entity_errors_map_to_kinds() {
    let err: InvoiceError = InvoiceEntityError::NoLineItems.into();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err: InvoiceError = InvoiceEntityError::InvalidStatusTransition {
      from: InvoiceStatus::Paid,
      to: InvoiceStatus::Paid,
    }
    .into();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(
      err.to_string(),
      "Invalid state: Cannot change status from paid to paid"
    );
  }

  #[test]
  fn test_out_of_range_values_are_validation_errors() {
    let err: InvoiceError =
      InvoiceEntityError::Value(ValueObjectError::InvalidAmount("too large".to_string())).into();
    assert_eq!(err.kind(), ErrorKind::Validation);
  }

  #[test]
  fn test_repository_conflict_is_invalid_state() {
    let err: InvoiceError = RepositoryError::Conflict("already paid".to_string()).into();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
  }
}
