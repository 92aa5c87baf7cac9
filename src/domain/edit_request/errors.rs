use thiserror::Error;
use uuid::Uuid;

use super::value_objects::EditRequestStatus;
use crate::domain::errors::{ErrorKind, RepositoryError};
use crate::domain::invoice::{InvoiceError, ValueObjectError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditRequestEntityError {
  #[error("Edit request was already {status}")]
  AlreadyReviewed { status: EditRequestStatus },
}

#[derive(Debug, Error)]
pub enum EditRequestError {
  #[error("Validation error: {0}")]
  Validation(#[from] ValueObjectError),

  #[error("An edit request needs at least one requested item")]
  NoRequestedItems,

  #[error("Edit request not found: {0}")]
  RequestNotFound(Uuid),

  #[error("Invalid state: {0}")]
  InvalidState(String),

  #[error("Permission denied: {0}")]
  PermissionDenied(String),

  #[error(transparent)]
  Ledger(#[from] InvoiceError),

  #[error("Repository error: {0}")]
  Repository(#[from] RepositoryError),
}

impl EditRequestError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      EditRequestError::Validation(_) | EditRequestError::NoRequestedItems => {
        ErrorKind::Validation
      }
      EditRequestError::RequestNotFound(_) => ErrorKind::NotFound,
      EditRequestError::InvalidState(_) => ErrorKind::InvalidState,
      EditRequestError::PermissionDenied(_) => ErrorKind::PermissionDenied,
      EditRequestError::Ledger(e) => e.kind(),
      EditRequestError::Repository(e) => e.kind(),
    }
  }
}

impl From<EditRequestEntityError> for EditRequestError {
  fn from(error: EditRequestEntityError) -> Self {
    EditRequestError::InvalidState(error.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_kinds() {
    let err: EditRequestError = EditRequestEntityError::AlreadyReviewed {
      status: EditRequestStatus::Rejected,
    }
    .into();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(err.to_string(), "Invalid state: Edit request was already rejected");

    let err: EditRequestError = InvoiceError::InvoiceNotFound(Uuid::nil()).into();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err: EditRequestError = RepositoryError::ConnectionFailed("down".to_string()).into();
    assert_eq!(err.kind(), ErrorKind::Persistence);
  }
}
