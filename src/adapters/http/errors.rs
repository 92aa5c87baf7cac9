use actix_web::{
  HttpResponse,
  error::ResponseError,
  http::{StatusCode, header::ContentType},
};
use serde::Serialize;
use std::fmt;

use crate::domain::edit_request::EditRequestError;
use crate::domain::errors::ErrorKind;
use crate::domain::identity::IdentityError;
use crate::domain::invoice::InvoiceError;

use super::dtos::ErrorResponse;

/// API error type that maps domain errors to HTTP responses
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum ApiError {
  /// Malformed input (400 Bad Request)
  Validation(String),

  /// Operation not allowed in the current state (409 Conflict)
  InvalidState(String),

  /// Unknown invoice, customer or edit request (404 Not Found)
  NotFound(String),

  /// Authenticated but not allowed (403 Forbidden)
  PermissionDenied(String),

  /// Missing or unknown caller identity (401 Unauthorized)
  Unauthenticated(String),

  /// Internal server error (500 Internal Server Error)
  Internal(String),
}

impl ApiError {
  fn from_kind(kind: ErrorKind, message: String) -> Self {
    match kind {
      ErrorKind::Validation => ApiError::Validation(message),
      ErrorKind::InvalidState => ApiError::InvalidState(message),
      ErrorKind::NotFound => ApiError::NotFound(message),
      ErrorKind::PermissionDenied => ApiError::PermissionDenied(message),
      ErrorKind::Persistence => ApiError::Internal(message),
    }
  }
}

impl fmt::Display for ApiError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ApiError::Validation(msg) => write!(f, "Validation error: {}", msg),
      ApiError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
      ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
      ApiError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
      ApiError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
      ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
    }
  }
}

impl ResponseError for ApiError {
  fn status_code(&self) -> StatusCode {
    match self {
      ApiError::Validation(_) => StatusCode::BAD_REQUEST,
      ApiError::InvalidState(_) => StatusCode::CONFLICT,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::PermissionDenied(_) => StatusCode::FORBIDDEN,
      ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    let (error_type, message) = match self {
      ApiError::Validation(msg) => ("validation_error", msg.clone()),
      ApiError::InvalidState(msg) => ("invalid_state", msg.clone()),
      ApiError::NotFound(msg) => ("not_found", msg.clone()),
      ApiError::PermissionDenied(msg) => ("permission_denied", msg.clone()),
      ApiError::Unauthenticated(msg) => ("unauthenticated", msg.clone()),
      ApiError::Internal(msg) => {
        // Don't expose internal error details in production
        tracing::error!("Internal error: {}", msg);
        (
          "internal_error",
          "An internal server error occurred".to_string(),
        )
      }
    };

    HttpResponse::build(status)
      .content_type(ContentType::json())
      .json(ErrorResponse {
        error: error_type.to_string(),
        message,
      })
  }
}

impl From<InvoiceError> for ApiError {
  fn from(error: InvoiceError) -> Self {
    ApiError::from_kind(error.kind(), error.to_string())
  }
}

impl From<EditRequestError> for ApiError {
  fn from(error: EditRequestError) -> Self {
    ApiError::from_kind(error.kind(), error.to_string())
  }
}

impl From<IdentityError> for ApiError {
  fn from(error: IdentityError) -> Self {
    match error {
      IdentityError::UnknownUser(id) => ApiError::Unauthenticated(format!("Unknown user {}", id)),
      IdentityError::UnknownRole(role) => ApiError::Internal(format!("Unknown role {}", role)),
      IdentityError::Repository(e) => ApiError::Internal(e.to_string()),
    }
  }
}

/// Convert validation errors from validator crate
impl From<validator::ValidationErrors> for ApiError {
  fn from(errors: validator::ValidationErrors) -> Self {
    let mut messages: Vec<String> = errors
      .field_errors()
      .iter()
      .flat_map(|(field, errors)| {
        errors
          .iter()
          .map(|error| {
            error
              .message
              .as_ref()
              .map(|m| m.to_string())
              .unwrap_or_else(|| format!("Invalid field: {}", field))
          })
          .collect::<Vec<_>>()
      })
      .collect();
    messages.sort();

    ApiError::Validation(messages.join(", "))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::errors::RepositoryError;
  use crate::domain::invoice::ValueObjectError;
  use uuid::Uuid;

  #[test]
  fn test_api_error_status_codes() {
    assert_eq!(
      ApiError::Validation("test".to_string()).status_code(),
      StatusCode::BAD_REQUEST
    );
    assert_eq!(
      ApiError::InvalidState("paid".to_string()).status_code(),
      StatusCode::CONFLICT
    );
    assert_eq!(
      ApiError::Unauthenticated("who".to_string()).status_code(),
      StatusCode::UNAUTHORIZED
    );
    assert_eq!(
      ApiError::Internal("test".to_string()).status_code(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }

  #[test]
  fn test_invoice_error_conversion() {
    let api_error: ApiError = InvoiceError::NoLineItems.into();
    assert_eq!(api_error.status_code(), StatusCode::BAD_REQUEST);

    let api_error: ApiError = InvoiceError::InvoiceNotFound(Uuid::new_v4()).into();
    assert_eq!(api_error.status_code(), StatusCode::NOT_FOUND);

    let api_error: ApiError = InvoiceError::InvalidState("already paid".to_string()).into();
    assert_eq!(api_error.status_code(), StatusCode::CONFLICT);

    let api_error: ApiError =
      InvoiceError::Repository(RepositoryError::QueryFailed("boom".to_string())).into();
    assert_eq!(api_error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn test_edit_request_error_conversion() {
    let api_error: ApiError = EditRequestError::NoRequestedItems.into();
    assert_eq!(api_error.status_code(), StatusCode::BAD_REQUEST);

    let api_error: ApiError = EditRequestError::PermissionDenied("not yours".to_string()).into();
    assert_eq!(api_error.status_code(), StatusCode::FORBIDDEN);

    let api_error: ApiError =
      EditRequestError::Ledger(InvoiceError::Validation(
        ValueObjectError::InvalidAmount("negative".to_string()),
      ))
      .into();
    assert_eq!(api_error.status_code(), StatusCode::BAD_REQUEST);
  }

  #[test]
  fn test_unknown_user_is_unauthenticated() {
    let api_error: ApiError = IdentityError::UnknownUser(Uuid::new_v4()).into();
    assert_eq!(api_error.status_code(), StatusCode::UNAUTHORIZED);
  }
}
