use thiserror::Error;

/// Coarse classification shared by every domain error.
///
/// Callers (the HTTP adapter in particular) branch on the kind rather than on
/// individual variants. None of the kinds are retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Malformed input: empty item list, negative amount, missing field
  Validation,
  /// Operation not permitted in the entity's current state
  InvalidState,
  NotFound,
  PermissionDenied,
  /// Storage layer failure, surfaced as-is
  Persistence,
}

/// Errors reported by storage ports
#[derive(Debug, Error)]
pub enum RepositoryError {
  #[error("Record not found")]
  NotFound,

  /// A guarded write found the row in an unexpected state (already paid,
  /// revision moved on, request no longer pending). Nothing was written.
  #[error("Write conflict: {0}")]
  Conflict(String),

  #[error("Duplicate key violation: {0}")]
  Duplicate(String),

  #[error("Database connection failed: {0}")]
  ConnectionFailed(String),

  #[error("Query execution failed: {0}")]
  QueryFailed(String),

  #[error("Stored record is invalid: {0}")]
  Corrupt(String),
}

impl RepositoryError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      RepositoryError::NotFound => ErrorKind::NotFound,
      RepositoryError::Conflict(_) | RepositoryError::Duplicate(_) => ErrorKind::InvalidState,
      _ => ErrorKind::Persistence,
    }
  }
}

impl From<sqlx::Error> for RepositoryError {
  fn from(error: sqlx::Error) -> Self {
    match error {
      sqlx::Error::RowNotFound => RepositoryError::NotFound,
      sqlx::Error::Database(db_err) => {
        if db_err.is_unique_violation() {
          RepositoryError::Duplicate(db_err.message().to_string())
        } else {
          RepositoryError::QueryFailed(db_err.message().to_string())
        }
      }
      sqlx::Error::PoolTimedOut => RepositoryError::ConnectionFailed("Pool timed out".to_string()),
      sqlx::Error::PoolClosed => RepositoryError::ConnectionFailed("Pool closed".to_string()),
      sqlx::Error::Decode(e) => RepositoryError::Corrupt(e.to_string()),
      _ => RepositoryError::QueryFailed(error.to_string()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_repository_error_kinds() {
    assert_eq!(RepositoryError::NotFound.kind(), ErrorKind::NotFound);
    assert_eq!(
      RepositoryError::Conflict("paid".to_string()).kind(),
      ErrorKind::InvalidState
    );
    assert_eq!(
      RepositoryError::QueryFailed("boom".to_string()).kind(),
      ErrorKind::Persistence
    );
  }

  #[test]
  fn test_sqlx_row_not_found_conversion() {
    let err: RepositoryError = sqlx::Error::RowNotFound.into();
    assert!(matches!(err, RepositoryError::NotFound));

    let err: RepositoryError = sqlx::Error::PoolTimedOut.into();
    assert_eq!(err.kind(), ErrorKind::Persistence);
  }
}
