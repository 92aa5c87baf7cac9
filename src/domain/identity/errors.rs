use thiserror::Error;
use uuid::Uuid;

use crate::domain::errors::RepositoryError;

#[derive(Debug, Error)]
pub enum IdentityError {
  #[error("Unknown user: {0}")]
  UnknownUser(Uuid),

  #[error("Unknown role: {0}")]
  UnknownRole(String),

  #[error("Repository error: {0}")]
  Repository(#[from] RepositoryError),
}
