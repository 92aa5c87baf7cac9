use async_trait::async_trait;
use uuid::Uuid;

use super::entities::Actor;
use super::errors::IdentityError;

/// Resolves an authenticated user id into an [`Actor`].
///
/// Authentication itself (tokens, OTP, passwords) happens upstream; by the
/// time a user id reaches this port it has already been verified.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
  /// Returns the actor for `user_id`, or [`IdentityError::UnknownUser`]
  async fn actor_for(&self, user_id: Uuid) -> Result<Actor, IdentityError>;
}
