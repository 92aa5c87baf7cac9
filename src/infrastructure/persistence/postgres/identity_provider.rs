use async_trait::async_trait;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::errors::RepositoryError;
use crate::domain::identity::{Actor, IdentityError, IdentityProvider, Role};

/// Resolves roles from the `profiles` table maintained by the auth platform
pub struct PostgresIdentityProvider {
  pool: PgPool,
}

impl PostgresIdentityProvider {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl IdentityProvider for PostgresIdentityProvider {
  async fn actor_for(&self, user_id: Uuid) -> Result<Actor, IdentityError> {
    let role: Option<String> = sqlx::query_scalar("SELECT role FROM profiles WHERE id = $1")
      .bind(user_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(RepositoryError::from)?;

    let role = role.ok_or(IdentityError::UnknownUser(user_id))?;
    Ok(Actor::new(user_id, Role::from_str(&role)?))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use super::super::test_support::setup_test_db;

  #[tokio::test]
  #[ignore = "requires docker"]
  async fn test_actor_for_profile() {
    let (pool, _container) = setup_test_db().await;
    let user_id = Uuid::new_v4();
    sqlx::query("INSERT INTO profiles (id, role) VALUES ($1, 'business')")
      .bind(user_id)
      .execute(&pool)
      .await
      .expect("Failed to create profile");

    let provider = PostgresIdentityProvider::new(pool);
    assert_eq!(
      provider.actor_for(user_id).await.unwrap(),
      Actor::business(user_id)
    );
    assert!(matches!(
      provider.actor_for(Uuid::new_v4()).await,
      Err(IdentityError::UnknownUser(_))
    ));
  }
}
