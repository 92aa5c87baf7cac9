use async_trait::async_trait;
use uuid::Uuid;

use super::MemoryStore;
use crate::domain::identity::{Actor, IdentityError, IdentityProvider};

#[async_trait]
impl IdentityProvider for MemoryStore {
  async fn actor_for(&self, user_id: Uuid) -> Result<Actor, IdentityError> {
    let state = self.state.lock().await;
    state
      .profiles
      .get(&user_id)
      .map(|role| Actor::new(user_id, *role))
      .ok_or(IdentityError::UnknownUser(user_id))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::identity::Role;

  #[tokio::test]
  async fn test_actor_for_registered_profile() {
    let store = MemoryStore::new();
    let user_id = Uuid::new_v4();
    store.register_profile(user_id, Role::Customer).await;

    let actor = store.actor_for(user_id).await.unwrap();
    assert_eq!(actor, Actor::customer(user_id));

    let unknown = store.actor_for(Uuid::new_v4()).await;
    assert!(matches!(unknown, Err(IdentityError::UnknownUser(_))));
  }
}
