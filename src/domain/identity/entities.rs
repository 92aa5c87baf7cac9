use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::errors::IdentityError;

/// Role of an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Business,
  Customer,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::Business => "business",
      Role::Customer => "customer",
    }
  }
}

impl FromStr for Role {
  type Err = IdentityError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "business" => Ok(Role::Business),
      "customer" => Ok(Role::Customer),
      _ => Err(IdentityError::UnknownRole(s.to_string())),
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The user on whose behalf an operation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub user_id: Uuid,
  pub role: Role,
}

impl Actor {
  pub fn new(user_id: Uuid, role: Role) -> Self {
    Self { user_id, role }
  }

  pub fn business(user_id: Uuid) -> Self {
    Self::new(user_id, Role::Business)
  }

  pub fn customer(user_id: Uuid) -> Self {
    Self::new(user_id, Role::Customer)
  }

  pub fn is_business(&self) -> bool {
    self.role == Role::Business
  }

  pub fn is_customer(&self) -> bool {
    self.role == Role::Customer
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_role_parsing() {
    assert_eq!(Role::from_str("business").unwrap(), Role::Business);
    assert_eq!(Role::from_str("Customer").unwrap(), Role::Customer);
    assert!(Role::from_str("admin").is_err());
    assert_eq!(Role::Business.to_string(), "business");
  }

  #[test]
  fn test_actor_roles() {
    let id = Uuid::new_v4();
    assert!(Actor::business(id).is_business());
    assert!(!Actor::business(id).is_customer());
    assert!(Actor::customer(id).is_customer());
  }
}
