use async_trait::async_trait;
use uuid::Uuid;

use super::MemoryStore;
use crate::domain::errors::RepositoryError;
use crate::domain::invoice::{CustomerAccount, CustomerAccountRepository};

#[async_trait]
impl CustomerAccountRepository for MemoryStore {
  async fn create(&self, account: CustomerAccount) -> Result<CustomerAccount, RepositoryError> {
    let mut state = self.state.lock().await;
    let exists = state
      .customer_accounts
      .values()
      .any(|a| a.business_id == account.business_id && a.customer_id == account.customer_id);
    if exists {
      return Err(RepositoryError::Duplicate(format!(
        "customer {} already registered",
        account.customer_id
      )));
    }

    state.customer_accounts.insert(account.id, account.clone());
    Ok(account)
  }

  async fn update(&self, account: CustomerAccount) -> Result<CustomerAccount, RepositoryError> {
    let mut state = self.state.lock().await;
    let stored = state
      .customer_accounts
      .get_mut(&account.id)
      .ok_or(RepositoryError::NotFound)?;
    *stored = account.clone();
    Ok(account)
  }

  async fn find(
    &self,
    business_id: Uuid,
    customer_id: Uuid,
  ) -> Result<Option<CustomerAccount>, RepositoryError> {
    let state = self.state.lock().await;
    Ok(
      state
        .customer_accounts
        .values()
        .find(|a| a.business_id == business_id && a.customer_id == customer_id)
        .cloned(),
    )
  }

  async fn find_by_business(
    &self,
    business_id: Uuid,
  ) -> Result<Vec<CustomerAccount>, RepositoryError> {
    let state = self.state.lock().await;
    let mut accounts: Vec<CustomerAccount> = state
      .customer_accounts
      .values()
      .filter(|a| a.business_id == business_id)
      .cloned()
      .collect();
    accounts.sort_by(|a, b| a.display_name.value().cmp(b.display_name.value()));
    Ok(accounts)
  }
}
